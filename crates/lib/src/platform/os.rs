/// Operating systems recognised when a bare specifier could be an OS or an
/// architecture.
const KNOWN_OS: &[&str] = &[
  "aix",
  "android",
  "darwin",
  "dragonfly",
  "freebsd",
  "hurd",
  "illumos",
  "ios",
  "js",
  "linux",
  "nacl",
  "netbsd",
  "openbsd",
  "plan9",
  "solaris",
  "wasip1",
  "windows",
  "zos",
];

/// Returns the canonical OCI name for an operating system.
pub fn normalize_os(os: &str) -> String {
  let os = os.to_ascii_lowercase();
  match os.as_str() {
    "macos" => "darwin".to_string(),
    _ => os,
  }
}

pub fn is_known_os(os: &str) -> bool {
  KNOWN_OS.contains(&os)
}

/// Returns the OCI name of the operating system this process runs on.
pub fn host_os() -> &'static str {
  match std::env::consts::OS {
    "macos" => "darwin",
    other => other,
  }
}
