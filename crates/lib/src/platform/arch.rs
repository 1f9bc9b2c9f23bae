/// CPU architectures recognised when a bare specifier could be an OS or an
/// architecture.
const KNOWN_ARCH: &[&str] = &[
  "386",
  "amd64",
  "amd64p32",
  "arm",
  "armbe",
  "arm64",
  "arm64be",
  "loong64",
  "mips",
  "mipsle",
  "mips64",
  "mips64le",
  "mips64p32",
  "mips64p32le",
  "ppc",
  "ppc64",
  "ppc64le",
  "riscv",
  "riscv64",
  "s390",
  "s390x",
  "sparc",
  "sparc64",
  "wasm",
];

/// Resolves architecture and variant aliases to their canonical form.
///
/// Both inputs are lower-cased first. Variants that are implied by the
/// architecture (`amd64/v1`, `arm64/v8`) normalize to an empty variant, and a
/// bare `arm` is `arm/v7`.
pub fn normalize_arch(arch: &str, variant: &str) -> (String, String) {
  let arch = arch.to_ascii_lowercase();
  let variant = variant.to_ascii_lowercase();

  match arch.as_str() {
    "i386" => ("386".to_string(), String::new()),
    "x86_64" | "x86-64" | "amd64" => {
      let variant = if variant == "v1" { String::new() } else { variant };
      ("amd64".to_string(), variant)
    }
    "aarch64" | "arm64" => {
      let variant = match variant.as_str() {
        "8" | "v8" | "v8.0" => String::new(),
        "9" | "9.0" | "v9.0" => "v9".to_string(),
        _ => variant,
      };
      ("arm64".to_string(), variant)
    }
    "armhf" => ("arm".to_string(), "v7".to_string()),
    "armel" => ("arm".to_string(), "v6".to_string()),
    "arm" => {
      let variant = match variant.as_str() {
        "" | "7" => "v7".to_string(),
        "5" | "6" | "8" => format!("v{}", variant),
        _ => variant,
      };
      ("arm".to_string(), variant)
    }
    _ => (arch, variant),
  }
}

pub fn is_known_arch(arch: &str) -> bool {
  KNOWN_ARCH.contains(&arch)
}

/// Returns the OCI architecture name of the CPU this process runs on.
pub fn host_arch() -> &'static str {
  match std::env::consts::ARCH {
    "x86_64" => "amd64",
    "x86" => "386",
    "aarch64" => "arm64",
    "loongarch64" => "loong64",
    "powerpc" => "ppc",
    "powerpc64" if cfg!(target_endian = "little") => "ppc64le",
    "powerpc64" => "ppc64",
    other => other,
  }
}

/// Returns the CPU variant of the host, empty when the architecture has none.
pub fn host_variant() -> &'static str {
  match host_arch() {
    "arm" => "v7",
    _ => "",
  }
}
