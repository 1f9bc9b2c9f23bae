//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Isolated build context.
///
/// Each test gets its own temporary directory holding the build file.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// A context containing the fixture build file.
  pub fn with_build_file() -> Self {
    let env = Self::empty();
    env.write_file("clockerfile", &fixture_content("clockerfile"));
    env
  }

  pub fn empty() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// Write a file relative to the context directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn output_path(&self) -> PathBuf {
    self.temp.path().join("out")
  }

  /// A `clocker build` command for this context with the fixture catalog.
  pub fn build_cmd(&self) -> Command {
    let mut cmd = cargo_bin_cmd!("clocker");
    cmd
      .env_remove("RUST_LOG")
      .arg("build")
      .arg(self.temp.path())
      .arg("--image-configs")
      .arg(fixture_path("images.json"));
    cmd
  }
}
