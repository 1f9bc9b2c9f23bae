//! Target platform parsing and normalization.
//!
//! A platform is written `os[(osversion)]/arch[/variant]`. Specifiers are
//! normalized on parse so that aliases (`x86_64`, `aarch64`, `armhf`, ...)
//! collapse onto one canonical [`Platform::key`], which is what the result
//! aggregation uses to address per-platform outputs.

pub mod arch;
pub mod os;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors raised while parsing a platform specifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
  /// The specifier is syntactically invalid.
  #[error("invalid platform specifier {spec:?}: {reason}")]
  Invalid { spec: String, reason: String },

  /// A single-component specifier named neither an OS nor an architecture.
  #[error("unknown operating system or architecture: {spec:?}")]
  Unknown { spec: String },
}

impl PlatformError {
  /// The specifier that failed to parse.
  pub fn spec(&self) -> &str {
    match self {
      PlatformError::Invalid { spec, .. } | PlatformError::Unknown { spec } => spec,
    }
  }

  fn invalid(spec: &str, reason: impl Into<String>) -> Self {
    PlatformError::Invalid {
      spec: spec.to_string(),
      reason: reason.into(),
    }
  }
}

/// A target platform, serialized the way OCI image indexes describe one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
  pub architecture: String,
  pub os: String,
  #[serde(rename = "os.version", default, skip_serializing_if = "Option::is_none")]
  pub os_version: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub variant: Option<String>,
}

impl Platform {
  /// Create a normalized platform from its parts.
  pub fn new(os: &str, architecture: &str, variant: Option<&str>) -> Self {
    Self {
      architecture: architecture.to_string(),
      os: os.to_string(),
      os_version: None,
      variant: variant.map(str::to_string),
    }
    .normalize()
  }

  /// The platform of the machine this process runs on.
  pub fn host() -> Self {
    let variant = arch::host_variant();
    Self::new(
      os::host_os(),
      arch::host_arch(),
      (!variant.is_empty()).then_some(variant),
    )
  }

  /// Resolve OS, architecture and variant aliases to canonical form.
  pub fn normalize(self) -> Self {
    let (architecture, variant) = arch::normalize_arch(&self.architecture, self.variant.as_deref().unwrap_or(""));
    Self {
      architecture,
      os: os::normalize_os(&self.os),
      os_version: self.os_version.filter(|v| !v.is_empty()),
      variant: (!variant.is_empty()).then_some(variant),
    }
  }

  /// Returns the lookup key `os/arch[/variant]`.
  ///
  /// The OS version is not part of the key.
  pub fn key(&self) -> String {
    let os = if self.os.is_empty() { "unknown" } else { &self.os };
    match &self.variant {
      Some(variant) => format!("{}/{}/{}", os, self.architecture, variant),
      None => format!("{}/{}", os, self.architecture),
    }
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.key())
  }
}

impl FromStr for Platform {
  type Err = PlatformError;

  fn from_str(spec: &str) -> Result<Self, Self::Err> {
    parse(spec)
  }
}

/// Parse a single platform specifier into a normalized [`Platform`].
pub fn parse(spec: &str) -> Result<Platform, PlatformError> {
  if spec.contains('*') {
    return Err(PlatformError::invalid(spec, "wildcards are not supported"));
  }

  let parts: Vec<&str> = spec.split('/').collect();
  let (os_part, os_version) = split_os_version(spec, parts[0])?;
  for part in std::iter::once(os_part).chain(parts.iter().skip(1).copied()) {
    if !is_valid_component(part) {
      return Err(PlatformError::invalid(spec, format!("invalid component {:?}", part)));
    }
  }

  let platform = match parts.len() {
    1 => {
      let os = os::normalize_os(os_part);
      if os::is_known_os(&os) {
        Platform {
          architecture: arch::host_arch().to_string(),
          os,
          os_version,
          variant: Some(arch::host_variant().to_string()),
        }
      } else {
        let (architecture, _) = arch::normalize_arch(os_part, "");
        if os_version.is_some() || !arch::is_known_arch(&architecture) {
          return Err(PlatformError::Unknown { spec: spec.to_string() });
        }
        Platform {
          architecture,
          os: os::host_os().to_string(),
          os_version: None,
          variant: None,
        }
      }
    }
    2 => Platform {
      architecture: parts[1].to_string(),
      os: os_part.to_string(),
      os_version,
      variant: None,
    },
    3 => Platform {
      architecture: parts[1].to_string(),
      os: os_part.to_string(),
      os_version,
      variant: Some(parts[2].to_string()),
    },
    n => {
      return Err(PlatformError::invalid(
        spec,
        format!("expected at most 3 components, got {}", n),
      ));
    }
  };

  Ok(platform.normalize())
}

/// Splits `windows(10.0.17763)` into the OS name and its version.
fn split_os_version<'a>(spec: &str, part: &'a str) -> Result<(&'a str, Option<String>), PlatformError> {
  let Some(open) = part.find('(') else {
    return Ok((part, None));
  };
  let Some(version) = part[open + 1..].strip_suffix(')') else {
    return Err(PlatformError::invalid(spec, "unterminated os version"));
  };
  if !version
    .chars()
    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
  {
    return Err(PlatformError::invalid(spec, format!("invalid os version {:?}", version)));
  }
  let version = (!version.is_empty()).then(|| version.to_string());
  Ok((&part[..open], version))
}

fn is_valid_component(part: &str) -> bool {
  !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Resolve a comma-separated platform list into normalized platforms.
///
/// An absent or blank list yields the host platform. Input order is
/// preserved, and a platform whose key was already seen is dropped so that
/// each key maps to exactly one build job.
pub fn resolve_platforms(spec: Option<&str>) -> Result<Vec<Platform>, PlatformError> {
  let spec = spec.map(str::trim).unwrap_or("");
  if spec.is_empty() {
    return Ok(vec![Platform::host()]);
  }

  let mut seen = HashSet::new();
  let mut platforms = Vec::new();
  for item in spec.split(',') {
    let platform = parse(item.trim())?;
    if seen.insert(platform.key()) {
      platforms.push(platform);
    } else {
      debug!(platform = %platform, "dropping duplicate target platform");
    }
  }

  Ok(platforms)
}
