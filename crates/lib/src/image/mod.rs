//! OCI image configuration documents and base image resolution.
//!
//! [`Image`] mirrors the OCI image config JSON closely enough to round-trip
//! the fields the daemon's exporter reads. Collections are never left unset:
//! `null` and missing values decode to empty containers.

pub mod base;
pub mod reference;

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::consts::DEFAULT_PATH_ENV_UNIX;
use crate::platform::Platform;

pub use base::{ResolvedBase, resolve_base};
pub use reference::BaseSpec;

/// An OCI image config document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub author: Option<String>,
  #[serde(default)]
  pub architecture: String,
  #[serde(default)]
  pub os: String,
  #[serde(rename = "os.version", default, skip_serializing_if = "Option::is_none")]
  pub os_version: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub variant: Option<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub config: ImageConfig,
  #[serde(default, deserialize_with = "null_as_default")]
  pub rootfs: RootFs,
  #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
  pub history: Vec<History>,
}

/// Execution parameters recorded in an image config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageConfig {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user: Option<String>,
  #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "BTreeMap::is_empty")]
  pub exposed_ports: BTreeMap<String, serde_json::Value>,
  #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
  pub env: Vec<String>,
  #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
  pub entrypoint: Vec<String>,
  #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
  pub cmd: Vec<String>,
  #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "BTreeMap::is_empty")]
  pub volumes: BTreeMap<String, serde_json::Value>,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub working_dir: String,
  #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "BTreeMap::is_empty")]
  pub labels: BTreeMap<String, String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub stop_signal: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub args_escaped: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootFs {
  #[serde(rename = "type", default)]
  pub fs_type: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub diff_ids: Vec<String>,
}

impl Default for RootFs {
  fn default() -> Self {
    Self {
      fs_type: "layers".to_string(),
      diff_ids: Vec::new(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_by: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub author: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub comment: Option<String>,
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub empty_layer: bool,
}

impl Image {
  /// A fresh config for `platform`: root working directory, the default
  /// `PATH`, no labels and a layered rootfs.
  pub fn for_platform(platform: &Platform) -> Self {
    Self {
      architecture: platform.architecture.clone(),
      os: platform.os.clone(),
      os_version: platform.os_version.clone(),
      variant: platform.variant.clone(),
      config: ImageConfig {
        working_dir: "/".to_string(),
        env: vec![format!("PATH={}", DEFAULT_PATH_ENV_UNIX)],
        ..Default::default()
      },
      rootfs: RootFs::default(),
      ..Default::default()
    }
  }

  /// Adopt a base image's execution config wholesale.
  ///
  /// Platform fields stay those of the build target. The base config is
  /// taken by value, so the merged image owns every container outright.
  pub fn merge_base_config(&mut self, base: ImageConfig) {
    self.config = base;
  }

  /// Environment entries split into key/value pairs.
  pub fn env_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
    self.config.env.iter().map(|entry| parse_key_value(entry))
  }
}

/// Split `KEY=VALUE` on the first `=`; a missing value is empty.
pub fn parse_key_value(entry: &str) -> (&str, &str) {
  entry.split_once('=').unwrap_or((entry, ""))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
