//! Assembling per-platform outcomes into the build result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::{EXPORTER_IMAGE_CONFIG_KEY, EXPORTER_PLATFORMS_KEY};
use crate::error::FrontendError;
use crate::gateway::ContentRef;
use crate::platform::Platform;

/// What one platform pipeline produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformResult {
  pub key: String,
  pub reference: ContentRef,
  pub image_config: Vec<u8>,
}

/// One entry of the platform manifest, in the exporter's field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestPlatform {
  #[serde(rename = "ID")]
  pub id: String,
  #[serde(rename = "Platform")]
  pub platform: Platform,
}

/// The platform manifest stored under `refs.platforms`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformManifest {
  #[serde(rename = "Platforms")]
  pub platforms: Vec<ManifestPlatform>,
}

/// The aggregate handed back to the daemon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildResult {
  pub refs: BTreeMap<String, ContentRef>,
  pub metadata: BTreeMap<String, Vec<u8>>,
  pub platforms: PlatformManifest,
}

impl BuildResult {
  pub fn image_config(&self, key: &str) -> Option<&[u8]> {
    self.metadata.get(&image_config_key(key)).map(Vec::as_slice)
  }

  /// Decode the serialized platform manifest from the metadata.
  pub fn manifest_from_metadata(&self) -> Result<PlatformManifest, FrontendError> {
    let bytes = self
      .metadata
      .get(EXPORTER_PLATFORMS_KEY)
      .ok_or_else(|| FrontendError::Internal(format!("missing {} metadata", EXPORTER_PLATFORMS_KEY)))?;
    serde_json::from_slice(bytes).map_err(|e| FrontendError::Internal(e.to_string()))
  }
}

/// Metadata key carrying the image config of the platform `key`.
pub fn image_config_key(key: &str) -> String {
  format!("{}/{}", EXPORTER_IMAGE_CONFIG_KEY, key)
}

/// Combine `results`, which must be positionally aligned with `platforms`.
pub fn aggregate(platforms: &[Platform], results: Vec<PlatformResult>) -> Result<BuildResult, FrontendError> {
  if platforms.len() != results.len() {
    return Err(FrontendError::Internal(format!(
      "{} platforms but {} results",
      platforms.len(),
      results.len()
    )));
  }

  let mut out = BuildResult::default();
  for (platform, result) in platforms.iter().zip(results) {
    if result.key != platform.key() {
      return Err(FrontendError::Internal(format!(
        "result for {} recorded in slot for {}",
        result.key,
        platform.key()
      )));
    }
    out.metadata.insert(image_config_key(&result.key), result.image_config);
    out.platforms.platforms.push(ManifestPlatform {
      id: result.key.clone(),
      platform: platform.clone(),
    });
    out.refs.insert(result.key, result.reference);
  }

  let manifest = serde_json::to_vec(&out.platforms).map_err(|e| FrontendError::Internal(e.to_string()))?;
  out.metadata.insert(EXPORTER_PLATFORMS_KEY.to_string(), manifest);
  Ok(out)
}
