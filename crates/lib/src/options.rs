//! Frontend options decoded from the build option map.

use std::collections::BTreeMap;

use crate::consts::{
  BUILD_ARG_BASE, BUILD_ARG_PREFIX, DEFAULT_BASE_IMAGE, DEFAULT_BUILD_FILENAME, KEY_CACHE_FROM, KEY_CACHE_IMPORTS,
  KEY_FILENAME, KEY_TARGET_PLATFORM,
};
use crate::error::FrontendError;
use crate::gateway::{BuildOpts, CacheImport};

/// Everything the frontend reads from [`BuildOpts`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontendOptions {
  /// Name of the build definition inside the client's context.
  pub filename: String,
  /// Raw comma-separated platform list, if one was given.
  pub platforms: Option<String>,
  /// `build-arg:` options with the prefix removed.
  pub build_args: BTreeMap<String, String>,
  pub cache_imports: Vec<CacheImport>,
}

impl FrontendOptions {
  pub fn from_opts(opts: &BuildOpts) -> Result<Self, FrontendError> {
    let filename = match opts.get(KEY_FILENAME) {
      Some(name) if !name.is_empty() => name.to_string(),
      _ => DEFAULT_BUILD_FILENAME.to_string(),
    };

    let platforms = opts
      .get(KEY_TARGET_PLATFORM)
      .filter(|s| !s.trim().is_empty())
      .map(str::to_string);

    let mut build_args = BTreeMap::new();
    for (key, value) in &opts.opts {
      let Some(name) = key.strip_prefix(BUILD_ARG_PREFIX) else {
        continue;
      };
      if name.is_empty() || name.contains('=') {
        return Err(FrontendError::InvalidOption {
          key: key.clone(),
          reason: "build argument needs a name without '='".to_string(),
        });
      }
      build_args.insert(name.to_string(), value.clone());
    }

    let mut cache_imports: Vec<CacheImport> = opts
      .get(KEY_CACHE_FROM)
      .unwrap_or_default()
      .split(',')
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(CacheImport::registry)
      .collect();

    if let Some(raw) = opts.get(KEY_CACHE_IMPORTS).filter(|s| !s.trim().is_empty()) {
      let imports: Vec<CacheImport> = serde_json::from_str(raw).map_err(|e| FrontendError::InvalidOption {
        key: KEY_CACHE_IMPORTS.to_string(),
        reason: e.to_string(),
      })?;
      cache_imports.extend(imports);
    }

    Ok(Self {
      filename,
      platforms,
      build_args,
      cache_imports,
    })
  }

  /// The base image name, `ubuntu` unless overridden.
  pub fn base_name(&self) -> &str {
    self
      .build_args
      .get(BUILD_ARG_BASE)
      .map(String::as_str)
      .unwrap_or(DEFAULT_BASE_IMAGE)
  }

  /// Build arguments exported to the build command.
  pub fn exec_args(&self) -> BTreeMap<String, String> {
    self
      .build_args
      .iter()
      .filter(|(name, _)| name.as_str() != BUILD_ARG_BASE)
      .map(|(name, value)| (name.clone(), value.clone()))
      .collect()
  }
}
