//! A gateway backed by the local filesystem.
//!
//! Useful for running the frontend without a daemon: sources come from a
//! context directory, image configs from a JSON catalog, and solving only
//! content-addresses the definition.

use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use super::{BuildOpts, ContentRef, Gateway, GatewayError, SolveRequest, SolveResponse, SourceRequest};
use crate::platform::Platform;
use crate::util::hash::digest_hex;

/// Filesystem-backed [`Gateway`].
#[derive(Debug, Clone)]
pub struct LocalGateway {
  opts: BuildOpts,
  context_dir: PathBuf,
  catalog: BTreeMap<String, serde_json::Value>,
  output_dir: Option<PathBuf>,
}

impl LocalGateway {
  /// A gateway serving every named context from `context_dir`.
  pub fn new(opts: BuildOpts, context_dir: impl Into<PathBuf>) -> Self {
    Self {
      opts,
      context_dir: context_dir.into(),
      catalog: BTreeMap::new(),
      output_dir: None,
    }
  }

  /// Load image configs from a JSON object keyed by reference.
  ///
  /// A key of the form `<reference>@<os/arch[/variant]>` applies to that
  /// platform only and takes precedence over the plain reference.
  pub fn with_image_catalog(mut self, path: &Path) -> Result<Self, GatewayError> {
    let bytes = std::fs::read(path).map_err(|e| io_error(path, e))?;
    let entries: BTreeMap<String, serde_json::Value> = serde_json::from_slice(&bytes)
      .map_err(|e| GatewayError::failed(format!("invalid image catalog {}: {}", path.display(), e)))?;
    debug!(path = %path.display(), entries = entries.len(), "loaded image catalog");
    self.catalog.extend(entries);
    Ok(self)
  }

  pub fn with_image_config(mut self, key: &str, config: serde_json::Value) -> Self {
    self.catalog.insert(key.to_string(), config);
    self
  }

  /// Write each solved definition to `dir` as `<digest>.json`.
  pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.output_dir = Some(dir.into());
    self
  }

  fn source_path(&self, filename: &str) -> Result<PathBuf, GatewayError> {
    let relative = Path::new(filename);
    let escapes = relative
      .components()
      .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if filename.is_empty() || escapes {
      return Err(GatewayError::failed(format!(
        "{:?} is not a path inside the build context",
        filename
      )));
    }
    Ok(self.context_dir.join(relative))
  }
}

impl Gateway for LocalGateway {
  fn build_opts(&self) -> &BuildOpts {
    &self.opts
  }

  async fn read_source(&self, request: SourceRequest) -> Result<Vec<u8>, GatewayError> {
    let path = self.source_path(&request.filename)?;
    debug!(
      context = %request.context,
      session = request.session_id.as_deref().unwrap_or("-"),
      path = %path.display(),
      "reading source"
    );
    tokio::fs::read(&path).await.map_err(|e| io_error(&path, e))
  }

  async fn resolve_image_config(&self, reference: &str, platform: &Platform) -> Result<Vec<u8>, GatewayError> {
    let specific = format!("{}@{}", reference, platform.key());
    let config = self
      .catalog
      .get(&specific)
      .or_else(|| self.catalog.get(reference))
      .ok_or_else(|| GatewayError::not_found(format!("image config for {} ({})", reference, platform)))?;
    serde_json::to_vec(config).map_err(|e| GatewayError::failed(e.to_string()))
  }

  async fn solve(&self, request: SolveRequest) -> Result<SolveResponse, GatewayError> {
    let digest = request
      .definition
      .digest()
      .map_err(|e| GatewayError::failed(e.to_string()))?;

    if let Some(dir) = &self.output_dir {
      tokio::fs::create_dir_all(dir).await.map_err(|e| io_error(dir, e))?;
      let path = dir.join(format!("{}.json", digest_hex(&digest)));
      let body = serde_json::to_vec_pretty(&request.definition).map_err(|e| GatewayError::failed(e.to_string()))?;
      tokio::fs::write(&path, body).await.map_err(|e| io_error(&path, e))?;
      debug!(path = %path.display(), "wrote definition");
    }

    info!(
      digest = %digest,
      ops = request.definition.ops.len(),
      cache_imports = request.cache_imports.len(),
      "solved definition"
    );
    Ok(SolveResponse::single(ContentRef(digest)))
  }
}

fn io_error(path: &Path, e: io::Error) -> GatewayError {
  if e.kind() == io::ErrorKind::NotFound {
    GatewayError::not_found(path.display().to_string())
  } else {
    GatewayError::failed(format!("{}: {}", path.display(), e))
  }
}
