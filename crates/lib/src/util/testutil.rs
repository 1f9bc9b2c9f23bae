//! Test utilities for clocker-lib.
//!
//! [`FakeGateway`] is an in-memory [`Gateway`] with canned sources and image
//! configs that records what the frontend asked of it.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::gateway::{BuildOpts, ContentRef, Gateway, GatewayError, SolveRequest, SolveResponse, SourceRequest};
use crate::platform::Platform;

#[derive(Debug, Default)]
pub struct FakeGateway {
  opts: BuildOpts,
  sources: BTreeMap<String, Vec<u8>>,
  configs: BTreeMap<String, Vec<u8>>,
  resolve_failures: BTreeMap<String, String>,
  resolve_calls: AtomicUsize,
  source_reads: Mutex<Vec<SourceRequest>>,
  solved: Mutex<Vec<SolveRequest>>,
}

impl FakeGateway {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_opts(mut self, opts: BuildOpts) -> Self {
    self.opts = opts;
    self
  }

  pub fn with_source(mut self, filename: &str, data: &[u8]) -> Self {
    self.sources.insert(filename.to_string(), data.to_vec());
    self
  }

  pub fn with_image_config(self, reference: &str, config: serde_json::Value) -> Self {
    let bytes = serde_json::to_vec(&config).unwrap();
    self.with_raw_image_config(reference, bytes)
  }

  pub fn with_raw_image_config(mut self, reference: &str, bytes: Vec<u8>) -> Self {
    self.configs.insert(reference.to_string(), bytes);
    self
  }

  /// Make config resolution fail for one platform key.
  pub fn fail_resolve_for(mut self, platform_key: &str, message: &str) -> Self {
    self.resolve_failures.insert(platform_key.to_string(), message.to_string());
    self
  }

  pub fn resolve_calls(&self) -> usize {
    self.resolve_calls.load(Ordering::SeqCst)
  }

  pub fn source_reads(&self) -> Vec<SourceRequest> {
    self.source_reads.lock().unwrap().clone()
  }

  pub fn solved(&self) -> Vec<SolveRequest> {
    self.solved.lock().unwrap().clone()
  }
}

impl Gateway for FakeGateway {
  fn build_opts(&self) -> &BuildOpts {
    &self.opts
  }

  async fn read_source(&self, request: SourceRequest) -> Result<Vec<u8>, GatewayError> {
    let found = self.sources.get(&request.filename).cloned();
    let filename = request.filename.clone();
    self.source_reads.lock().unwrap().push(request);
    found.ok_or_else(|| GatewayError::not_found(filename))
  }

  async fn resolve_image_config(&self, reference: &str, platform: &Platform) -> Result<Vec<u8>, GatewayError> {
    self.resolve_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(message) = self.resolve_failures.get(&platform.key()) {
      return Err(GatewayError::failed(message.clone()));
    }
    self
      .configs
      .get(reference)
      .cloned()
      .ok_or_else(|| GatewayError::not_found(reference))
  }

  async fn solve(&self, request: SolveRequest) -> Result<SolveResponse, GatewayError> {
    let digest = request
      .definition
      .digest()
      .map_err(|e| GatewayError::failed(e.to_string()))?;
    self.solved.lock().unwrap().push(request);
    Ok(SolveResponse::single(ContentRef(digest)))
  }
}
