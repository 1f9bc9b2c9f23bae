//! Shared helpers for library integration tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use clocker_lib::gateway::{ContentRef, SolveRequest, SolveResponse, SourceRequest};
use clocker_lib::{BuildOpts, Gateway, GatewayError, Platform};

/// A gateway whose config resolution can be delayed or failed per platform.
///
/// Every call is counted, and solves are recorded in completion order.
#[derive(Debug)]
pub struct ScriptedGateway {
  opts: BuildOpts,
  source: Vec<u8>,
  config: serde_json::Value,
  delays: HashMap<String, Duration>,
  failures: HashMap<String, String>,
  reads: AtomicUsize,
  resolves: AtomicUsize,
  solved: Mutex<Vec<(String, SolveRequest)>>,
}

impl ScriptedGateway {
  pub fn new(opts: BuildOpts, source: &[u8]) -> Self {
    Self {
      opts,
      source: source.to_vec(),
      config: serde_json::json!({
        "config": {"Env": ["PATH=/usr/local/bin:/usr/bin:/bin"], "Cmd": ["/bin/bash"], "Labels": null}
      }),
      delays: HashMap::new(),
      failures: HashMap::new(),
      reads: AtomicUsize::new(0),
      resolves: AtomicUsize::new(0),
      solved: Mutex::new(Vec::new()),
    }
  }

  pub fn delay(mut self, platform_key: &str, millis: u64) -> Self {
    self.delays.insert(platform_key.to_string(), Duration::from_millis(millis));
    self
  }

  pub fn fail(mut self, platform_key: &str, message: &str) -> Self {
    self.failures.insert(platform_key.to_string(), message.to_string());
    self
  }

  pub fn reads(&self) -> usize {
    self.reads.load(Ordering::SeqCst)
  }

  pub fn resolves(&self) -> usize {
    self.resolves.load(Ordering::SeqCst)
  }

  /// Platform keys of solved definitions, in completion order.
  pub fn solved_order(&self) -> Vec<String> {
    self.solved.lock().unwrap().iter().map(|(key, _)| key.clone()).collect()
  }

  pub fn solved(&self) -> Vec<SolveRequest> {
    self.solved.lock().unwrap().iter().map(|(_, req)| req.clone()).collect()
  }
}

impl Gateway for ScriptedGateway {
  fn build_opts(&self) -> &BuildOpts {
    &self.opts
  }

  async fn read_source(&self, _request: SourceRequest) -> Result<Vec<u8>, GatewayError> {
    self.reads.fetch_add(1, Ordering::SeqCst);
    Ok(self.source.clone())
  }

  async fn resolve_image_config(&self, _reference: &str, platform: &Platform) -> Result<Vec<u8>, GatewayError> {
    self.resolves.fetch_add(1, Ordering::SeqCst);
    let key = platform.key();
    if let Some(delay) = self.delays.get(&key) {
      tokio::time::sleep(*delay).await;
    }
    if let Some(message) = self.failures.get(&key) {
      return Err(GatewayError::failed(message.clone()));
    }
    Ok(serde_json::to_vec(&self.config).unwrap())
  }

  async fn solve(&self, request: SolveRequest) -> Result<SolveResponse, GatewayError> {
    let key = request
      .definition
      .ops
      .iter()
      .find_map(|op| match &op.op {
        clocker_lib::graph::Op::Source { platform, .. } => platform.as_ref().map(Platform::key),
        _ => None,
      })
      .unwrap_or_else(|| "scratch".to_string());
    let digest = request.definition.digest().unwrap();
    self.solved.lock().unwrap().push((key, request));
    Ok(SolveResponse::single(ContentRef(digest)))
  }
}

pub fn opts(platforms: &str) -> BuildOpts {
  BuildOpts::new().with_opt("platform", platforms)
}
