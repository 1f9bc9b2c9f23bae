//! The interface to the build daemon.
//!
//! The frontend never solves graphs or talks to registries itself. Everything
//! that needs the daemon goes through a [`Gateway`]: reading the build
//! definition from the client's context, resolving a base image config, and
//! solving a marshalled graph into a content reference.

pub mod local;
pub mod opts;

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::Definition;
use crate::platform::Platform;

pub use local::LocalGateway;
pub use opts::BuildOpts;

/// Failures reported by a gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
  /// The requested file or image does not exist.
  #[error("{what} not found")]
  NotFound { what: String },

  /// The daemon reported an error.
  #[error("{message}")]
  Failed { message: String },

  /// A solve produced a number of references other than one.
  #[error("expected a single result reference, got {count}")]
  UnexpectedRefs { count: usize },

  /// The call was abandoned because the build was cancelled.
  #[error("operation cancelled")]
  Cancelled,
}

impl GatewayError {
  pub fn failed(message: impl Into<String>) -> Self {
    GatewayError::Failed {
      message: message.into(),
    }
  }

  pub fn not_found(what: impl Into<String>) -> Self {
    GatewayError::NotFound { what: what.into() }
  }
}

/// An addressable solve result held by the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRef(pub String);

impl fmt::Display for ContentRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A cache source the daemon may import from while solving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheImport {
  #[serde(rename = "Type")]
  pub cache_type: String,
  #[serde(rename = "Attrs", default)]
  pub attrs: BTreeMap<String, String>,
}

impl CacheImport {
  /// A registry cache import for `reference`.
  pub fn registry(reference: &str) -> Self {
    Self {
      cache_type: "registry".to_string(),
      attrs: BTreeMap::from([("ref".to_string(), reference.to_string())]),
    }
  }
}

/// A file to read from a client-side context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRequest {
  /// Name of the local context the client shared, e.g. `dockerfile`.
  pub context: String,
  pub filename: String,
  /// Client session the context belongs to, when the daemon supplied one.
  pub session_id: Option<String>,
}

impl SourceRequest {
  pub fn new(context: &str, filename: &str) -> Self {
    Self {
      context: context.to_string(),
      filename: filename.to_string(),
      session_id: None,
    }
  }

  pub fn with_session_id(mut self, session_id: Option<&str>) -> Self {
    self.session_id = session_id.map(str::to_string);
    self
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveRequest {
  pub definition: Definition,
  pub cache_imports: Vec<CacheImport>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolveResponse {
  pub refs: Vec<ContentRef>,
}

impl SolveResponse {
  pub fn single(reference: ContentRef) -> Self {
    Self { refs: vec![reference] }
  }

  /// The only reference of the response.
  pub fn single_ref(self) -> Result<ContentRef, GatewayError> {
    let count = self.refs.len();
    let mut refs = self.refs.into_iter();
    match (refs.next(), refs.next()) {
      (Some(reference), None) => Ok(reference),
      _ => Err(GatewayError::UnexpectedRefs { count }),
    }
  }
}

/// Capabilities the build daemon provides to the frontend.
///
/// Calls may take arbitrarily long; callers race them against a
/// [`BuildContext`](crate::context::BuildContext) rather than relying on the
/// implementation to observe cancellation.
pub trait Gateway: Send + Sync + 'static {
  /// Options the build was invoked with.
  fn build_opts(&self) -> &BuildOpts;

  /// Read a file from a client-side context.
  fn read_source(&self, request: SourceRequest) -> impl Future<Output = Result<Vec<u8>, GatewayError>> + Send;

  /// Fetch the raw image config of `reference` for `platform`.
  fn resolve_image_config(
    &self,
    reference: &str,
    platform: &Platform,
  ) -> impl Future<Output = Result<Vec<u8>, GatewayError>> + Send;

  /// Solve a graph definition.
  fn solve(&self, request: SolveRequest) -> impl Future<Output = Result<SolveResponse, GatewayError>> + Send;
}
