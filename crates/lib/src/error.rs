//! Errors surfaced by the frontend.

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::graph::GraphError;
use crate::platform::PlatformError;

/// Coarse classification of a [`FrontendError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
  InvalidPlatform,
  ReferenceParseError,
  ConfigResolutionError,
  ConfigDecodeError,
  GraphConstructionError,
  SourceReadError,
  SolveError,
  CancelledError,
  InvalidOption,
  Internal,
}

/// Errors that can abort a build.
///
/// Every variant names the platform, reference or file involved so that a
/// single surfaced error is enough to diagnose the failure.
#[derive(Debug, Error)]
pub enum FrontendError {
  /// A target platform specifier could not be parsed.
  #[error("failed to parse target platform {}", .source.spec())]
  InvalidPlatform {
    #[source]
    source: PlatformError,
  },

  /// The base image name is not a valid image reference.
  #[error("failed to parse base image name {reference:?}: {reason}")]
  ReferenceParse { reference: String, reason: String },

  /// The daemon could not resolve the base image config.
  #[error("failed to resolve image config for {reference} ({platform})")]
  ConfigResolution {
    reference: String,
    platform: String,
    #[source]
    source: GatewayError,
  },

  /// The resolved image config is not a valid image config document.
  #[error("failed to parse image config for {reference} ({platform})")]
  ConfigDecode {
    reference: String,
    platform: String,
    #[source]
    source: serde_json::Error,
  },

  /// An operation could not be appended to or marshalled from the graph.
  #[error("failed to construct build graph for {platform}")]
  GraphConstruction {
    platform: String,
    #[source]
    source: GraphError,
  },

  /// The build definition could not be read from the build context.
  #[error("failed to read build file {filename:?}")]
  SourceRead {
    filename: String,
    #[source]
    source: GatewayError,
  },

  /// The daemon failed to solve the graph.
  #[error("failed to solve build for {platform}")]
  Solve {
    platform: String,
    #[source]
    source: GatewayError,
  },

  /// The build was cancelled before it completed.
  #[error("build cancelled")]
  Cancelled,

  /// A frontend option has an unusable value.
  #[error("invalid value for option {key:?}: {reason}")]
  InvalidOption { key: String, reason: String },

  /// A platform task died without producing a result.
  #[error("build task for {platform} failed: {message}")]
  TaskFailed { platform: String, message: String },

  /// A result could not be assembled.
  #[error("internal error: {0}")]
  Internal(String),
}

impl FrontendError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      FrontendError::InvalidPlatform { .. } => ErrorKind::InvalidPlatform,
      FrontendError::ReferenceParse { .. } => ErrorKind::ReferenceParseError,
      FrontendError::ConfigResolution { .. } => ErrorKind::ConfigResolutionError,
      FrontendError::ConfigDecode { .. } => ErrorKind::ConfigDecodeError,
      FrontendError::GraphConstruction { .. } => ErrorKind::GraphConstructionError,
      FrontendError::SourceRead { .. } => ErrorKind::SourceReadError,
      FrontendError::Solve { .. } => ErrorKind::SolveError,
      FrontendError::Cancelled => ErrorKind::CancelledError,
      FrontendError::InvalidOption { .. } => ErrorKind::InvalidOption,
      FrontendError::TaskFailed { .. } | FrontendError::Internal(_) => ErrorKind::Internal,
    }
  }

  /// Wrap a gateway failure, keeping cancellation distinguishable from
  /// genuine collaborator errors.
  pub(crate) fn from_gateway(source: GatewayError, wrap: impl FnOnce(GatewayError) -> FrontendError) -> Self {
    match source {
      GatewayError::Cancelled => FrontendError::Cancelled,
      other => wrap(other),
    }
  }
}

impl From<PlatformError> for FrontendError {
  fn from(source: PlatformError) -> Self {
    FrontendError::InvalidPlatform { source }
  }
}
