//! Persistent build graph.
//!
//! A [`State`] is an immutable handle to the tip of a graph of filesystem
//! operations. Appending an operation returns a new `State` that shares its
//! ancestry with the old one, so states can be cloned and branched freely
//! across tasks. [`State::marshal`] flattens a state into a content-digested
//! [`Definition`] that can be handed to the daemon.

pub mod definition;
pub mod ops;
pub mod state;

use thiserror::Error;

pub use definition::{Definition, OpDef};
pub use ops::{ExecOp, FileAction, Op};
pub use state::State;

/// Errors raised while constructing or marshalling a graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
  /// File operations only accept absolute paths.
  #[error("path {path:?} must be absolute")]
  RelativePath { path: String },

  /// Paths cannot contain NUL bytes.
  #[error("path {path:?} contains a NUL byte")]
  NulInPath { path: String },

  /// An exec operation needs a command.
  #[error("exec requires at least one argument")]
  EmptyArgs,

  /// Environment variable names must be non-empty and cannot contain `=`.
  #[error("invalid environment variable name {0:?}")]
  InvalidEnvKey(String),

  /// An operation could not be serialized for digesting.
  #[error("failed to encode operation: {0}")]
  Encode(String),
}
