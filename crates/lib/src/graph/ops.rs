//! Graph operations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::GraphError;
use crate::platform::Platform;

/// A single vertex operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Op {
  /// Import a filesystem from an external source, e.g. `docker-image://...`.
  Source {
    identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    platform: Option<Platform>,
  },
  /// Apply file actions to the input filesystem (or to an empty one).
  File { action: FileAction },
  /// Run a command with the input filesystem mounted as root.
  Exec(ExecOp),
}

/// A filesystem mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FileAction {
  Mkdir {
    path: String,
    mode: u32,
    make_parents: bool,
  },
  Mkfile {
    path: String,
    mode: u32,
    data: Vec<u8>,
  },
}

impl FileAction {
  /// Create a directory, optionally creating missing parents.
  pub fn mkdir(path: &str, mode: u32, make_parents: bool) -> Result<Self, GraphError> {
    validate_path(path)?;
    Ok(FileAction::Mkdir {
      path: path.to_string(),
      mode,
      make_parents,
    })
  }

  /// Create (or overwrite) a file with the given contents.
  pub fn mkfile(path: &str, mode: u32, data: impl Into<Vec<u8>>) -> Result<Self, GraphError> {
    validate_path(path)?;
    Ok(FileAction::Mkfile {
      path: path.to_string(),
      mode,
      data: data.into(),
    })
  }
}

/// Command execution parameters.
///
/// `env` and `cwd` are completed from the state the command runs against
/// when the op is appended; values set here take precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecOp {
  pub args: Vec<String>,
  #[serde(default)]
  pub env: BTreeMap<String, String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cwd: Option<String>,
}

impl ExecOp {
  pub fn new<I, S>(args: I) -> Result<Self, GraphError>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    if args.is_empty() {
      return Err(GraphError::EmptyArgs);
    }
    Ok(Self {
      args,
      env: BTreeMap::new(),
      cwd: None,
    })
  }

  /// Add an environment variable for this command only.
  pub fn with_env(mut self, key: &str, value: &str) -> Result<Self, GraphError> {
    validate_env_key(key)?;
    self.env.insert(key.to_string(), value.to_string());
    Ok(self)
  }

  /// Run the command in `cwd` instead of the state's working directory.
  pub fn with_cwd(mut self, cwd: &str) -> Result<Self, GraphError> {
    validate_path(cwd)?;
    self.cwd = Some(cwd.to_string());
    Ok(self)
  }
}

pub(crate) fn validate_path(path: &str) -> Result<(), GraphError> {
  if path.contains('\0') {
    return Err(GraphError::NulInPath { path: path.to_string() });
  }
  if !path.starts_with('/') {
    return Err(GraphError::RelativePath { path: path.to_string() });
  }
  Ok(())
}

pub(crate) fn validate_env_key(key: &str) -> Result<(), GraphError> {
  if key.is_empty() || key.contains('=') || key.contains('\0') {
    return Err(GraphError::InvalidEnvKey(key.to_string()));
  }
  Ok(())
}
