//! Immutable graph state handles.

use std::sync::Arc;

use super::definition::{self, Definition};
use super::ops::{ExecOp, FileAction, Op, validate_path};
use super::GraphError;
use crate::platform::Platform;

/// A vertex and the vertices it reads from.
#[derive(Debug)]
pub(crate) struct Vertex {
  pub(crate) op: Op,
  pub(crate) inputs: Vec<Arc<Vertex>>,
}

/// The tip of a build graph plus the metadata later operations inherit.
///
/// Cloning is cheap and every method returns a new `State`; the receiver is
/// never modified, so older states remain valid and unchanged.
#[derive(Debug, Clone)]
pub struct State {
  output: Option<Arc<Vertex>>,
  env: Arc<Vec<(String, String)>>,
  cwd: Arc<str>,
}

impl Default for State {
  fn default() -> Self {
    Self::scratch()
  }
}

impl State {
  /// An empty filesystem.
  pub fn scratch() -> Self {
    Self {
      output: None,
      env: Arc::new(Vec::new()),
      cwd: Arc::from("/"),
    }
  }

  /// The root filesystem of a registry image, pinned to `platform`.
  pub fn image(reference: &str, platform: &Platform) -> Self {
    let vertex = Vertex {
      op: Op::Source {
        identifier: format!("docker-image://{}", reference),
        platform: Some(platform.clone()),
      },
      inputs: Vec::new(),
    };
    Self {
      output: Some(Arc::new(vertex)),
      ..Self::scratch()
    }
  }

  /// True when no operation has been recorded.
  pub fn is_scratch(&self) -> bool {
    self.output.is_none()
  }

  /// Declare an environment variable for subsequent exec operations.
  ///
  /// A later declaration of the same key replaces the earlier one. Image
  /// configs may carry an empty key, so only keys that could not round-trip
  /// through `KEY=VALUE` are rejected.
  pub fn add_env(&self, key: &str, value: &str) -> Result<Self, GraphError> {
    if key.contains('=') || key.contains('\0') {
      return Err(GraphError::InvalidEnvKey(key.to_string()));
    }
    let mut env: Vec<(String, String)> = self.env.iter().filter(|(k, _)| k != key).cloned().collect();
    env.push((key.to_string(), value.to_string()));
    Ok(Self {
      env: Arc::new(env),
      ..self.clone()
    })
  }

  pub fn get_env(&self, key: &str) -> Option<&str> {
    self.env.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
  }

  /// Declared environment in declaration order.
  pub fn env(&self) -> &[(String, String)] {
    &self.env
  }

  /// Set the working directory for subsequent exec operations.
  ///
  /// A relative `dir` is resolved against the current working directory.
  pub fn with_cwd(&self, dir: &str) -> Result<Self, GraphError> {
    let cwd = join_cwd(&self.cwd, dir);
    validate_path(&cwd)?;
    Ok(Self {
      cwd: Arc::from(cwd),
      ..self.clone()
    })
  }

  pub fn cwd(&self) -> &str {
    &self.cwd
  }

  /// Append a file action.
  pub fn file(&self, action: FileAction) -> Self {
    self.append(Op::File { action })
  }

  /// Append a command execution and return the resulting root filesystem.
  ///
  /// The command inherits the declared environment and working directory;
  /// variables set on `exec` itself take precedence.
  pub fn run(&self, mut exec: ExecOp) -> Self {
    for (key, value) in self.env.iter() {
      exec.env.entry(key.clone()).or_insert_with(|| value.clone());
    }
    exec.cwd.get_or_insert_with(|| self.cwd.to_string());
    self.append(Op::Exec(exec))
  }

  fn append(&self, op: Op) -> Self {
    let vertex = Vertex {
      op,
      inputs: self.output.iter().cloned().collect(),
    };
    Self {
      output: Some(Arc::new(vertex)),
      ..self.clone()
    }
  }

  /// Flatten the graph into a serializable definition.
  pub fn marshal(&self) -> Result<Definition, GraphError> {
    definition::marshal(self.output.as_ref())
  }

  /// Number of operations reachable from this state.
  pub fn depth(&self) -> usize {
    let mut depth = 0;
    let mut cursor = self.output.as_ref();
    while let Some(vertex) = cursor {
      depth += 1;
      cursor = vertex.inputs.first();
    }
    depth
  }
}

/// Lexically join `dir` onto `cwd`, collapsing `.` and `..` components.
fn join_cwd(cwd: &str, dir: &str) -> String {
  let joined = if dir.starts_with('/') {
    dir.to_string()
  } else {
    format!("{}/{}", cwd, dir)
  };

  let mut parts: Vec<&str> = Vec::new();
  for part in joined.split('/') {
    match part {
      "" | "." => {}
      ".." => {
        parts.pop();
      }
      part => parts.push(part),
    }
  }
  format!("/{}", parts.join("/"))
}
