//! Marshalled graph definitions.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::GraphError;
use super::ops::Op;
use super::state::Vertex;
use crate::util::hash::{digest_bytes, digest_json};

/// One operation in a definition, addressed by its content digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpDef {
  pub digest: String,
  pub inputs: Vec<String>,
  pub op: Op,
}

/// A flattened graph: operations ordered so that every input precedes its
/// dependents, plus the digest of the terminal operation.
///
/// An empty filesystem marshals to no operations and no terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
  pub ops: Vec<OpDef>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub terminal: Option<String>,
}

impl Definition {
  /// Digest of the whole definition, stable for identical graphs.
  pub fn digest(&self) -> Result<String, GraphError> {
    digest_json(self).map_err(|e| GraphError::Encode(e.to_string()))
  }

  pub fn is_empty(&self) -> bool {
    self.ops.is_empty()
  }

  pub fn get(&self, digest: &str) -> Option<&OpDef> {
    self.ops.iter().find(|op| op.digest == digest)
  }
}

pub(crate) fn marshal(output: Option<&Arc<Vertex>>) -> Result<Definition, GraphError> {
  let Some(output) = output else {
    return Ok(Definition::default());
  };

  let mut marshaller = Marshaller::default();
  let terminal = marshaller.visit(output)?;
  Ok(Definition {
    ops: marshaller.ops,
    terminal: Some(terminal),
  })
}

#[derive(Default)]
struct Marshaller {
  ops: Vec<OpDef>,
  by_vertex: HashMap<*const Vertex, String>,
  emitted: HashSet<String>,
}

impl Marshaller {
  fn visit(&mut self, vertex: &Arc<Vertex>) -> Result<String, GraphError> {
    let key = Arc::as_ptr(vertex);
    if let Some(digest) = self.by_vertex.get(&key) {
      return Ok(digest.clone());
    }

    let inputs = vertex
      .inputs
      .iter()
      .map(|input| self.visit(input))
      .collect::<Result<Vec<_>, _>>()?;

    let encoded = serde_json::to_vec(&(&vertex.op, &inputs)).map_err(|e| GraphError::Encode(e.to_string()))?;
    let digest = digest_bytes(&encoded);

    if self.emitted.insert(digest.clone()) {
      self.ops.push(OpDef {
        digest: digest.clone(),
        inputs,
        op: vertex.op.clone(),
      });
    }
    self.by_vertex.insert(key, digest.clone());
    Ok(digest)
  }
}
