//! Base image selection.

use std::fmt;

use oci_distribution::Reference;

use crate::consts::SCRATCH;
use crate::error::FrontendError;

/// The filesystem a build starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseSpec {
  /// An empty filesystem; nothing is resolved or executed.
  Empty,
  /// A registry image, normalized and tag-defaulted
  /// (`ubuntu` becomes `docker.io/library/ubuntu:latest`).
  Named(Reference),
}

impl BaseSpec {
  /// Classify a base name, parsing it as an image reference unless it is
  /// `scratch`.
  pub fn parse(name: &str) -> Result<Self, FrontendError> {
    if name == SCRATCH {
      return Ok(BaseSpec::Empty);
    }

    let reference = name.parse::<Reference>().map_err(|e| FrontendError::ReferenceParse {
      reference: name.to_string(),
      reason: e.to_string(),
    })?;
    Ok(BaseSpec::Named(reference))
  }

  /// The fully qualified reference handed to the daemon, if any.
  pub fn reference(&self) -> Option<String> {
    match self {
      BaseSpec::Empty => None,
      BaseSpec::Named(reference) => Some(reference.whole()),
    }
  }

  pub fn is_empty(&self) -> bool {
    matches!(self, BaseSpec::Empty)
  }
}

impl fmt::Display for BaseSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BaseSpec::Empty => write!(f, "{}", SCRATCH),
      BaseSpec::Named(reference) => write!(f, "{}", reference.whole()),
    }
  }
}
