//! Build options handed to the frontend by the daemon.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::consts::{ENV_FRONTEND_OPT_PREFIX, ENV_SESSION_ID};

/// The option map a build was invoked with, plus its client session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOpts {
  pub opts: BTreeMap<String, String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub session_id: Option<String>,
}

impl BuildOpts {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_opt(mut self, key: &str, value: &str) -> Self {
    self.opts.insert(key.to_string(), value.to_string());
    self
  }

  pub fn with_session_id(mut self, session_id: &str) -> Self {
    self.session_id = Some(session_id.to_string());
    self
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.opts.get(key).map(String::as_str)
  }

  /// Load options from the environment the daemon starts frontends with.
  ///
  /// Each `BUILDKIT_FRONTEND_OPT_<n>` variable holds one `key=value` pair;
  /// pairs are applied in index order, so a later index wins on duplicate
  /// keys.
  pub fn from_env() -> Self {
    let mut indexed: Vec<(u64, String)> = std::env::vars()
      .filter_map(|(name, value)| {
        let index = name.strip_prefix(ENV_FRONTEND_OPT_PREFIX)?;
        match index.parse::<u64>() {
          Ok(index) => Some((index, value)),
          Err(_) => {
            warn!(variable = %name, "ignoring frontend option with non-numeric index");
            None
          }
        }
      })
      .collect();
    indexed.sort_by_key(|(index, _)| *index);

    let mut opts = BTreeMap::new();
    for (index, pair) in indexed {
      let (key, value) = pair.split_once('=').unwrap_or((pair.as_str(), ""));
      debug!(index, key, "loaded frontend option");
      opts.insert(key.to_string(), value.to_string());
    }

    let session_id = std::env::var(ENV_SESSION_ID).ok().filter(|s| !s.is_empty());
    Self { opts, session_id }
  }

  /// Overlay `other` on top of these options.
  pub fn merge(mut self, other: BuildOpts) -> Self {
    self.opts.extend(other.opts);
    if other.session_id.is_some() {
      self.session_id = other.session_id;
    }
    self
  }
}
