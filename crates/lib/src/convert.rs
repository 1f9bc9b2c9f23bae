//! Turning a build source into a graph on top of its base.

use std::collections::BTreeMap;

use tracing::debug;

use crate::consts::{BUILD_COMMAND, SOURCE_DATA_PATH, SOURCE_DIR};
use crate::error::FrontendError;
use crate::graph::{ExecOp, FileAction, GraphError, State};
use crate::image::{BaseSpec, Image};
use crate::platform::Platform;

/// Append the build steps for `source` to `state`.
///
/// An empty base gets no steps at all: the result is the empty filesystem.
/// Otherwise the source is written to `/source/data` and a shell command runs
/// against the root in the image's working directory, with `build_args`
/// exported on top of the declared environment.
pub fn build_graph(
  state: State,
  image: &Image,
  source: &[u8],
  base: &BaseSpec,
  platform: &Platform,
  build_args: &BTreeMap<String, String>,
) -> Result<State, FrontendError> {
  if base.is_empty() {
    return Ok(state);
  }

  let graph = append_steps(state, image, source, build_args).map_err(|source| FrontendError::GraphConstruction {
    platform: platform.key(),
    source,
  })?;
  debug!(platform = %platform, depth = graph.depth(), "constructed build graph");
  Ok(graph)
}

fn append_steps(
  state: State,
  image: &Image,
  source: &[u8],
  build_args: &BTreeMap<String, String>,
) -> Result<State, GraphError> {
  let state = match image.config.working_dir.as_str() {
    "" => state,
    dir => state.with_cwd(dir)?,
  };

  let mut exec = ExecOp::new(BUILD_COMMAND.iter().copied())?;
  for (key, value) in build_args {
    exec = exec.with_env(key, value)?;
  }

  Ok(
    state
      .file(FileAction::mkdir(SOURCE_DIR, 0o755, true)?)
      .file(FileAction::mkfile(SOURCE_DATA_PATH, 0o644, source)?)
      .run(exec),
  )
}
