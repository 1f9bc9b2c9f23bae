//! Per-platform base image resolution.

use tracing::{debug, info, warn};

use super::{BaseSpec, Image};
use crate::context::BuildContext;
use crate::error::FrontendError;
use crate::gateway::Gateway;
use crate::graph::State;
use crate::platform::Platform;

/// The starting point of one platform's build.
///
/// Both halves are owned by the platform pipeline that resolved them; nothing
/// here is shared with another platform.
#[derive(Debug, Clone)]
pub struct ResolvedBase {
  pub state: State,
  pub image: Image,
}

/// Produce the initial graph state and image config for `platform`.
///
/// An empty base never contacts the gateway. A named base has its config
/// resolved for the platform, adopted into a fresh image, and its declared
/// environment replayed onto the graph state.
pub async fn resolve_base<G: Gateway>(
  ctx: &BuildContext,
  gateway: &G,
  base: &BaseSpec,
  platform: &Platform,
) -> Result<ResolvedBase, FrontendError> {
  let mut image = Image::for_platform(platform);

  let reference = match base.reference() {
    Some(reference) => reference,
    None => {
      debug!(platform = %platform, "starting from an empty filesystem");
      return Ok(ResolvedBase {
        state: State::scratch(),
        image,
      });
    }
  };

  debug!(platform = %platform, reference = %reference, "resolving base image config");
  let bytes = ctx
    .run(gateway.resolve_image_config(&reference, platform))
    .await
    .map_err(|e| {
      FrontendError::from_gateway(e, |source| FrontendError::ConfigResolution {
        reference: reference.clone(),
        platform: platform.key(),
        source,
      })
    })?;

  let remote: Image = serde_json::from_slice(&bytes).map_err(|source| FrontendError::ConfigDecode {
    reference: reference.clone(),
    platform: platform.key(),
    source,
  })?;
  image.merge_base_config(remote.config);

  let mut state = State::image(&reference, platform);
  for (key, value) in image.env_pairs() {
    match state.add_env(key, value) {
      Ok(next) => state = next,
      Err(e) => warn!(platform = %platform, reference = %reference, error = %e, "skipping base image env entry"),
    }
  }

  info!(
    platform = %platform,
    reference = %reference,
    env = image.config.env.len(),
    "resolved base image"
  );
  Ok(ResolvedBase { state, image })
}
