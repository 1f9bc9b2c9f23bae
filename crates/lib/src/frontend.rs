//! The frontend entrypoint: options in, aggregate build result out.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::context::BuildContext;
use crate::convert::build_graph;
use crate::coordinator::run_platforms;
use crate::error::FrontendError;
use crate::gateway::{CacheImport, Gateway, GatewayError, SolveRequest};
use crate::image::{BaseSpec, resolve_base};
use crate::options::FrontendOptions;
use crate::platform::{Platform, resolve_platforms};
use crate::result::{BuildResult, PlatformResult, aggregate};
use crate::source::read_build_source;

/// Inputs every platform pipeline shares read-only.
#[derive(Debug)]
struct Shared {
  source: Vec<u8>,
  base: BaseSpec,
  exec_args: BTreeMap<String, String>,
  cache_imports: Vec<CacheImport>,
}

/// Run a complete multi-platform build against `gateway`.
///
/// Platforms and the base reference are validated before any I/O, so a bad
/// option fails without touching the daemon. The result holds exactly one
/// entry per distinct platform, in the order the platforms were requested.
pub async fn build<G: Gateway>(ctx: &BuildContext, gateway: Arc<G>) -> Result<BuildResult, FrontendError> {
  let options = FrontendOptions::from_opts(gateway.build_opts())?;
  let platforms = resolve_platforms(options.platforms.as_deref())?;
  let base = BaseSpec::parse(options.base_name())?;
  info!(
    base = %base,
    platforms = platforms.len(),
    filename = %options.filename,
    "starting build"
  );

  let source = read_build_source(ctx, gateway.as_ref(), &options.filename).await?;

  let shared = Arc::new(Shared {
    source,
    base,
    exec_args: options.exec_args(),
    cache_imports: options.cache_imports,
  });

  let results = run_platforms(ctx, &platforms, |ctx, platform| {
    let gateway = gateway.clone();
    let shared = shared.clone();
    async move { build_platform(&ctx, gateway.as_ref(), &shared, &platform).await }
  })
  .await?;

  let result = aggregate(&platforms, results)?;
  info!(refs = result.refs.len(), "build finished");
  Ok(result)
}

/// One platform's pipeline: base, graph, solve, serialize config.
async fn build_platform<G: Gateway>(
  ctx: &BuildContext,
  gateway: &G,
  shared: &Shared,
  platform: &Platform,
) -> Result<PlatformResult, FrontendError> {
  let resolved = resolve_base(ctx, gateway, &shared.base, platform).await?;
  let state = build_graph(
    resolved.state,
    &resolved.image,
    &shared.source,
    &shared.base,
    platform,
    &shared.exec_args,
  )?;

  let definition = state.marshal().map_err(|source| FrontendError::GraphConstruction {
    platform: platform.key(),
    source,
  })?;
  debug!(platform = %platform, ops = definition.ops.len(), "solving");

  let solve_error = |source: GatewayError| FrontendError::Solve {
    platform: platform.key(),
    source,
  };
  let request = SolveRequest {
    definition,
    cache_imports: shared.cache_imports.clone(),
  };
  let reference = ctx
    .run(gateway.solve(request))
    .await
    .and_then(|response| response.single_ref())
    .map_err(|e| FrontendError::from_gateway(e, solve_error))?;

  let image_config = serde_json::to_vec(&resolved.image)
    .map_err(|e| FrontendError::Internal(format!("failed to marshal image config for {}: {}", platform, e)))?;

  info!(platform = %platform, reference = %reference, "platform built");
  Ok(PlatformResult {
    key: platform.key(),
    reference,
    image_config,
  })
}
