//! Implementation of the `clocker build` command.
//!
//! Runs the frontend in-process against a filesystem gateway: the build file
//! comes from the context directory and base image configs from an optional
//! JSON catalog.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::warn;

use clocker_lib::consts::{BUILD_ARG_PREFIX, KEY_CACHE_FROM, KEY_FILENAME, KEY_TARGET_PLATFORM};
use clocker_lib::platform::Platform;
use clocker_lib::{BuildContext, BuildOpts, BuildResult, LocalGateway};

use crate::output::{OutputFormat, format_duration, print_json, print_stat, print_success, truncate_digest};

pub struct BuildArgs {
  pub context: PathBuf,
  pub file: Option<String>,
  pub platform: Option<String>,
  pub build_args: Vec<String>,
  pub cache_from: Vec<String>,
  pub image_configs: Option<PathBuf>,
  pub output_dir: Option<PathBuf>,
  pub from_env: bool,
  pub timeout: Option<Duration>,
}

#[derive(Serialize)]
struct BuildReport {
  refs: BTreeMap<String, String>,
  platforms: Vec<Platform>,
  image_configs: BTreeMap<String, serde_json::Value>,
}

pub fn cmd_build(args: BuildArgs, output: OutputFormat) -> Result<()> {
  let start = Instant::now();
  let opts = build_opts(&args)?;

  let mut gateway = LocalGateway::new(opts, &args.context);
  if let Some(path) = &args.image_configs {
    gateway = gateway
      .with_image_catalog(path)
      .with_context(|| format!("Failed to load image configs: {}", path.display()))?;
  }
  if let Some(dir) = &args.output_dir {
    gateway = gateway.with_output_dir(dir);
  }

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let result = rt
    .block_on(run(Arc::new(gateway), args.timeout))
    .with_context(|| format!("Failed to build {}", args.context.display()))?;

  if output.is_json() {
    print_json(&report(&result)?)?;
  } else {
    println!();
    print_success(&format!("Built {} platform(s)", result.refs.len()));
    for entry in &result.platforms.platforms {
      if let Some(reference) = result.refs.get(&entry.id) {
        print_stat(&entry.id, truncate_digest(&reference.0));
      }
    }
    print_stat("Duration", &format_duration(start.elapsed()));
  }

  Ok(())
}

async fn run(gateway: Arc<LocalGateway>, timeout: Option<Duration>) -> Result<BuildResult> {
  let ctx = BuildContext::new();

  let canceller = ctx.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      warn!("interrupted, cancelling build");
      canceller.cancel();
    }
  });

  if let Some(timeout) = timeout {
    let canceller = ctx.clone();
    tokio::spawn(async move {
      tokio::time::sleep(timeout).await;
      warn!(timeout = %humantime::format_duration(timeout), "timed out, cancelling build");
      canceller.cancel();
    });
  }

  Ok(clocker_lib::build(&ctx, gateway).await?)
}

/// Assemble frontend options, CLI flags taking precedence over the
/// environment.
fn build_opts(args: &BuildArgs) -> Result<BuildOpts> {
  let mut cli = BuildOpts::new();
  if let Some(file) = &args.file {
    cli = cli.with_opt(KEY_FILENAME, file);
  }
  if let Some(platform) = &args.platform {
    cli = cli.with_opt(KEY_TARGET_PLATFORM, platform);
  }
  for arg in &args.build_args {
    let Some((key, value)) = arg.split_once('=') else {
      bail!("Build argument must be KEY=VALUE: {}", arg);
    };
    cli = cli.with_opt(&format!("{}{}", BUILD_ARG_PREFIX, key), value);
  }
  if !args.cache_from.is_empty() {
    cli = cli.with_opt(KEY_CACHE_FROM, &args.cache_from.join(","));
  }

  let base = if args.from_env { BuildOpts::from_env() } else { BuildOpts::new() };
  Ok(base.merge(cli))
}

fn report(result: &BuildResult) -> Result<BuildReport> {
  let mut image_configs = BTreeMap::new();
  for entry in &result.platforms.platforms {
    let bytes = result
      .image_config(&entry.id)
      .with_context(|| format!("Missing image config for {}", entry.id))?;
    let config: serde_json::Value = serde_json::from_slice(bytes).context("Failed to decode image config")?;
    image_configs.insert(entry.id.clone(), config);
  }

  Ok(BuildReport {
    refs: result.refs.iter().map(|(k, v)| (k.clone(), v.0.clone())).collect(),
    platforms: result.platforms.platforms.iter().map(|p| p.platform.clone()).collect(),
    image_configs,
  })
}
