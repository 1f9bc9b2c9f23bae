use std::sync::Arc;
use std::time::Duration;

use clocker_lib::graph::{FileAction, Op};
use clocker_lib::image::Image;
use clocker_lib::{BuildContext, ErrorKind, Platform, build};

use super::common::{ScriptedGateway, opts};

const PLATFORMS: &str = "linux/amd64,linux/arm64,linux/arm/v7,linux/386";
const KEYS: [&str; 4] = ["linux/amd64", "linux/arm64", "linux/arm/v7", "linux/386"];

#[tokio::test]
async fn manifest_order_ignores_completion_order() {
  let gw = Arc::new(
    ScriptedGateway::new(opts(PLATFORMS), b"payload")
      .delay("linux/amd64", 120)
      .delay("linux/arm64", 80)
      .delay("linux/arm/v7", 40)
      .delay("linux/386", 0),
  );

  let result = build(&BuildContext::new(), gw.clone()).await.unwrap();

  assert_eq!(result.refs.len(), 4);
  assert_eq!(result.metadata.len(), 5);
  let ids: Vec<&str> = result.platforms.platforms.iter().map(|p| p.id.as_str()).collect();
  assert_eq!(ids, KEYS);
  assert_eq!(result.manifest_from_metadata().unwrap(), result.platforms);

  // The slowest platform was requested first but finished last.
  assert_eq!(gw.solved_order().last().map(String::as_str), Some("linux/amd64"));

  for key in KEYS {
    let image: Image = serde_json::from_slice(result.image_config(key).unwrap()).unwrap();
    let platform: Platform = key.parse().unwrap();
    assert_eq!(image.architecture, platform.architecture);
    assert_eq!(image.variant, platform.variant);
    assert_eq!(image.config.cmd, vec!["/bin/bash"]);
  }
}

#[tokio::test]
async fn one_failing_platform_fails_the_build() {
  let gw = Arc::new(
    ScriptedGateway::new(opts(PLATFORMS), b"payload")
      .delay("linux/amd64", 30_000)
      .delay("linux/arm/v7", 30_000)
      .delay("linux/386", 30_000)
      .fail("linux/arm64", "manifest unknown"),
  );

  let err = tokio::time::timeout(Duration::from_secs(5), build(&BuildContext::new(), gw.clone()))
    .await
    .expect("siblings should be cancelled promptly")
    .unwrap_err();

  assert_eq!(err.kind(), ErrorKind::ConfigResolutionError);
  let message = err.to_string();
  assert!(message.contains("linux/arm64"), "{}", message);
  assert!(message.contains("docker.io/library/ubuntu:latest"), "{}", message);
  assert!(gw.solved_order().is_empty());
}

#[tokio::test]
async fn malformed_platform_fails_before_any_work() {
  let gw = Arc::new(ScriptedGateway::new(opts("linux/amd64,notaplatform"), b"payload"));

  let err = build(&BuildContext::new(), gw.clone()).await.unwrap_err();

  assert_eq!(err.kind(), ErrorKind::InvalidPlatform);
  assert!(err.to_string().contains("notaplatform"));
  assert_eq!(gw.reads(), 0);
  assert_eq!(gw.resolves(), 0);
  assert!(gw.solved_order().is_empty());
}

#[tokio::test]
async fn duplicate_platforms_run_once() {
  let gw = Arc::new(ScriptedGateway::new(
    opts("linux/amd64, linux/x86_64,linux/amd64,linux/arm64"),
    b"payload",
  ));

  let result = build(&BuildContext::new(), gw.clone()).await.unwrap();

  assert_eq!(result.refs.len(), 2);
  assert_eq!(result.platforms.platforms.len(), 2);
  assert_eq!(gw.resolves(), 2);
  assert_eq!(gw.solved_order().len(), 2);
}

#[tokio::test]
async fn missing_platform_targets_the_host() {
  let gw = Arc::new(ScriptedGateway::new(clocker_lib::BuildOpts::new(), b"payload"));

  let result = build(&BuildContext::new(), gw).await.unwrap();

  let host = Platform::host().key();
  assert_eq!(result.refs.len(), 1);
  assert!(result.refs.contains_key(&host), "{:?}", result.refs);
}

#[tokio::test]
async fn syntax_directive_is_stripped_from_the_payload() {
  let gw = Arc::new(ScriptedGateway::new(
    opts("linux/amd64"),
    b"#syntax=docker/dockerfile:1\n\n  echo hi  \n",
  ));

  build(&BuildContext::new(), gw.clone()).await.unwrap();

  let solved = gw.solved();
  let data = solved[0]
    .definition
    .ops
    .iter()
    .find_map(|op| match &op.op {
      Op::File {
        action: FileAction::Mkfile { data, .. },
      } => Some(data.clone()),
      _ => None,
    })
    .unwrap();
  assert_eq!(data, b"echo hi");
}

#[tokio::test]
async fn scratch_base_never_resolves_configs() {
  let gw = Arc::new(ScriptedGateway::new(
    opts("linux/amd64,linux/arm64").with_opt("build-arg:base", "scratch"),
    b"payload",
  ));

  let result = build(&BuildContext::new(), gw.clone()).await.unwrap();

  assert_eq!(gw.resolves(), 0);
  assert_eq!(result.refs.len(), 2);
  assert!(gw.solved().iter().all(|req| req.definition.is_empty()));
}

#[tokio::test]
async fn cancelled_caller_yields_cancellation() {
  let gw = Arc::new(ScriptedGateway::new(opts("linux/amd64"), b"payload").delay("linux/amd64", 30_000));
  let ctx = BuildContext::new();
  let canceller = ctx.clone();
  tokio::spawn(async move {
    tokio::time::sleep(Duration::from_millis(50)).await;
    canceller.cancel();
  });

  let err = tokio::time::timeout(Duration::from_secs(5), build(&ctx, gw))
    .await
    .expect("cancellation should be prompt")
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::CancelledError);
}
