use std::sync::Arc;

use clocker_lib::util::hash::digest_hex;
use clocker_lib::{BuildContext, BuildOpts, LocalGateway, build};
use tempfile::TempDir;

#[tokio::test]
async fn local_gateway_builds_from_a_directory() {
  let temp = TempDir::new().unwrap();
  std::fs::write(temp.path().join("custom.build"), "#syntax=docker/dockerfile:1\nhello\n").unwrap();
  let out = temp.path().join("out");

  let opts = BuildOpts::new()
    .with_opt("filename", "custom.build")
    .with_opt("platform", "linux/amd64,linux/arm64")
    .with_opt("build-arg:base", "alpine:3.19");
  let gw = LocalGateway::new(opts, temp.path())
    .with_image_config(
      "docker.io/library/alpine:3.19",
      serde_json::json!({"config": {"Env": ["PATH=/bin"], "Cmd": ["/bin/sh"]}}),
    )
    .with_output_dir(&out);

  let result = build(&BuildContext::new(), Arc::new(gw)).await.unwrap();

  assert_eq!(result.refs.len(), 2);
  for reference in result.refs.values() {
    assert!(out.join(format!("{}.json", digest_hex(&reference.0))).exists());
  }
  assert_ne!(result.refs["linux/amd64"], result.refs["linux/arm64"]);
}

#[tokio::test]
async fn local_gateway_reports_missing_build_file() {
  let temp = TempDir::new().unwrap();
  let gw = LocalGateway::new(BuildOpts::new().with_opt("platform", "linux/amd64"), temp.path());

  let err = build(&BuildContext::new(), Arc::new(gw)).await.unwrap_err();
  assert_eq!(err.kind(), clocker_lib::ErrorKind::SourceReadError);
  assert!(err.to_string().contains("clockerfile"));
}

#[tokio::test]
async fn relative_workdir_and_odd_env_still_build() {
  let temp = TempDir::new().unwrap();
  std::fs::write(temp.path().join("clockerfile"), "payload").unwrap();
  let opts = BuildOpts::new().with_opt("platform", "linux/amd64");
  let gw = LocalGateway::new(opts, temp.path()).with_image_config(
    "docker.io/library/ubuntu:latest",
    serde_json::json!({"config": {"WorkingDir": "app", "Env": ["=weird", "A=1"]}}),
  );

  let result = build(&BuildContext::new(), Arc::new(gw)).await.unwrap();

  assert_eq!(result.refs.len(), 1);
  let config: serde_json::Value = serde_json::from_slice(result.image_config("linux/amd64").unwrap()).unwrap();
  assert_eq!(config["config"]["WorkingDir"], "app");
  assert_eq!(config["config"]["Env"][0], "=weird");
}
