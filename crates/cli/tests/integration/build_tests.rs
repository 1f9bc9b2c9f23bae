use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn build_reports_each_platform() {
  let env = TestEnv::with_build_file();

  env
    .build_cmd()
    .args(["--platform", "linux/amd64,linux/arm64"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Built 2 platform(s)"))
    .stdout(predicate::str::contains("linux/amd64"))
    .stdout(predicate::str::contains("linux/arm64"));
}

#[test]
fn build_json_output_keeps_platform_order() {
  let env = TestEnv::with_build_file();

  let output = env
    .build_cmd()
    .args(["--platform", "linux/arm64,linux/amd64", "-o", "json"])
    .output()
    .unwrap();
  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["platforms"][0]["architecture"], "arm64");
  assert_eq!(json["platforms"][1]["architecture"], "amd64");
  assert!(json["refs"]["linux/arm64"].as_str().unwrap().starts_with("sha256:"));

  let arm = &json["image_configs"]["linux/arm64"];
  assert_eq!(arm["architecture"], "arm64");
  assert_eq!(arm["config"]["WorkingDir"], "/root");
  assert_eq!(arm["config"]["Labels"]["org.opencontainers.image.version"], "24.04");

  let amd = &json["image_configs"]["linux/amd64"];
  assert_eq!(amd["config"]["Cmd"][0], "/bin/bash");
  assert!(amd["config"]["Labels"].is_null());
}

#[test]
fn build_writes_definitions_to_output_dir() {
  let env = TestEnv::with_build_file();
  let out = env.output_path();

  env
    .build_cmd()
    .args(["--platform", "linux/amd64"])
    .arg("--output-dir")
    .arg(&out)
    .assert()
    .success();

  let written: Vec<_> = std::fs::read_dir(&out).unwrap().collect();
  assert_eq!(written.len(), 1);
  let path = written[0].as_ref().unwrap().path();
  let definition = std::fs::read_to_string(path).unwrap();
  assert!(definition.contains("docker-image://docker.io/library/ubuntu:latest"));
  assert!(definition.contains("date > /source/date"));
}

#[test]
fn scratch_build_needs_no_image_configs() {
  let env = TestEnv::with_build_file();

  env
    .build_cmd()
    .args(["--platform", "linux/amd64", "--build-arg", "base=scratch"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Built 1 platform(s)"));
}

#[test]
fn unknown_base_image_names_the_reference() {
  let env = TestEnv::with_build_file();

  env
    .build_cmd()
    .args(["--platform", "linux/amd64", "--build-arg", "base=alpine:3.19"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("docker.io/library/alpine:3.19"));
}

#[test]
fn invalid_platform_fails() {
  let env = TestEnv::with_build_file();

  env
    .build_cmd()
    .args(["--platform", "linux/amd64,notaplatform"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("notaplatform"));
}

#[test]
fn custom_file_name_is_used() {
  let env = TestEnv::empty();
  env.write_file("nested/build.txt", "payload");

  env
    .build_cmd()
    .args(["--file", "nested/build.txt", "--platform", "linux/amd64"])
    .assert()
    .success();
}

#[test]
fn options_can_come_from_the_environment() {
  let env = TestEnv::with_build_file();

  let output = env
    .build_cmd()
    .arg("--from-env")
    .args(["-o", "json"])
    .env("BUILDKIT_FRONTEND_OPT_0", "platform=linux/arm64")
    .output()
    .unwrap();
  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["platforms"].as_array().unwrap().len(), 1);
  assert_eq!(json["platforms"][0]["architecture"], "arm64");
}
