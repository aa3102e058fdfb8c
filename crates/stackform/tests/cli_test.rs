use assert_cmd::Command;
use predicates::prelude::*;

fn stackform() -> Command {
    let mut cmd = Command::cargo_bin("stackform").unwrap();
    cmd.env_clear();
    cmd
}

#[test]
fn render_emits_manifest_from_env_config() {
    let dir = tempfile::tempdir().unwrap();
    let assert = stackform()
        .current_dir(dir.path())
        .env("STACKFORM_SITE__DOMAIN", "example.com")
        .env("STACKFORM_SITE__SUBDOMAIN", "dev")
        .arg("render")
        .assert()
        .success();

    let manifest: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(manifest["stack"], "dev.example.com");
    assert_eq!(manifest["format_version"], 1);
    assert_eq!(
        manifest["outputs"]["domainURL"]["lit"],
        "https://dev.example.com"
    );

    let kinds: Vec<&str> = manifest["resources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["kind"].as_str().unwrap())
        .collect();
    for kind in [
        "aws:s3:bucket",
        "aws:s3:bucket-folder",
        "aws:cloudfront:distribution",
        "aws:route53:record",
        "aws:ecr:repository",
        "aws:ecs:service",
        "aws:elb:listener",
    ] {
        assert!(kinds.contains(&kind), "missing {kind}");
    }
}

#[test]
fn render_writes_manifest_to_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("manifest.json");
    stackform()
        .current_dir(dir.path())
        .env("STACKFORM_SITE__DOMAIN", "example.com")
        .env("STACKFORM_SITE__SUBDOMAIN", "dev")
        .args(["render", "--compact", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("manifest.json"));

    let manifest: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(manifest["stack"], "dev.example.com");
}

#[test]
fn missing_required_configuration_fails_before_rendering() {
    let dir = tempfile::tempdir().unwrap();
    stackform()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("site.domain"));
}

#[test]
fn validate_reports_a_summary() {
    let dir = tempfile::tempdir().unwrap();
    stackform()
        .current_dir(dir.path())
        .env("STACKFORM_SITE__DOMAIN", "example.com")
        .env("STACKFORM_SITE__SUBDOMAIN", "dev")
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("dev.example.com is valid"));
}

#[test]
fn config_file_drives_the_composition() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("stackform.toml"),
        r#"
[site]
domain = "example.com"
subdomain = "stg"

[backend]
container_port = 8080
"#,
    )
    .unwrap();

    let assert = stackform()
        .current_dir(dir.path())
        .arg("render")
        .assert()
        .success();

    let manifest: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(manifest["stack"], "stg.example.com");

    let target_group = manifest["resources"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["name"] == "target-group")
        .unwrap();
    assert_eq!(target_group["properties"]["port"]["lit"], 8080);
}

#[test]
fn outputs_lists_every_export() {
    let dir = tempfile::tempdir().unwrap();
    let assert = stackform()
        .current_dir(dir.path())
        .env("STACKFORM_SITE__DOMAIN", "example.com")
        .env("STACKFORM_SITE__SUBDOMAIN", "dev")
        .arg("outputs")
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    for name in [
        "originURL",
        "cdnURL",
        "domainURL",
        "imageUri",
        "loadBalancerUrl",
        "repoName",
        "serviceName",
        "clusterName",
        "containerName",
    ] {
        assert!(stdout.contains(name), "missing output {name}");
    }
}
