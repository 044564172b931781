//! End-to-end tests for the tfcheck binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn tfcheck() -> Command {
    Command::cargo_bin("tfcheck").unwrap()
}

fn write(root: &Path, file: &str, contents: &str) {
    let path = root.join(file);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// A stand-in terraform that fails `fmt` in directories containing
/// `UNFORMATTED` and `validate` in directories containing `BROKEN`.
#[cfg(unix)]
fn fake_terraform(root: &Path) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = root.join("fake-terraform.sh");
    fs::write(
        &script,
        r#"#!/bin/sh
echo "$*" >> calls.log
case "$1" in
  fmt)
    if [ -f UNFORMATTED ]; then echo "main.tf"; exit 3; fi ;;
  validate)
    if [ -f BROKEN ]; then echo "Error: Reference to undeclared input variable" >&2; exit 1; fi ;;
esac
exit 0
"#,
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script
}

#[test]
fn test_help_lists_commands() {
    tfcheck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn test_init_then_list() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "terraform/main.tf", "");
    write(temp_dir.path(), "terraform/networking/other-k8s/main.tf", "");

    tfcheck()
        .arg("init")
        .arg("--cwd")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 target(s)"));

    tfcheck()
        .current_dir(temp_dir.path())
        .args(["list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("terraform/networking/other-k8s"))
        .stdout(predicate::str::contains("\"backend_disabled\": true"));
}

#[test]
fn test_missing_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    tfcheck()
        .current_dir(temp_dir.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("tfcheck init"));
}

#[test]
fn test_dry_run_prints_commands() {
    let temp_dir = TempDir::new().unwrap();
    write(
        temp_dir.path(),
        ".tfcheck.json",
        r#"{"targets": [{"dir": "terraform"}, {"dir": "terraform/core", "backend_disabled": true}]}"#,
    );

    tfcheck()
        .current_dir(temp_dir.path())
        .args(["run", "--dry-run", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("terraform init -input=false -no-color"))
        .stdout(predicate::str::contains(
            "terraform init -input=false -backend=false -no-color",
        ))
        .stdout(predicate::str::contains("terraform fmt -check -no-color"))
        .stdout(predicate::str::contains("terraform validate -no-color"));
}

#[test]
fn test_zero_timeout_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), ".tfcheck.json", r#"{"targets": [{"dir": "terraform"}]}"#);

    tfcheck()
        .current_dir(temp_dir.path())
        .args(["run", "--timeout", "0"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--timeout"));
}

#[test]
fn test_unknown_target_filter_fails() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), ".tfcheck.json", r#"{"targets": [{"dir": "terraform"}]}"#);

    tfcheck()
        .current_dir(temp_dir.path())
        .args(["run", "--target", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No configured target matches 'nope'"));
}

#[cfg(unix)]
#[test]
fn test_run_reports_each_target_and_exits_nonzero_on_failure() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let script = fake_terraform(root);

    write(root, "good/main.tf", "");
    write(root, "unformatted/main.tf", "");
    write(root, "unformatted/UNFORMATTED", "");
    write(root, "broken/main.tf", "");
    write(root, "broken/BROKEN", "");

    let config = serde_json::json!({
        "terraform_binary": script,
        "retry": {"max_retries": 0},
        "targets": [
            {"dir": "good", "backend_disabled": true},
            {"dir": "unformatted", "backend_disabled": true},
            {"dir": "broken", "backend_disabled": true},
            {"dir": "missing"}
        ]
    });
    write(root, ".tfcheck.json", &serde_json::to_string_pretty(&config).unwrap());

    tfcheck()
        .current_dir(root)
        .args(["run", "--jobs", "2"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("✅ PASS  good"))
        .stdout(predicate::str::contains("❌ FAIL  unformatted at `fmt -check`"))
        .stdout(predicate::str::contains("❌ FAIL  broken at `validate`"))
        .stdout(predicate::str::contains("undeclared input variable"))
        .stdout(predicate::str::contains("❌ FAIL  missing at `init`"))
        .stdout(predicate::str::contains("1 passed, 3 failed, 4 total"));

    // fmt failed, so validate never ran in that directory
    let calls = fs::read_to_string(root.join("unformatted/calls.log")).unwrap();
    assert_eq!(
        calls.lines().collect::<Vec<_>>(),
        vec!["init -input=false -backend=false", "fmt -check"]
    );
}

#[cfg(unix)]
#[test]
fn test_run_json_report_for_passing_suite() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let script = fake_terraform(root);
    write(root, "terraform/main.tf", "");

    let config = serde_json::json!({
        "terraform_binary": script,
        "targets": [{"dir": "terraform", "name": "bootstrap"}]
    });
    write(root, "tfcheck.json", &serde_json::to_string(&config).unwrap());

    let output = tfcheck()
        .current_dir(root)
        .args(["run", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let target = &report["reports"][0];
    assert_eq!(target["target"]["name"], "bootstrap");
    assert_eq!(target["state"]["state"], "passed");
    assert_eq!(target["steps"].as_array().unwrap().len(), 3);
    assert_eq!(target["steps"][1]["step"], "format_check");
}
