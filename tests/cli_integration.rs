//! CLI integration tests for webpkg.
//!
//! These tests lay out module directories on disk and drive the binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the webpkg binary command, isolated from the user's config.
fn webpkg(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("webpkg").unwrap();
    cmd.env("HOME", home).env_remove("WEBPKG_CONFIG");
    cmd
}

/// Create a temporary directory for test modules.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

fn write(path: PathBuf, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn module(base: &Path, rel: &str, id: u64, name: &str, roots: &[&str]) -> PathBuf {
    let dir = base.join(rel);
    let mut manifest = format!("[module]\nid = {}\nsymbolic-name = \"{}\"\n", id, name);
    for root in roots {
        manifest.push_str(&format!(
            "\n[[capability]]\nnamespace = \"osgi.webjars\"\nattributes = {{ root = \"{}\" }}\n",
            root
        ));
    }
    write(dir.join("Module.toml"), &manifest);
    dir
}

fn descriptor(name: &str, version: &str) -> String {
    format!(r#"{{ "name": "{}", "version": "{}" }}"#, name, version)
}

// ============================================================================
// webpkg scan
// ============================================================================

#[test]
fn test_scan_lists_mappings() {
    let tmp = temp_dir();
    let ui = module(tmp.path(), "modules/ui", 7, "org.example.ui", &["/web/app"]);
    write(ui.join("web/app/package.json"), &descriptor("app", "1.0.0"));

    webpkg(tmp.path())
        .args(["scan", "modules"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "ResourceMapping{alias=/app/1.0.0,path=/web/app/}  (org.example.ui [7])",
        ))
        .stdout(predicate::str::contains("1 package(s) published by 1 of 1 module(s)"));
}

#[test]
fn test_scan_skips_missing_descriptor() {
    let tmp = temp_dir();
    let ui = module(tmp.path(), "ui", 3, "org.example.partial", &["present", "missing//"]);
    write(ui.join("present/package.json"), &descriptor("present", "2.0.0"));

    webpkg(tmp.path())
        .args(["scan", "."])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ResourceMapping{alias=/present/2.0.0,path=present/}"))
        .stdout(predicate::str::contains("missing").not())
        .stderr(predicate::str::contains("missing/package.json not found"));
}

#[test]
fn test_scan_json_output() {
    let tmp = temp_dir();
    let ui = module(tmp.path(), "ui", 12, "org.example.json", &["www"]);
    write(ui.join("www/package.json"), &descriptor("www", "0.3.0"));

    let output = webpkg(tmp.path())
        .args(["scan", ".", "--format", "json"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["modules"], 1);
    assert_eq!(report["packages"][0]["module_id"], 12);
    assert_eq!(report["packages"][0]["alias"], "/www/0.3.0");
    assert_eq!(report["packages"][0]["path"], "www/");
}

#[test]
fn test_scan_uses_project_config() {
    let tmp = temp_dir();
    let dir = tmp.path().join("m");
    write(
        dir.join("Module.toml"),
        r#"
[module]
id = 1
symbolic-name = "custom"

[[capability]]
namespace = "org.example.webpackage"
attributes = { root = "/" }
"#,
    );
    write(dir.join("webpackage.json"), &descriptor("custom", "1.0.0"));
    write(
        tmp.path().join(".webpkg/config.toml"),
        "[extender]\nnamespace = \"org.example.webpackage\"\ndescriptor = \"webpackage.json\"\n",
    );

    webpkg(tmp.path())
        .args(["scan", "."])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ResourceMapping{alias=/custom/1.0.0,path=/}"));
}

#[test]
fn test_scan_fails_on_duplicate_ids() {
    let tmp = temp_dir();
    module(tmp.path(), "a", 1, "a", &[]);
    module(tmp.path(), "b", 1, "b", &[]);

    webpkg(tmp.path())
        .args(["scan", "."])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate module id 1"));
}

// ============================================================================
// webpkg check
// ============================================================================

#[test]
fn test_check_reports_outcomes() {
    let tmp = temp_dir();
    let dir = module(tmp.path(), "ui", 4, "org.example.check", &["ok", "gone"]);
    write(dir.join("ok/package.json"), &descriptor("ok", "1.0.0"));

    webpkg(tmp.path())
        .args(["check", "ui"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("org.example.check [4]"))
        .stdout(predicate::str::contains("[OK] ok/ -> /ok/1.0.0"))
        .stdout(predicate::str::contains("[--] gone/: gone/package.json not found"));
}

#[test]
fn test_check_fails_on_malformed_descriptor() {
    let tmp = temp_dir();
    let dir = module(tmp.path(), "ui", 5, "org.example.bad", &["bad"]);
    write(dir.join("bad/package.json"), "{ not json");

    webpkg(tmp.path())
        .args(["check", "ui"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("[!!] bad/: bad/package.json"))
        .stderr(predicate::str::contains("malformed"));
}

#[test]
fn test_check_fails_without_manifest() {
    let tmp = temp_dir();

    webpkg(tmp.path())
        .args(["check"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no Module.toml found"));
}

// ============================================================================
// webpkg completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = temp_dir();

    webpkg(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("webpkg"));
}
