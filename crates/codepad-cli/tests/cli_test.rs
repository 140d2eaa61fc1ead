//! CLI integration tests using assert_cmd
//!
//! These tests verify the CLI commands work correctly end-to-end.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command instance for the codepad binary, isolated in `dir`
fn codepad_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("codepad").expect("Failed to find codepad binary");
    cmd.env("CODEPAD_DATA_DIR", dir.path())
        .env_remove("CODEPAD_CONFIG")
        .env_remove("CODEPAD_LOG")
        .arg("--db")
        .arg(dir.path().join("test.db"));
    cmd
}

/// Pull the value of an `ID:` line out of command output
fn extract_id(stdout: &[u8]) -> String {
    String::from_utf8_lossy(stdout)
        .lines()
        .find_map(|l| l.trim().strip_prefix("ID: ").map(str::to_string))
        .expect("no ID line in output")
}

fn create_project(dir: &TempDir, args: &[&str]) -> String {
    let output = codepad_cmd(dir)
        .args(["project", "create"])
        .args(args)
        .output()
        .expect("Failed to run create");
    assert!(output.status.success());
    extract_id(&output.stdout)
}

#[test]
fn test_help_command() {
    Command::cargo_bin("codepad")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "codepad - project and file store for the codepad editor",
        ));
}

#[test]
fn test_version_command() {
    Command::cargo_bin("codepad")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("codepad"));
}

#[test]
fn test_project_help() {
    Command::cargo_bin("codepad")
        .unwrap()
        .args(["project", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Manage projects"));
}

#[test]
fn test_project_list_empty() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    codepad_cmd(&dir)
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No projects found."));
}

#[test]
fn test_create_show_and_list() {
    let dir = TempDir::new().unwrap();
    let id = create_project(&dir, &["Demo", "--starter", "--tab-size", "4"]);

    codepad_cmd(&dir)
        .args(["project", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project: Demo"))
        .stdout(predicate::str::contains("tabSize=4"))
        .stdout(predicate::str::contains("fontSize=14"))
        .stdout(predicate::str::contains("index.html"))
        .stdout(predicate::str::contains("script.js"));

    codepad_cmd(&dir)
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("{id} - Demo (3 files")));
}

#[test]
fn test_settings_merge() {
    let dir = TempDir::new().unwrap();
    let id = create_project(&dir, &["Demo", "--theme", "light"]);

    codepad_cmd(&dir)
        .args(["project", "settings", &id, "--font-size", "16"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "theme=light fontSize=16 tabSize=2",
        ));
}

#[test]
fn test_settings_rejects_zero() {
    let dir = TempDir::new().unwrap();
    let id = create_project(&dir, &["Demo"]);

    codepad_cmd(&dir)
        .args(["project", "settings", &id, "--tab-size", "0"])
        .assert()
        .failure();
}

#[test]
fn test_show_missing_project() {
    let dir = TempDir::new().unwrap();

    codepad_cmd(&dir)
        .args(["project", "show", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Project not found: nope"));
}

#[test]
fn test_file_add_and_delete() {
    let dir = TempDir::new().unwrap();
    let id = create_project(&dir, &["Demo"]);
    let source = dir.path().join("main.ts");
    fs::write(&source, "export const x = 1;\n").unwrap();

    let output = codepad_cmd(&dir)
        .args(["file", "add", &id])
        .arg(&source)
        .output()
        .unwrap();
    assert!(output.status.success());
    let file_id = extract_id(&output.stdout);

    codepad_cmd(&dir)
        .args(["project", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("main.ts  (typescript, 20 bytes)"));

    codepad_cmd(&dir)
        .args(["file", "delete", "some-other-project", &file_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing deleted"));

    codepad_cmd(&dir)
        .args(["file", "delete", &id, &file_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted file"));

    codepad_cmd(&dir)
        .args(["project", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("No files."));
}

#[test]
fn test_file_add_to_missing_project() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("a.js");
    fs::write(&source, "").unwrap();

    codepad_cmd(&dir)
        .args(["file", "add", "ghost"])
        .arg(&source)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Project not found: ghost"));
}

#[test]
fn test_export_import_roundtrip() {
    let dir = TempDir::new().unwrap();
    let id = create_project(&dir, &["Portable", "--starter"]);
    let export_path = dir.path().join("portable.json");

    codepad_cmd(&dir)
        .args(["project", "export", &id, "-o"])
        .arg(&export_path)
        .assert()
        .success();
    let exported = fs::read_to_string(&export_path).unwrap();
    assert!(exported.contains("\"name\": \"Portable\""));

    let output = codepad_cmd(&dir)
        .args(["project", "import"])
        .arg(&export_path)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Imported project 'Portable' (3 files)"));
    let new_id = extract_id(&output.stdout);
    assert_ne!(new_id, id);
}

#[test]
fn test_import_malformed_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, "{\"files\": 3}").unwrap();

    codepad_cmd(&dir)
        .args(["project", "import"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed data"));
}

#[test]
fn test_delete_project_with_force() {
    let dir = TempDir::new().unwrap();
    let id = create_project(&dir, &["Doomed", "--starter"]);

    codepad_cmd(&dir)
        .args(["project", "delete", &id, "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted project: Doomed"));

    codepad_cmd(&dir)
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No projects found."));
}

#[test]
fn test_delete_project_cancelled() {
    let dir = TempDir::new().unwrap();
    let id = create_project(&dir, &["Kept"]);

    codepad_cmd(&dir)
        .args(["project", "delete", &id])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cancelled."));

    codepad_cmd(&dir)
        .args(["project", "show", &id])
        .assert()
        .success();
}

#[test]
fn test_settings_get_set() {
    let dir = TempDir::new().unwrap();

    codepad_cmd(&dir)
        .args(["setting", "get", "nonexistent-key", "--default", "fallback"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"fallback\""));

    codepad_cmd(&dir)
        .args(["setting", "set", "editor.minimap", "false"])
        .assert()
        .success();

    codepad_cmd(&dir)
        .args(["setting", "get", "editor.minimap"])
        .assert()
        .success()
        .stdout(predicate::str::diff("false\n"));
}

#[test]
fn test_reset() {
    let dir = TempDir::new().unwrap();
    create_project(&dir, &["One"]);
    codepad_cmd(&dir)
        .args(["setting", "set", "k", "1"])
        .assert()
        .success();

    codepad_cmd(&dir)
        .args(["reset", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All data cleared."));

    codepad_cmd(&dir)
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No projects found."));
    codepad_cmd(&dir)
        .args(["setting", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No settings found."));
}

#[test]
fn test_config_file_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("codepad.toml"),
        "[defaults]\ntheme = \"light\"\nfontSize = 20\n",
    )
    .unwrap();

    let id = create_project(&dir, &["Configured"]);
    codepad_cmd(&dir)
        .args(["project", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("theme=light fontSize=20 tabSize=2"));
}
