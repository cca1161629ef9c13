// integration tests for the chlog binary

use chlog::utils::testing::{TestProject, TestProjectBuilder, TestScenario};
use std::process::{Command, Output};

fn run(project: &TestProject, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_chlog"))
        .arg("--path")
        .arg(project.path())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_cli_init_and_patch() {
    let project = TestScenario::Fresh.build().unwrap();

    let output = run(&project, &["init"]);
    assert!(output.status.success());
    assert!(project.read_changelog().contains("## [Unreleased]"));

    project
        .write_changelog("## [Unreleased]\n### Added\n- cli support\n")
        .unwrap();

    let output = run(&project, &["patch"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("released 1.0.0 with 1 item(s)"));
    assert!(project.read_changelog().contains("## [1.0.0]\n\n### Added\n- cli support\n"));
}

#[test]
fn test_cli_init_twice_fails() {
    let project = TestScenario::UnreleasedOnly.build().unwrap();
    let output = run(&project, &["init"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("already initialized"));
}

#[test]
fn test_cli_get() {
    let project = TestScenario::History.build().unwrap();

    let output = run(&project, &["get", "0.3.0", "--no-header"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "### Changed\n- faster startup\n");

    let output = run(&project, &["get", "--latest"]);
    assert_eq!(stdout(&output), "## [0.3.0] - 2024-05-01\n\n### Changed\n- faster startup\n");

    let output = run(&project, &["get", "--unreleased", "--format", "json"]);
    let sections: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(sections[0]["label"], "Unreleased");
    assert_eq!(sections[0]["is_unreleased"], true);

    let output = run(&project, &["get", "7.0.0"]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_has() {
    let project = TestScenario::History.build().unwrap();

    assert!(run(&project, &["has", "0.2.0"]).status.success());
    assert_eq!(run(&project, &["has", "0.9.0"]).status.code(), Some(1));
}

#[test]
fn test_cli_list_sorted() {
    let project = TestProjectBuilder::new()
        .changelog("## [0.10.0]\n\n## [0.9.0]\n\n## [1.0.0]\n")
        .build()
        .unwrap();

    let output = run(&project, &["list", "--sorted", "--format", "json"]);
    let versions: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let labels: Vec<_> = versions
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["version"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(labels, ["1.0.0", "0.10.0", "0.9.0"]);
}

#[test]
fn test_cli_overrides() {
    let project = TestProjectBuilder::new()
        .without_manifest()
        .changelog_path("HISTORY.md")
        .changelog("## [Unreleased]\n### Fixed\n- typo\n")
        .build()
        .unwrap();

    // no Cargo.toml and no configured version
    let output = run(&project, &["--file", "HISTORY.md", "patch"]);
    assert!(!output.status.success());

    let output = run(
        &project,
        &["--file", "HISTORY.md", "--project-version", "2.1.0", "patch"],
    );
    assert!(output.status.success());
    assert!(project.read_changelog().contains("## [2.1.0]"));
}
