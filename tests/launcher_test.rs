#![cfg(unix)]

use customer_recsys::app::{LaunchOutcome, LaunchPlan, LaunchStep};
use customer_recsys::config::LauncherConfig;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::TempDir;

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

fn config(dir: &Path, install: &[&str], app: &[&str]) -> LauncherConfig {
    LauncherConfig {
        working_dir: dir.to_string_lossy().to_string(),
        env_dirs: argv(&["venv"]),
        install: argv(install),
        app: argv(app),
    }
}

fn write_script(path: &Path, body: &str) {
    std::fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

#[tokio::test]
async fn test_activation_exposes_environment_tools() {
    let dir = TempDir::new().unwrap();
    let bin = dir.path().join("venv").join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    // 只有啟用環境後才找得到 recsys-env-report
    write_script(
        &bin.join("recsys-env-report"),
        "echo \"$VIRTUAL_ENV|${PYTHONHOME:-unset}\" > activation.out",
    );

    let plan = LaunchPlan::from_config(&config(dir.path(), &[], &["recsys-env-report"])).unwrap();
    assert!(plan.env.is_some());

    let outcome = plan.run().await.unwrap();
    assert_eq!(outcome, LaunchOutcome::Completed);

    let written = std::fs::read_to_string(dir.path().join("activation.out")).unwrap();
    let expected_root = std::fs::canonicalize(dir.path().join("venv")).unwrap();
    assert_eq!(
        written.trim(),
        format!("{}|unset", expected_root.display())
    );
}

#[tokio::test]
async fn test_install_runs_before_app() {
    let dir = TempDir::new().unwrap();
    let plan = LaunchPlan::from_config(&config(
        dir.path(),
        &["sh", "-c", "echo install >> steps.log"],
        &["sh", "-c", "echo app >> steps.log"],
    ))
    .unwrap();
    assert!(plan.env.is_none());

    assert_eq!(plan.run().await.unwrap(), LaunchOutcome::Completed);
    let log = std::fs::read_to_string(dir.path().join("steps.log")).unwrap();
    assert_eq!(log.lines().collect::<Vec<_>>(), vec!["install", "app"]);
}

#[tokio::test]
async fn test_failed_install_stops_launch() {
    let dir = TempDir::new().unwrap();
    let plan = LaunchPlan::from_config(&config(
        dir.path(),
        &["sh", "-c", "exit 3"],
        &["sh", "-c", "touch app-ran"],
    ))
    .unwrap();

    let outcome = plan.run().await.unwrap();
    assert_eq!(
        outcome,
        LaunchOutcome::Failed {
            step: LaunchStep::Install,
            code: 3
        }
    );
    assert_eq!(outcome.exit_code(), 3);
    assert!(!dir.path().join("app-ran").exists());
}

#[tokio::test]
async fn test_app_exit_status_is_propagated() {
    let dir = TempDir::new().unwrap();
    let plan =
        LaunchPlan::from_config(&config(dir.path(), &[], &["sh", "-c", "exit 5"])).unwrap();

    assert_eq!(plan.run().await.unwrap().exit_code(), 5);
}

#[tokio::test]
async fn test_missing_program_exits_127() {
    let dir = TempDir::new().unwrap();
    let plan = LaunchPlan::from_config(&config(
        dir.path(),
        &["recsys-definitely-missing-installer"],
        &["sh", "-c", "true"],
    ))
    .unwrap();

    let outcome = plan.run().await.unwrap();
    assert_eq!(
        outcome,
        LaunchOutcome::Failed {
            step: LaunchStep::Install,
            code: 127
        }
    );
}
