//! CLI argument parsing and start-up failure tests

use std::process::Command;
use tempfile::TempDir;

fn dtsh() -> Command {
    Command::new(env!("CARGO_BIN_EXE_dtsh"))
}

#[test]
fn test_help_lists_options() {
    let output = dtsh().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for option in ["--bindings", "--theme", "--sparse", "--config-dir", "--log", "--log-level"] {
        assert!(stdout.contains(option), "missing {} in help", option);
    }
}

#[test]
fn test_version() {
    let output = dtsh().arg("--version").output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_model_exits_with_error() {
    let config_dir = TempDir::new().unwrap();
    let output = dtsh()
        .arg("/nonexistent/board.json")
        .arg("--config-dir")
        .arg(config_dir.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("dtsh: "));
    assert!(stderr.contains("Failed to read devicetree model: /nonexistent/board.json"));
    // Nothing is written to the config directory on a failed start.
    assert!(!config_dir.path().join("dtsh_history").exists());
}

#[test]
fn test_invalid_model_exits_with_error() {
    let dir = TempDir::new().unwrap();
    let model = dir.path().join("board.json");
    std::fs::write(&model, r#"{ "root": { "name": "soc" } }"#).unwrap();

    let output = dtsh()
        .arg(&model)
        .arg("--config-dir")
        .arg(dir.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("root node must be named '/'"));
}

#[test]
fn test_log_file_is_written() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("logs").join("dtsh.log");
    let output = dtsh()
        .arg("/nonexistent/board.json")
        .arg("--config-dir")
        .arg(dir.path())
        .arg("--log")
        .arg(&log)
        .arg("--log-level")
        .arg("debug")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let contents = std::fs::read_to_string(&log).unwrap();
    assert!(contents.contains("logging started"));
}

#[test]
fn test_missing_model_argument() {
    let output = dtsh().output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("<DT>"));
}
