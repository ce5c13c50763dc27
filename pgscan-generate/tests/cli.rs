//! Process-level tests for the generator binary.
//!
//! These cover everything that fails before a database connection is opened,
//! so no server is needed.

use std::io::Write;
use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pgscan-generate"))
        .args(args)
        .env_remove("PGPASSWORD")
        .env_remove("PGHOST")
        .env_remove("PGPORT")
        .output()
        .expect("failed to launch pgscan-generate")
}

#[test]
fn test_help_lists_options() {
    let output = run(&["--help"]);
    assert!(output.status.success());

    let help = String::from_utf8_lossy(&output.stdout);
    for flag in [
        "--host",
        "--port",
        "--database",
        "--user",
        "--password",
        "--output-dir",
        "--batch-size",
        "--search-term",
        "--template",
        "--config",
        "--extension",
    ] {
        assert!(help.contains(flag), "help is missing {}", flag);
    }
}

#[test]
fn test_zero_batch_size_fails_before_connecting() {
    let output = tempfile::tempdir().unwrap();
    let dir = output.path().join("batches");

    let result = run(&[
        "--batch-size",
        "0",
        "-w",
        "--output-dir",
        dir.to_str().unwrap(),
    ]);

    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("batch_size"));
    assert!(!dir.exists());
}

#[test]
fn test_template_without_placeholders_fails_before_connecting() {
    let mut template = tempfile::NamedTempFile::new().unwrap();
    write!(template, "SELECT 1;").unwrap();

    let result = run(&["-w", "--template", template.path().to_str().unwrap()]);

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("{TABLE_SCAN_BLOCKS}"));
}

#[test]
fn test_unreachable_server_exits_with_error() {
    let output = tempfile::tempdir().unwrap();

    // Port 1 on localhost refuses connections
    let result = run(&[
        "-w",
        "--host",
        "127.0.0.1",
        "--port",
        "1",
        "--output-dir",
        output.path().to_str().unwrap(),
    ]);

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("connection failed"));
    assert!(stderr.contains("127.0.0.1:1"), "target missing from: {}", stderr);
    assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
}
