//! CLI integration tests for sqlserver-scripts.
//!
//! These tests verify command-line argument parsing, help output,
//! and exit codes for errors raised before any table is scripted.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the sqlserver-scripts binary.
fn cmd() -> Command {
    Command::cargo_bin("sqlserver-scripts").unwrap()
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("export-tables"))
        .stdout(predicate::str::contains("export-table"))
        .stdout(predicate::str::contains("interactive"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sqlserver-scripts"));
}

#[test]
fn test_export_tables_help() {
    cmd()
        .args(["export-tables", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--server"))
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--database"))
        .stdout(predicate::str::contains("--user"))
        .stdout(predicate::str::contains("--password"))
        .stdout(predicate::str::contains("--schema"))
        .stdout(predicate::str::contains("--output-dir"))
        .stdout(predicate::str::contains("--exclude-indexes"))
        .stdout(predicate::str::contains("--exclude-foreign-keys"))
        .stdout(predicate::str::contains("--verbose"))
        .stdout(predicate::str::contains("--tables"));
}

#[test]
fn test_export_table_help() {
    cmd()
        .args(["export-table", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--table"))
        .stdout(predicate::str::contains("--output-dir"))
        .stdout(predicate::str::contains("[default: .]"));
}

#[test]
fn test_interactive_help() {
    cmd()
        .args(["interactive", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn test_log_format_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("[default: text]"));
}

// =============================================================================
// Exit Code Tests
// =============================================================================

#[test]
fn test_no_subcommand_shows_usage() {
    cmd()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_unknown_flag_exits_with_code_1() {
    cmd()
        .args(["export-tables", "--no-such-flag"])
        .assert()
        .code(1);
}

#[test]
fn test_invalid_log_format_exits_with_code_1() {
    cmd()
        .args(["--log-format", "xml", "export-tables"])
        .assert()
        .code(1);
}

#[test]
fn test_export_table_requires_table() {
    cmd()
        .args(["export-table", "-d", "Sales", "-u", "sa", "-w", "secret"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--table"));
}

#[test]
fn test_missing_database_exits_with_code_1() {
    cmd()
        .args(["export-tables", "-u", "sa", "-w", "secret"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: Configuration error: database is required"));
}

#[test]
fn test_missing_password_exits_with_code_1() {
    cmd()
        .args(["export-table", "-d", "Sales", "-u", "sa", "-t", "Orders"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("password is required"));
}

#[test]
fn test_invalid_port_exits_with_code_1() {
    cmd()
        .args(["export-tables", "-p", "not-a-port"])
        .assert()
        .code(1);
}

#[test]
fn test_missing_config_file_exits_with_code_1() {
    cmd()
        .args(["export-tables", "--config", "nonexistent_config_file.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("IO error"));
}

#[test]
fn test_invalid_yaml_exits_with_code_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "invalid: yaml: content: [").unwrap();

    cmd()
        .args(["export-tables", "--config", file.path().to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("YAML error"));
}

#[test]
fn test_config_file_values_are_validated() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "connection:").unwrap();
    writeln!(file, "  database: Sales").unwrap();
    writeln!(file, "  user: sa").unwrap();

    cmd()
        .args(["export-tables", "--config", file.path().to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("password is required"));
}

#[test]
fn test_instance_name_with_backslash_rejected() {
    cmd()
        .args([
            "export-tables",
            "-d",
            "Sales",
            "-u",
            "sa",
            "-w",
            "secret",
            "--instance",
            "bad\\name",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("instance name"));
}

#[test]
fn test_unreachable_server_exits_with_code_1() {
    let dir = tempfile::tempdir().unwrap();

    cmd()
        .args([
            "export-table",
            "-s",
            "127.0.0.1",
            "-p",
            "1",
            "-d",
            "Sales",
            "-u",
            "sa",
            "-w",
            "secret",
            "-t",
            "Orders",
            "-o",
            dir.path().to_str().unwrap(),
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Connection error"));

    // Nothing written when the connection fails.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_empty_instance_flag_clears_config_instance() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "connection:").unwrap();
    writeln!(file, "  host: 127.0.0.1").unwrap();
    writeln!(file, "  port: 1").unwrap();
    writeln!(file, "  instance_name: \"bad;name\"").unwrap();
    writeln!(file, "  database: Sales").unwrap();
    writeln!(file, "  user: sa").unwrap();
    writeln!(file, "  password: secret").unwrap();

    // The configured port is dialed directly instead of going through SQL Browser.
    cmd()
        .args([
            "export-tables",
            "--config",
            file.path().to_str().unwrap(),
            "--instance",
            "",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to reach 127.0.0.1:1"));
}
