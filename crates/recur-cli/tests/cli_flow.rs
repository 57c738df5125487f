//! End-to-end tests driving the `recur` binary with file and env configuration.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn recur_binary() -> String {
    env!("CARGO_BIN_EXE_recur").to_string()
}

/// Runs `recur` with `HOME` isolated to `home` and no inherited `RECUR_*` settings.
fn recur(home: &Path, args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut command = Command::new(recur_binary());
    command
        .env("HOME", home)
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("RECUR_TIMEZONE")
        .env_remove("RECUR_COUNT")
        .env_remove("RUST_LOG")
        .args(args);
    for (key, value) in env {
        command.env(key, value);
    }
    command.output().expect("failed to run recur")
}

fn write_config(dir: &Path, contents: &str) -> String {
    let path = dir.join("schedule.toml");
    std::fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

const CLAMPED_STEPS: &str = r#"
timezone = "UTC"
count = 4

[schedule]
kind = "on_or_before"
cutoff = "22:00"

[schedule.inner]
kind = "random"
minimum_gap_secs = 5400
expected_addition_secs = 0
"#;

fn occurrence_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|line| line.trim_start().starts_with(|c: char| c.is_ascii_digit()))
        .map(|line| line.trim().to_string())
        .collect()
}

#[test]
fn test_preview_from_config_file() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), CLAMPED_STEPS);

    let output = recur(
        temp.path(),
        &["--config", &config, "preview", "--from", "2025-01-06T18:00:00Z"],
        &[],
    );
    assert!(
        output.status.success(),
        "preview should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    assert_eq!(
        occurrence_lines(&output),
        vec![
            "1. Mon 2025-01-06 19:30:00 UTC",
            "2. Mon 2025-01-06 21:00:00 UTC",
            "3. Mon 2025-01-06 22:00:00 UTC",
            "4. Tue 2025-01-07 10:30:00 UTC",
        ]
    );
}

#[test]
fn test_env_overrides_config_file() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), CLAMPED_STEPS);

    let output = recur(
        temp.path(),
        &["--config", &config, "preview", "--from", "2025-01-06T18:00:00Z"],
        &[("RECUR_COUNT", "2"), ("RECUR_TIMEZONE", "Asia/Tokyo")],
    );
    assert!(output.status.success());

    // 18:00Z is 03:00 JST. Early morning steps clamp back onto the previous
    // evening, which is before the anchor, so they are dropped.
    assert_eq!(
        occurrence_lines(&output),
        vec![
            "1. Tue 2025-01-07 10:30:00 JST",
            "2. Tue 2025-01-07 12:00:00 JST",
        ]
    );
}

#[test]
fn test_default_config_location_is_used() {
    let temp = TempDir::new().unwrap();
    let config_dir = temp.path().join(".config/recur");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), CLAMPED_STEPS).unwrap();

    let output = recur(temp.path(), &["check"], &[]);
    assert!(
        output.status.success(),
        "check should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Schedule OK"));
    assert!(stdout.contains("on or before 22:00"));
}

#[test]
fn test_preview_json_is_parseable() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), CLAMPED_STEPS);

    let output = recur(
        temp.path(),
        &[
            "--config",
            &config,
            "preview",
            "--json",
            "-n",
            "1",
            "--from",
            "2025-01-06T18:00:00Z",
        ],
        &[],
    );
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        value["occurrences"],
        serde_json::json!(["2025-01-06T19:30:00+00:00"])
    );
}

#[test]
fn test_check_reports_invalid_schedule() {
    let temp = TempDir::new().unwrap();
    let config = write_config(
        temp.path(),
        r#"
[schedule]
kind = "random"
minimum_gap_secs = 0
expected_addition_secs = 60
"#,
    );

    let output = recur(temp.path(), &["--config", &config, "check"], &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("minimum gap must be positive"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn test_preview_without_schedule_fails() {
    let temp = TempDir::new().unwrap();

    let output = recur(temp.path(), &["preview"], &[]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no schedule configured"));
}
