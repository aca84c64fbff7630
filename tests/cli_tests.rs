//! Integration tests for the CLI application
//!
//! These tests run the compiled binary against CSV files in temporary
//! directories.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::{NamedTempFile, TempDir};

/// Training and test tables for a small four-class problem
struct TestDataFiles {
    pub dir: TempDir,
    pub train: PathBuf,
    pub test: PathBuf,
}

impl TestDataFiles {
    fn new() -> std::io::Result<Self> {
        let dir = TempDir::new()?;
        let train = dir.path().join("train.csv");
        let test = dir.path().join("test.csv");

        // Each class lights up one of four pixels
        let mut lines = vec!["label,pixel0,pixel1,pixel2,pixel3".to_string()];
        for i in 0..200 {
            let label = i % 4;
            let mut pixels = [5 + i % 3, 10 + i % 5, 3 + i % 4, 7 + i % 6];
            pixels[label] = 230 + i % 20;
            let pixels: Vec<String> = pixels.iter().map(|p| p.to_string()).collect();
            lines.push(format!("{label},{}", pixels.join(",")));
        }
        fs::write(&train, lines.join("\n") + "\n")?;

        fs::write(
            &test,
            "pixel0,pixel1,pixel2,pixel3\n240,5,5,5\n5,240,5,5\n5,5,240,5\n",
        )?;

        Ok(TestDataFiles { dir, train, test })
    }
}

/// Path of the binary built for this test run
fn get_cli_binary_path() -> &'static str {
    env!("CARGO_BIN_EXE_digitsvm")
}

fn run_cli(args: &[&str]) -> Output {
    Command::new(get_cli_binary_path())
        .args(args)
        .output()
        .expect("Failed to run CLI")
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp path is UTF-8")
}

#[test]
fn test_cli_run_command() {
    let data = TestDataFiles::new().expect("Failed to create test data");

    let output = run_cli(&[
        "run",
        "--train",
        path_str(&data.train),
        "--test",
        path_str(&data.test),
    ]);

    assert!(
        output.status.success(),
        "Run command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Training table shape: (200, 5)"));
    assert!(stdout.contains("Labels: [0, 1, 2, 3]"));
    assert!(stdout.contains("X_train shape: (40, 4)"));
    assert!(stdout.contains("Coefficient matrix shape: (6, 4)"));
    assert!(stdout.contains("Last coefficient row (classes 2 vs 3):"));
    assert!(stdout.contains("Holdout accuracy:"));
}

#[test]
fn test_cli_run_with_test_predictions() {
    let data = TestDataFiles::new().expect("Failed to create test data");

    let output = run_cli(&[
        "run",
        "--train",
        path_str(&data.train),
        "--test",
        path_str(&data.test),
        "--standardize-test",
        "--predict-test",
        "-C",
        "10",
    ]);

    assert!(
        output.status.success(),
        "Run command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Test predictions: 3 rows"));
    assert!(stdout.contains("# Format: row_index predicted_label"));

    let predictions: Vec<&str> = stdout
        .lines()
        .skip_while(|line| !line.starts_with("# Format"))
        .skip(1)
        .collect();
    assert_eq!(predictions, vec!["0 0", "1 1", "2 2"]);
}

#[test]
fn test_cli_run_with_config_file() {
    let data = TestDataFiles::new().expect("Failed to create test data");
    let mut config = NamedTempFile::new().expect("Failed to create temp file");
    write!(
        config,
        r#"{{"split": {{"train_fraction": 0.5, "test_fraction": 0.25}}}}"#
    )
    .expect("Failed to write");
    config.flush().expect("Failed to flush");

    let output = run_cli(&[
        "run",
        "--train",
        path_str(&data.train),
        "--test",
        path_str(&data.test),
        "--config",
        path_str(config.path()),
    ]);

    assert!(
        output.status.success(),
        "Run command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("X_train shape: (100, 4)"));
    assert!(stdout.contains("(50 rows)"));
}

#[test]
fn test_cli_describe_command() {
    let data = TestDataFiles::new().expect("Failed to create test data");

    let output = run_cli(&["describe", path_str(&data.train), "--limit", "2"]);

    assert!(
        output.status.success(),
        "Describe command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Shape: (200, 5)"));
    assert!(stdout.contains("Label counts:"));
    assert!(stdout.contains("  3: 50"));
    assert!(stdout.contains("pixel1"));
    assert!(!stdout.contains("pixel2"));
    assert!(stdout.contains("... (2 more)"));
}

#[test]
fn test_cli_missing_file() {
    let data = TestDataFiles::new().expect("Failed to create test data");
    let missing = data.dir.path().join("missing.csv");

    let output = run_cli(&[
        "run",
        "--train",
        path_str(&missing),
        "--test",
        path_str(&data.test),
    ]);

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error"));
}

#[test]
fn test_cli_invalid_arguments() {
    let data = TestDataFiles::new().expect("Failed to create test data");

    let output = run_cli(&[
        "run",
        "--train",
        path_str(&data.train),
        "--test",
        path_str(&data.test),
        "--train-size",
        "0.9",
    ]);
    assert_eq!(output.status.code(), Some(1));

    let output = run_cli(&["run", "--zero-variance", "sometimes"]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_help() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("run"));
    assert!(stdout.contains("describe"));
}
