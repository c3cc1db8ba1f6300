//! Command-line tests for the converter binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("source")
}

fn converter() -> Command {
    Command::cargo_bin("lawmaking-converter").unwrap()
}

#[test]
fn test_convert_writes_outputs() {
    let output = tempfile::tempdir().unwrap();

    converter()
        .arg("convert")
        .arg("--source")
        .arg(fixture_dir())
        .arg("--output")
        .arg(output.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Documents: 5"))
        .stdout(predicate::str::contains("Warnings: 2"));

    assert!(output.path().join("csv").join("llhb041.csv").exists());
    assert!(output.path().join("json").join("llsr002.json").exists());
}

#[test]
fn test_convert_rejects_misnamed_source() {
    let source = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::copy(
        fixture_dir().join("llsr002.txt"),
        source.path().join("llsr002.txt"),
    )
    .unwrap();
    fs::write(source.path().join("notes.txt"), "").unwrap();

    converter()
        .arg("convert")
        .arg("--source")
        .arg(source.path())
        .arg("--output")
        .arg(output.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid source file name"));

    // Nothing is converted when the file set is invalid
    assert!(!output.path().join("json").exists());
}

#[test]
fn test_convert_reports_orphan_page() {
    let source = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(
        source.path().join("llsb001.txt"),
        "\"llsb\",\"001\",\"00010002.tif\",\"001\",\"001\",\"s\",\"2\",\"S. 1\",\"17890601\",\"A bill.\",\"\"\n",
    )
    .unwrap();

    converter()
        .arg("convert")
        .arg("--source")
        .arg(source.path())
        .arg("--output")
        .arg(output.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no preceding document"))
        .stderr(predicate::str::contains("1 of 1 files failed to convert"));
}

#[test]
fn test_convert_missing_source_dir() {
    let output = tempfile::tempdir().unwrap();

    converter()
        .arg("convert")
        .arg("--source")
        .arg(output.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Source directory does not exist"));
}

#[test]
fn test_parse_prints_json() {
    converter()
        .arg("parse")
        .arg(fixture_dir().join("llhb041.txt"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("["))
        .stdout(predicate::str::contains("\"record_number\": 480"))
        .stderr(predicate::str::contains("invalid calendar date '18340231'"));
}

#[test]
fn test_pattern_prints_compiled_pattern() {
    converter()
        .arg("pattern")
        .arg("llsb")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("(?-u)^\"(?:((?:llsb))|)\""));
}

#[test]
fn test_pattern_unknown_collection() {
    converter()
        .arg("pattern")
        .arg("llxx")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown collection: 'llxx'"));
}

#[test]
fn test_custom_settings() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("converter.yaml");
    fs::write(
        &config,
        "page_viewer_url: \"https://example.org/viewer\"\n\
         image_base_url: \"https://example.org/images\"\n\
         large_image_extension: \".tif\"\n\
         small_image_extension: \".jpg\"\n\
         record_digits:\n  default: 4\n",
    )
    .unwrap();

    converter()
        .arg("parse")
        .arg(fixture_dir().join("llhb041.txt"))
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://example.org/images/llhb/041/0000/00450001.jpg",
        ))
        .stdout(predicate::str::contains("\"record_number\": 45,"));
}
