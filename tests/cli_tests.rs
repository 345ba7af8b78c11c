//! CLI integration tests
//!
//! These tests verify the CLI works correctly by running the binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fginspect_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_fginspect"))
}

fn fixtures_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path
}

/// Copy the fixture geodatabase into `dir` and return its path
fn seed_city_gdb(dir: &Path) -> PathBuf {
    let gdb = dir.join("city.gdb");
    fs::create_dir(&gdb).unwrap();
    fs::copy(
        fixtures_dir().join("city.gdb").join("catalog.json"),
        gdb.join("catalog.json"),
    )
    .unwrap();
    gdb
}

fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(fginspect_bin())
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to execute command")
}

// ============================================================================
// Argument Handling Tests
// ============================================================================

#[test]
fn test_cli_without_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), &[]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1), "should exit with 1");
    assert!(stderr.contains("Usage: fginspect filegdb"), "should print usage");
}

#[test]
fn test_cli_with_two_arguments_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    seed_city_gdb(dir.path());

    let output = run_in(dir.path(), &["city.gdb", "other.gdb"]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1), "should exit with 1");
    assert!(stderr.contains("Usage: fginspect filegdb"), "should print usage");
    assert!(!dir.path().join("city.txt").exists(), "no report should be written");
}

#[test]
fn test_cli_missing_geodatabase() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), &["nowhere.gdb"]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1), "should exit with 1");
    assert!(stderr.contains("The File geodatabase is missing..."));
    assert!(!dir.path().join("nowhere.txt").exists());
}

#[test]
fn test_cli_unopenable_geodatabase() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("empty.gdb")).unwrap();

    let output = run_in(dir.path(), &["empty.gdb"]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1), "should exit with 1");
    assert!(stderr.contains("Error:"), "should report the open failure");
    assert!(!dir.path().join("empty.txt").exists());
}

#[test]
fn test_cli_version() {
    let output = Command::new(fginspect_bin())
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "--version should succeed");
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

// ============================================================================
// Report Tests
// ============================================================================

#[test]
fn test_cli_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let gdb = seed_city_gdb(dir.path());

    let output = run_in(dir.path(), &[gdb.to_str().unwrap()]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "inspect should succeed: {}", stderr);
    assert!(stderr.contains("Processing datasets"), "should log progress");
    assert!(stderr.contains("Bridges"), "should log the unreadable feature class");

    let report = fs::read_to_string(dir.path().join("city.txt")).expect("report should exist");

    assert!(report.starts_with(&format!("Geodatabase: {}\n\n", gdb.display())));
    assert!(report.contains("WGS_1984_Web_Mercator_Auxiliary_Sphere"));
    assert!(report.contains("  2550000.000  4150000.000  2650000.500  4250000.250"));
    assert!(report.contains(&format!(
        "{:<30} {:<30} {:<10} {:>6} {:>7}",
        "Roads", "Streets", "Polyline", 5, 120
    )));
    assert!(report.contains(&format!(
        "{:<30} {:<30} {:<10} {:>6} {:>7}",
        "", "Parcels", "Polygon", 3, 3412
    )));
    assert!(!report.contains("Bridges"), "unreadable items stay out of the report");

    assert!(report.contains(&format!("{:<30} {:<10} {:<40}", "SpeedLimit", "0", "130")));
    assert!(report.contains(&format!(
        "{:<50} {:<30} {:<30} {:<30} {:<30} {:<20}",
        "ParcelOwners", "Parcels", "OBJECTID", "Owners", "PARCEL_ID", "OneToMany"
    )));
    assert!(report.contains(&format!(
        "{:<50} {:<30} {:<30} {:<30} {:<30} {:<20}",
        "StreetSigns", "Streets", "OBJECTID", "Signs", "STREET_ID", "OneToMany"
    )));
}

#[test]
fn test_cli_regenerates_report() {
    let dir = tempfile::tempdir().unwrap();
    let gdb = seed_city_gdb(dir.path());
    fs::write(dir.path().join("city.txt"), "old report").unwrap();

    let output = run_in(dir.path(), &["city.gdb"]);
    assert!(output.status.success());

    let report = fs::read_to_string(dir.path().join("city.txt")).unwrap();
    assert!(report.starts_with("Geodatabase: city.gdb\n"));
    assert!(!report.contains("old report"));
    assert!(gdb.is_dir());
}
