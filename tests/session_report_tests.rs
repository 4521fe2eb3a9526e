// Integration tests for the mouse-metrics CLI
#![allow(deprecated)] // suppress assert_cmd::Command::cargo_bin deprecation in tests

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SESSION: &str = "\
timestamp,x,y,speed,fatigue_index,stress_indicator,pixel_perfect_precision,is_burst
0.0,100,200,10,0.1,0.1,0.95,False
0.5,102,201,12,0.2,0.1,0.92,True
1.0,105,205,12,0.4,0.1,0.90,False
1.5,110,210,13,0.9,0.1,0.93,False
2.0,111,212,12,0.5,0.1,0.91,True
2.5,115,215,200,0.3,0.1,0.94,False
";

fn write_session(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn cmd(tmp: &TempDir) -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mouse-metrics");
    cmd.current_dir(tmp.path());
    cmd
}

#[test]
fn test_no_arguments_prints_usage_and_succeeds() {
    let tmp = TempDir::new().unwrap();
    cmd(&tmp)
        .assert()
        .success()
        .stdout(predicate::str::contains("Pass one or more session CSV files"));
}

#[test]
fn test_single_session_report() {
    let tmp = TempDir::new().unwrap();
    let input = write_session(tmp.path(), "session.csv", SESSION);

    cmd(&tmp)
        .arg("--no-charts")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("📂 Analyzing file: session.csv"))
        .stdout(predicate::str::contains("• 6 rows, 8 columns"))
        .stdout(predicate::str::contains("• Time range: 0.00 to 2.50 s"))
        .stdout(predicate::str::contains("🚨 1 abnormal movements detected (speed outliers)"))
        .stdout(predicate::str::contains("Fatigue detected during the session"))
        .stdout(predicate::str::contains("Pixel precision is very good overall"))
        .stdout(predicate::str::contains("Stress detected").not())
        .stdout(predicate::str::contains("✅ Report generated in:"));

    let out = tmp.path().join("session_report");
    assert!(out.join("statistics.csv").is_file());
    assert!(out.join("summary.json").is_file());
    assert!(out.join("report.html").is_file());

    let anomalies = fs::read_to_string(out.join("anomalies.csv")).unwrap();
    assert_eq!(anomalies, "timestamp,x,y,speed\n2.5,115,215,200\n");
}

#[test]
fn test_statistics_csv_contents() {
    let tmp = TempDir::new().unwrap();
    let input = write_session(tmp.path(), "session.csv", SESSION);
    cmd(&tmp).arg("--no-charts").arg(&input).assert().success();

    let stats = fs::read_to_string(tmp.path().join("session_report/statistics.csv")).unwrap();
    let mut lines = stats.lines();
    assert_eq!(lines.next(), Some("column,mean,std,min,max"));
    assert!(stats.contains("\nstress_indicator,0.1,0,0.1,0.1\n"));
    // boolean-like columns are not described
    assert!(!stats.contains("is_burst"));
}

#[test]
fn test_summary_json_is_valid() {
    let tmp = TempDir::new().unwrap();
    let input = write_session(tmp.path(), "session.csv", SESSION);
    cmd(&tmp).arg("--no-charts").arg(&input).assert().success();

    let json = fs::read_to_string(tmp.path().join("session_report/summary.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["source"], "session.csv");
    assert_eq!(value["rows"], 6);
    assert_eq!(value["outliers"]["count"], 1);
    assert_eq!(value["findings"][0]["code"], "fatigue_detected");
}

#[test]
fn test_missing_file_reported_and_batch_continues() {
    let tmp = TempDir::new().unwrap();
    let input = write_session(tmp.path(), "session.csv", SESSION);

    cmd(&tmp)
        .arg("--no-charts")
        .arg("does_not_exist.csv")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("❌ File not found: does_not_exist.csv"))
        .stdout(predicate::str::contains("📂 Analyzing file: session.csv"));
}

#[test]
fn test_missing_timestamp_reported() {
    let tmp = TempDir::new().unwrap();
    let input = write_session(tmp.path(), "bad.csv", "x,y\n1,2\n3,4\n");

    cmd(&tmp)
        .arg("--no-charts")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("❌ Missing required column 'timestamp'"));
    assert!(!tmp.path().join("bad_report").exists());
}

#[test]
fn test_output_root_option() {
    let tmp = TempDir::new().unwrap();
    let input = write_session(tmp.path(), "session.csv", SESSION);
    let root = tmp.path().join("reports");

    cmd(&tmp)
        .arg("--no-charts")
        .arg("--output-root")
        .arg(&root)
        .arg(&input)
        .assert()
        .success();
    assert!(root.join("session_report/statistics.csv").is_file());
}

#[test]
fn test_constant_speed_writes_no_anomalies() {
    let tmp = TempDir::new().unwrap();
    let mut csv = String::from("timestamp,speed\n");
    for i in 0..10 {
        csv.push_str(&format!("{},50\n", i));
    }
    let input = write_session(tmp.path(), "flat.csv", &csv);

    cmd(&tmp)
        .arg("--no-charts")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("abnormal movements").not())
        .stdout(predicate::str::contains("⚡ 0 flicks detected"));
    assert!(!tmp.path().join("flat_report/anomalies.csv").exists());
}

#[test]
fn test_multi_file_header_printed_first() {
    let tmp = TempDir::new().unwrap();
    let a = write_session(tmp.path(), "a.csv", SESSION);
    let b = write_session(tmp.path(), "b.csv", SESSION);

    let output = cmd(&tmp)
        .arg("--no-charts")
        .arg(&a)
        .arg(&b)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let header = stdout.find("📊 Multi-file comparative analysis:").unwrap();
    let first = stdout.find("📂 Analyzing file: a.csv").unwrap();
    let second = stdout.find("📂 Analyzing file: b.csv").unwrap();
    assert!(header < first && first < second);
}

#[test]
fn test_reduced_mode_flag() {
    let tmp = TempDir::new().unwrap();
    let input = write_session(tmp.path(), "session.csv", SESSION);

    cmd(&tmp)
        .arg("--no-charts")
        .arg("--mode")
        .arg("reduced")
        .arg(&input)
        .assert()
        .success();

    let json = fs::read_to_string(tmp.path().join("session_report/summary.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["mode"], "reduced");
    // short focus list: speed, fatigue_index, stress_indicator present
    assert_eq!(value["correlations"]["columns"].as_array().unwrap().len(), 3);
}

#[test]
fn test_config_file_applied() {
    let tmp = TempDir::new().unwrap();
    let input = write_session(tmp.path(), "session.csv", SESSION);
    let config = write_session(tmp.path(), "analysis.toml", "mode = \"reduced\"\ndocument = false\n");

    cmd(&tmp)
        .arg("--no-charts")
        .arg("--config")
        .arg(&config)
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Document").not());
    assert!(!tmp.path().join("session_report/report.html").exists());
}

#[test]
fn test_invalid_config_file_fails() {
    let tmp = TempDir::new().unwrap();
    let input = write_session(tmp.path(), "session.csv", SESSION);
    let config = write_session(tmp.path(), "analysis.toml", "flick_sigma = -2.0\n");

    cmd(&tmp)
        .arg("--config")
        .arg(&config)
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("flick_sigma"));
}

#[test]
fn test_no_document_flag() {
    let tmp = TempDir::new().unwrap();
    let input = write_session(tmp.path(), "session.csv", SESSION);

    cmd(&tmp)
        .arg("--no-charts")
        .arg("--no-document")
        .arg(&input)
        .assert()
        .success();
    assert!(!tmp.path().join("session_report/report.html").exists());
}
