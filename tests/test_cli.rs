use assert_cmd::Command;
use predicates::prelude::*;

mod common;

#[test]
fn report_over_stdin_emits_json() {
    let line = common::record_line("A", "2025-01-01T08:00:00.000Z", "start", None);

    let mut cmd = Command::cargo_bin("metrics-report").unwrap();
    cmd.args(["report", "--since", "2025-01-01", "--until", "2025-01-02", "--json"])
        .write_stdin(format!("{line}\n"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"uniqueUsers\": 1"))
        .stdout(predicate::str::contains("\"startDate\": \"2025-01-01\""));
}

#[test]
fn invalid_since_date_exits_nonzero() {
    let mut cmd = Command::cargo_bin("metrics-report").unwrap();
    cmd.args(["report", "--since", "01/01/2025"]).write_stdin("");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid since date"));
}

#[test]
fn corrupt_stdin_fails_without_partial_report() {
    let mut cmd = Command::cargo_bin("metrics-report").unwrap();
    cmd.args(["report", "--since", "2025-01-01", "--until", "2025-01-02"])
        .write_stdin("{broken\n");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("malformed metric record"));
}

#[test]
fn inverted_window_is_rejected() {
    let mut cmd = Command::cargo_bin("metrics-report").unwrap();
    cmd.args(["report", "--since", "2025-01-05", "--until", "2025-01-01"])
        .write_stdin("");

    cmd.assert().failure();
}
