//! Basic CLI E2E tests.
//!
//! Tests run the built binary against a throwaway data directory.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_focusflow"))
        .args(args)
        .env("FOCUSFLOW_DATA_DIR", data_dir)
        .env_remove("FOCUSFLOW_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_ok(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    stdout
}

#[test]
fn test_timer_modes_lists_catalog() {
    let tmp = TempDir::new().unwrap();
    let out = run_ok(tmp.path(), &["timer", "modes"]);
    for name in ["Pomodoro", "52/17", "Ultradian", "Custom"] {
        assert!(out.contains(name), "missing {name} in {out}");
    }
    assert!(tmp.path().join("config.toml").exists());
}

#[test]
fn test_log_then_list_sessions() {
    let tmp = TempDir::new().unwrap();
    run_ok(tmp.path(), &["sessions", "log", "--mode", "pomodoro", "--minutes", "25"]);
    run_ok(tmp.path(), &["sessions", "log", "--mode", "52/17", "--minutes", "52"]);

    let out = run_ok(tmp.path(), &["sessions", "list", "--json"]);
    let sessions: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(sessions.as_array().unwrap().len(), 2);
    assert_eq!(sessions[0]["mode_name"], "Pomodoro");

    let out = run_ok(tmp.path(), &["sessions", "list", "--mode", "52/17", "--json"]);
    let sessions: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(sessions.as_array().unwrap().len(), 1);

    let out = run_ok(tmp.path(), &["sessions", "list", "--to", "2000-01-01", "--json"]);
    let sessions: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert!(sessions.as_array().unwrap().is_empty());
}

#[test]
fn test_log_rejects_unknown_mode_and_zero_minutes() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(tmp.path(), &["sessions", "log", "--mode", "nap", "--minutes", "20"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("nap"));

    let (_, _, code) = run_cli(tmp.path(), &["sessions", "log", "--mode", "Pomodoro", "--minutes", "0"]);
    assert_ne!(code, 0);
}

#[test]
fn test_stats_json() {
    let tmp = TempDir::new().unwrap();
    run_ok(tmp.path(), &["sessions", "log", "--mode", "Ultradian", "--minutes", "90"]);
    let out = run_ok(tmp.path(), &["stats", "--json"]);
    let stats: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(stats["total_sessions"], 1);
    assert_eq!(stats["total_focus_minutes"], 90);
    assert_eq!(stats["current_streak"], 1);
}

#[test]
fn test_config_set_get_reset() {
    let tmp = TempDir::new().unwrap();
    run_ok(tmp.path(), &["config", "set", "automation.auto_start_breaks", "true"]);
    assert_eq!(run_ok(tmp.path(), &["config", "get", "automation.auto_start_breaks"]).trim(), "true");

    let (_, _, code) = run_cli(tmp.path(), &["config", "set", "timer.default_mode", "Siesta"]);
    assert_eq!(code, 1);
    let (_, _, code) = run_cli(tmp.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);

    run_ok(tmp.path(), &["config", "reset"]);
    assert_eq!(run_ok(tmp.path(), &["config", "get", "automation.auto_start_breaks"]).trim(), "false");
}

#[test]
fn test_config_set_rejects_invalid_custom_pair() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(tmp.path(), &["config", "set", "timer.custom_work_minutes", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("timer.custom_work_minutes"), "{stderr}");
    assert_eq!(run_ok(tmp.path(), &["config", "get", "timer.custom_work_minutes"]).trim(), "25");

    run_ok(tmp.path(), &["config", "set", "timer.custom_work_minutes", "45"]);
    let out = run_ok(tmp.path(), &["timer", "modes"]);
    assert!(out.contains(" 45/5"), "{out}");
}

#[test]
fn test_sqlite_backend_persists_sessions() {
    let tmp = TempDir::new().unwrap();
    run_ok(tmp.path(), &["config", "set", "storage.backend", "sqlite"]);
    run_ok(tmp.path(), &["sessions", "log", "--mode", "Custom", "--minutes", "15"]);
    assert!(tmp.path().join("focusflow.db").exists());
    assert!(!tmp.path().join("sessions.json").exists());

    let out = run_ok(tmp.path(), &["sessions", "list", "--json"]);
    let sessions: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(sessions[0]["mode_name"], "Custom");
}

#[test]
fn test_planner_conflicts_and_ics_round_trip() {
    let tmp = TempDir::new().unwrap();
    run_ok(
        tmp.path(),
        &["planner", "add", "Lecture", "--start", "2026-05-04 09:00", "--end", "2026-05-04 10:30"],
    );
    let (_, stderr, code) = run_cli(
        tmp.path(),
        &["planner", "add", "Lab", "--start", "2026-05-04 10:00", "--end", "2026-05-04 11:00"],
    );
    assert_eq!(code, 1, "overlap should be rejected: {stderr}");

    // Touching boundaries do not overlap.
    run_ok(
        tmp.path(),
        &["planner", "add", "Review", "--start", "2026-05-04 10:30", "--end", "2026-05-04 11:00", "--study-mode", "pomodoro"],
    );

    let ics_path = tmp.path().join("plan.ics");
    run_ok(tmp.path(), &["planner", "export", ics_path.to_str().unwrap()]);
    let ics = std::fs::read_to_string(&ics_path).unwrap();
    assert!(ics.contains("SUMMARY:Lecture"));
    assert!(ics.contains("DTSTART:20260504T103000"));

    // Re-importing the same events only produces conflicts.
    let out = run_ok(tmp.path(), &["planner", "import", ics_path.to_str().unwrap()]);
    assert!(out.contains("Imported 0 event(s), skipped 2"), "{out}");

    let out = run_ok(tmp.path(), &["planner", "list", "--date", "2026-05-04", "--json"]);
    let events: serde_json::Value = serde_json::from_str(&out).unwrap();
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1]["timer_mode"], "Pomodoro");

    let id = events[0]["id"].as_str().unwrap();
    run_ok(tmp.path(), &["planner", "remove", id]);
    let (_, _, code) = run_cli(tmp.path(), &["planner", "remove", id]);
    assert_eq!(code, 1);
}
