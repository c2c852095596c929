use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar(args: &[&str]) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_lisand");
    let mut child = Command::new(exe)
        .args(args)
        .env_remove("LISAND_WORKSPACE")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn lisand");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(true),
        "{} failed: {}",
        method,
        value
    );
    value["result"].clone()
}

fn select_workspace(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    path: &Path,
) -> serde_json::Value {
    request_ok(
        stdin,
        reader,
        "ws",
        "workspace.select",
        json!({ "path": path.to_string_lossy() }),
    )
}

#[test]
fn session_survives_restart_and_logout_keeps_date() {
    let workspace = tempfile::tempdir().expect("temp dir");

    let (mut child, mut stdin, mut reader) = spawn_sidecar(&[]);
    let selected = select_workspace(&mut stdin, &mut reader, workspace.path());
    assert_eq!(selected["rosterSource"], json!("seed"));
    assert_eq!(selected["session"]["loggedIn"], json!(false));
    assert_eq!(selected["session"]["examinerName"], json!(""));

    let login = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "session.login",
        json!({ "name": "  Ahmad  ", "date": "2025-05-01" }),
    );
    assert_eq!(login["session"]["examinerName"], json!("Ahmad"));
    assert_eq!(login["session"]["loggedIn"], json!(true));
    drop(stdin);
    let _ = child.wait();

    // A fresh process picks the session back up from the workspace.
    let ws = workspace.path().to_string_lossy().to_string();
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&["--workspace", &ws]);
    let session = request_ok(&mut stdin, &mut reader, "2", "session.get", json!({}));
    assert_eq!(session["session"]["examinerName"], json!("Ahmad"));
    assert_eq!(session["session"]["examDate"], json!("2025-05-01"));
    assert_eq!(session["session"]["loggedIn"], json!(true));

    let out = request_ok(&mut stdin, &mut reader, "3", "session.logout", json!({}));
    assert_eq!(out["session"]["loggedIn"], json!(false));
    drop(stdin);
    let _ = child.wait();

    let (mut child, mut stdin, mut reader) = spawn_sidecar(&["--workspace", &ws]);
    let session = request_ok(&mut stdin, &mut reader, "4", "session.get", json!({}));
    assert_eq!(session["session"]["loggedIn"], json!(false));
    assert_eq!(session["session"]["examinerName"], json!(""));
    drop(stdin);
    let _ = child.wait();
}

#[test]
fn grading_flows_into_dashboard_reports_and_backup() {
    let workspace = tempfile::tempdir().expect("temp dir");
    let bundle = workspace.path().join("exports").join("roster.zip");
    let csv_out = workspace.path().join("exports").join("rekap.csv");

    let (mut child, mut stdin, mut reader) = spawn_sidecar(&["--fragment", "#/grading"]);
    select_workspace(&mut stdin, &mut reader, workspace.path());

    let route = request_ok(&mut stdin, &mut reader, "1", "route.get", json!({}));
    assert_eq!(route["view"], json!("Grading"));

    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "session.login",
        json!({ "name": "Ustadz Hasan", "date": "2025-05-01" }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "grading.save",
        json!({ "studentId": 1, "scores": { "nahwu": 80, "shorof": 75 } }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "grading.save",
        json!({ "studentId": 2, "scores": { "nahwu": 60 } }),
    );

    let summary = request_ok(&mut stdin, &mut reader, "5", "dashboard.summary", json!({}));
    assert_eq!(summary["totalStudents"], json!(15));
    assert_eq!(summary["gradedStudents"], json!(2));
    assert_eq!(summary["pendingStudents"], json!(13));
    assert_eq!(summary["subjectAverages"][2]["subject"], json!("nahwu"));
    assert_eq!(summary["subjectAverages"][2]["avg"], json!(70));
    assert_eq!(summary["groups"][0]["graded"], json!(2));
    assert_eq!(summary["groups"][0]["percent"], json!(40));

    let recap = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "reports.recap",
        json!({ "group": "A" }),
    );
    assert_eq!(recap["rows"].as_array().map(|r| r.len()), Some(5));
    assert_eq!(recap["rows"][0]["total"], json!(155.0));
    assert_eq!(recap["examinerName"], json!("Ustadz Hasan"));

    let exported = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "reports.exportCsv",
        json!({ "outPath": csv_out.to_string_lossy() }),
    );
    assert_eq!(exported["rowsExported"], json!(15));
    assert!(csv_out.is_file());

    let backup = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "backup.export",
        json!({ "outPath": bundle.to_string_lossy() }),
    );
    assert_eq!(backup["bundleFormat"], json!("lisan-roster-v1"));

    request_ok(&mut stdin, &mut reader, "9", "backup.resetRoster", json!({}));
    let reset = request_ok(&mut stdin, &mut reader, "10", "dashboard.summary", json!({}));
    assert_eq!(reset["gradedStudents"], json!(0));

    let restored = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "backup.import",
        json!({ "inPath": bundle.to_string_lossy() }),
    );
    assert_eq!(restored["studentCount"], json!(15));
    let after = request_ok(&mut stdin, &mut reader, "12", "dashboard.summary", json!({}));
    assert_eq!(after["gradedStudents"], json!(2));

    let not_json = workspace.path().join("broken.json");
    std::fs::write(&not_json, "{ nope").expect("write broken backup");
    let failed = request(
        &mut stdin,
        &mut reader,
        "13",
        "backup.import",
        json!({ "inPath": not_json.to_string_lossy() }),
    );
    assert_eq!(failed["ok"], json!(false));
    assert_eq!(failed["error"]["code"], json!("bad_params"));

    let unknown = request(&mut stdin, &mut reader, "14", "questions.list", json!({}));
    assert_eq!(unknown["error"]["code"], json!("not_implemented"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn malformed_stored_roster_falls_back_to_seed() {
    let workspace = tempfile::tempdir().expect("temp dir");
    {
        let conn = rusqlite::Connection::open(workspace.path().join("lisan.sqlite3"))
            .expect("open sqlite");
        conn.execute(
            "CREATE TABLE kv_store(key TEXT PRIMARY KEY, value TEXT NOT NULL, updated_at TEXT)",
            [],
        )
        .expect("create table");
        conn.execute(
            "INSERT INTO kv_store(key, value) VALUES('alghozali_students_5c_updated', '[{broken')",
            [],
        )
        .expect("insert broken roster");
    }

    let (mut child, mut stdin, mut reader) = spawn_sidecar(&[]);
    let selected = select_workspace(&mut stdin, &mut reader, workspace.path());
    assert_eq!(selected["rosterSource"], json!("seed_after_bad_payload"));
    let list = request_ok(&mut stdin, &mut reader, "1", "students.list", json!({}));
    assert_eq!(list["students"].as_array().map(|s| s.len()), Some(15));
    drop(stdin);
    let _ = child.wait();

    // The seed roster was written back over the broken payload.
    let conn = rusqlite::Connection::open(workspace.path().join("lisan.sqlite3"))
        .expect("reopen sqlite");
    let stored: String = conn
        .query_row(
            "SELECT value FROM kv_store WHERE key = 'alghozali_students_5c_updated'",
            [],
            |r| r.get(0),
        )
        .expect("read roster");
    let parsed: serde_json::Value = serde_json::from_str(&stored).expect("valid roster json");
    assert_eq!(parsed.as_array().map(|a| a.len()), Some(15));
}

#[test]
fn bad_json_line_gets_error_without_id() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&[]);
    writeln!(stdin, "{{not json").expect("write garbage");
    stdin.flush().expect("flush");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response");
    assert_eq!(value["ok"], json!(false));
    assert_eq!(value["error"]["code"], json!("bad_json"));

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(health["storage"], json!("memory"));
    drop(stdin);
    let _ = child.wait();
}
