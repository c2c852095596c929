use crate::backup;
use crate::error::ExamError;
use crate::ipc::error::respond;
use crate::ipc::helpers::required_path;
use crate::ipc::types::{AppState, Request};
use crate::seed;
use crate::storage::{parse_roster, serialize_roster, RosterSource};
use serde_json::json;

fn backup_export(state: &AppState, req: &Request) -> Result<serde_json::Value, ExamError> {
    let out_path = required_path(&req.params, "outPath")?;
    let payload = serialize_roster(&state.students)?;
    let summary = backup::export_roster_bundle(&payload, &out_path)?;
    tracing::info!(path = %out_path.to_string_lossy(), bundle_id = %summary.bundle_id, "roster bundle exported");
    Ok(json!({
        "outPath": out_path.to_string_lossy(),
        "bundleFormat": summary.bundle_format,
        "bundleId": summary.bundle_id,
        "entryCount": summary.entry_count,
        "sha256": summary.sha256,
        "studentCount": state.students.len(),
    }))
}

/// Restored data must parse; the silent seed fallback is only for startup.
fn backup_import(state: &mut AppState, req: &Request) -> Result<serde_json::Value, ExamError> {
    let in_path = required_path(&req.params, "inPath")?;
    let imported = backup::read_roster_bundle(&in_path)
        .map_err(|e| ExamError::bad_params(format!("{e:#}")))?;
    let students = parse_roster(&imported.payload).map_err(|e| {
        ExamError::bad_params_with(
            format!("{e:#}"),
            json!({ "bundleFormat": imported.bundle_format_detected }),
        )
    })?;

    let previous = std::mem::replace(&mut state.students, students);
    if let Err(e) = state.persist_students() {
        state.students = previous;
        return Err(e);
    }
    state.roster_source = RosterSource::Stored;
    tracing::info!(
        path = %in_path.to_string_lossy(),
        format = %imported.bundle_format_detected,
        students = state.students.len(),
        "roster restored"
    );
    Ok(json!({
        "bundleFormatDetected": imported.bundle_format_detected,
        "studentCount": state.students.len(),
    }))
}

fn backup_reset_roster(state: &mut AppState) -> Result<serde_json::Value, ExamError> {
    let previous = std::mem::replace(&mut state.students, seed::initial_students());
    if let Err(e) = state.persist_students() {
        state.students = previous;
        return Err(e);
    }
    state.roster_source = RosterSource::Seed;
    tracing::warn!("roster reset to seed data");
    Ok(json!({ "studentCount": state.students.len() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.export" => Some(respond(&req.id, backup_export(state, req))),
        "backup.import" => Some(respond(&req.id, backup_import(state, req))),
        "backup.resetRoster" => Some(respond(&req.id, backup_reset_roster(state))),
        _ => None,
    }
}
