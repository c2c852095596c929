use crate::db::SqliteStore;
use crate::error::ExamError;
use crate::ipc::error::respond;
use crate::ipc::helpers::required_path;
use crate::ipc::types::{AppState, Request};
use crate::session;
use crate::storage::Storage;
use serde_json::json;
use std::path::Path;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond(
        &req.id,
        Ok(json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "storage": state.storage.backend_name(),
            "rosterSource": state.roster_source.as_str(),
        })),
    )
}

/// Opens (or creates) a workspace and reloads session and roster from it.
pub fn open_workspace(state: &mut AppState, path: &Path) -> Result<(), ExamError> {
    let store = SqliteStore::open(path)?;
    state.reload_from(
        Some(path.to_path_buf()),
        Storage::new(store),
        session::today(),
    );
    tracing::info!(
        workspace = %path.to_string_lossy(),
        students = state.students.len(),
        roster = state.roster_source.as_str(),
        logged_in = state.session.logged_in,
        "workspace opened"
    );
    Ok(())
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let result = required_path(&req.params, "path").and_then(|path| {
        open_workspace(state, &path)?;
        Ok(json!({
            "workspacePath": path.to_string_lossy(),
            "rosterSource": state.roster_source.as_str(),
            "session": state.session,
        }))
    });
    respond(&req.id, result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
