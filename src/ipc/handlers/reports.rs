use crate::error::ExamError;
use crate::ipc::error::respond;
use crate::ipc::helpers::{optional_group, required_path};
use crate::ipc::types::{AppState, Request};
use crate::reports;
use serde_json::json;

fn reports_recap(state: &AppState, req: &Request) -> Result<serde_json::Value, ExamError> {
    let group = optional_group(&req.params)?;
    let model = reports::recap_model(&state.session, &state.students, group);
    Ok(json!(model))
}

fn reports_export_csv(state: &AppState, req: &Request) -> Result<serde_json::Value, ExamError> {
    let out_path = required_path(&req.params, "outPath")?;
    let group = optional_group(&req.params)?;
    let model = reports::recap_model(&state.session, &state.students, group);
    let rows_exported = reports::write_recap_csv(&model, &out_path)?;
    tracing::info!(path = %out_path.to_string_lossy(), rows = rows_exported, "recap exported");
    Ok(json!({
        "outPath": out_path.to_string_lossy(),
        "rowsExported": rows_exported,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.recap" => Some(respond(&req.id, reports_recap(state, req))),
        "reports.exportCsv" => Some(respond(&req.id, reports_export_csv(state, req))),
        _ => None,
    }
}
