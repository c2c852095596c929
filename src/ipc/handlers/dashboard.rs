use crate::calc;
use crate::ipc::error::respond;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.summary" => {
            let summary = calc::dashboard_summary(&state.students);
            Some(respond(&req.id, Ok(json!(summary))))
        }
        _ => None,
    }
}
