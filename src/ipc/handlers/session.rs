use crate::error::ExamError;
use crate::ipc::error::respond;
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_session_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond(&req.id, Ok(json!({ "session": state.session })))
}

fn session_login(state: &mut AppState, req: &Request) -> Result<serde_json::Value, ExamError> {
    let name = required_str(&req.params, "name")?;
    let date = required_str(&req.params, "date")?;
    state.session.login(&mut state.storage, name, date)?;
    tracing::info!(examiner = %state.session.examiner_name, date = %state.session.exam_date, "examiner logged in");
    Ok(json!({ "session": state.session }))
}

fn session_logout(state: &mut AppState) -> Result<serde_json::Value, ExamError> {
    state.session.logout(&mut state.storage)?;
    tracing::info!("examiner logged out");
    Ok(json!({ "session": state.session }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "session.get" => Some(handle_session_get(state, req)),
        "session.login" => Some(respond(&req.id, session_login(state, req))),
        "session.logout" => Some(respond(&req.id, session_logout(state))),
        _ => None,
    }
}
