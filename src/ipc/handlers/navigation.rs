use crate::error::ExamError;
use crate::ipc::error::respond;
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use crate::routing::{header_title, is_active, MENU};
use serde_json::json;

fn route_snapshot(state: &AppState) -> serde_json::Value {
    let route = state.router.route();
    json!({
        "fragment": state.navigator.fragment(),
        "route": route,
        "view": state.router.view(),
        "title": header_title(&route),
    })
}

fn route_navigate(state: &mut AppState, req: &Request) -> Result<serde_json::Value, ExamError> {
    let fragment = required_str(&req.params, "fragment")?;
    state.navigator.set_fragment(fragment);
    tracing::debug!(fragment, route = %state.router.route(), "navigated");
    Ok(route_snapshot(state))
}

fn route_menu(state: &AppState) -> serde_json::Value {
    let route = state.router.route();
    let items: Vec<serde_json::Value> = MENU
        .iter()
        .map(|item| {
            json!({
                "path": item.path,
                "label": item.label,
                "href": format!("#{}", item.path),
                "active": is_active(&route, item.path),
            })
        })
        .collect();
    json!({
        "items": items,
        "examinerName": state.session.examiner_name,
    })
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "route.get" => Some(respond(&req.id, Ok(route_snapshot(state)))),
        "route.navigate" => Some(respond(&req.id, route_navigate(state, req))),
        "route.menu" => Some(respond(&req.id, Ok(route_menu(state)))),
        _ => None,
    }
}
