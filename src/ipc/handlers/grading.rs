use crate::error::ExamError;
use crate::ipc::error::respond;
use crate::ipc::helpers::student_id;
use crate::ipc::types::{AppState, Request};
use crate::model::{Subject, MAX_SCORE};
use serde_json::json;

/// Validates every entry before anything is applied.
fn parse_score_edits(params: &serde_json::Value) -> Result<Vec<(Subject, f64)>, ExamError> {
    let Some(obj) = params.get("scores").and_then(|v| v.as_object()) else {
        return Err(ExamError::bad_params("missing scores object"));
    };
    let mut edits = Vec::with_capacity(obj.len());
    for (key, value) in obj {
        let Some(subject) = Subject::parse(key) else {
            return Err(ExamError::bad_params_with(
                "unknown subject",
                json!({ "subject": key }),
            ));
        };
        let Some(v) = value.as_f64() else {
            return Err(ExamError::bad_params_with(
                "score must be a number",
                json!({ "subject": key, "value": value }),
            ));
        };
        if !(0.0..=MAX_SCORE).contains(&v) {
            return Err(ExamError::bad_params_with(
                format!("score must be in 0..={}", MAX_SCORE),
                json!({ "subject": key, "value": v }),
            ));
        }
        edits.push((subject, v));
    }
    Ok(edits)
}

fn grading_save(state: &mut AppState, req: &Request) -> Result<serde_json::Value, ExamError> {
    let examiner = state.session.require_examiner()?.to_string();
    let id = student_id(&req.params)?;
    let edits = parse_score_edits(&req.params)?;

    let student = state.student_mut(&id)?;
    let previous = student.clone();
    for (subject, v) in &edits {
        student.scores.set(*subject, *v);
    }
    student.examiner = Some(examiner.clone());
    let updated = student.clone();

    if let Err(e) = state.persist_students() {
        *state.student_mut(&id)? = previous;
        return Err(e);
    }
    tracing::info!(student_id = %id, examiner = %examiner, subjects = edits.len(), "scores saved");
    Ok(json!({
        "student": updated,
        "graded": updated.is_graded(),
        "total": updated.scores.total(),
    }))
}

fn grading_reset(state: &mut AppState, req: &Request) -> Result<serde_json::Value, ExamError> {
    state.session.require_examiner()?;
    let id = student_id(&req.params)?;

    let student = state.student_mut(&id)?;
    let previous = student.clone();
    student.scores.clear();
    student.examiner = None;
    let updated = student.clone();

    if let Err(e) = state.persist_students() {
        *state.student_mut(&id)? = previous;
        return Err(e);
    }
    tracing::info!(student_id = %id, "scores reset");
    Ok(json!({ "student": updated }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grading.save" => Some(respond(&req.id, grading_save(state, req))),
        "grading.reset" => Some(respond(&req.id, grading_reset(state, req))),
        _ => None,
    }
}
