use crate::error::ExamError;
use crate::ipc::error::respond;
use crate::ipc::helpers::{optional_str, parse_group, required_str, student_id};
use crate::ipc::types::{AppState, Request};
use crate::model::{next_student_id, Student};
use serde_json::json;

const NAME_MAX_CHARS: usize = 120;

fn clean_name(raw: &str) -> Result<String, ExamError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ExamError::bad_params("name must not be empty"));
    }
    if name.chars().count() > NAME_MAX_CHARS {
        return Err(ExamError::bad_params_with(
            format!("name length must be <= {}", NAME_MAX_CHARS),
            json!({ "length": name.chars().count() }),
        ));
    }
    Ok(name.to_string())
}

fn students_list(state: &AppState) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = state
        .students
        .iter()
        .map(|s| {
            json!({
                "student": s,
                "graded": s.is_graded(),
                "total": s.scores.total(),
            })
        })
        .collect();
    json!({ "students": rows })
}

fn students_create(state: &mut AppState, req: &Request) -> Result<serde_json::Value, ExamError> {
    let name = clean_name(required_str(&req.params, "name")?)?;
    let group = parse_group(required_str(&req.params, "group")?)?;

    let Some(id) = next_student_id(&state.students) else {
        return Err(ExamError::bad_params_with(
            "no free numeric student id left",
            json!({ "students": state.students.len() }),
        ));
    };
    state.students.push(Student::new(id, name, group));
    if let Err(e) = state.persist_students() {
        state.students.pop();
        return Err(e);
    }
    tracing::info!(student_id = id, group = group.as_str(), "student created");
    Ok(json!({ "studentId": id }))
}

fn students_update(state: &mut AppState, req: &Request) -> Result<serde_json::Value, ExamError> {
    let id = student_id(&req.params)?;
    let name = optional_str(&req.params, "name")?.map(clean_name).transpose()?;
    let group = optional_str(&req.params, "group")?
        .map(parse_group)
        .transpose()?;

    let student = state.student_mut(&id)?;
    let previous = student.clone();
    if let Some(n) = name {
        student.name = n;
    }
    if let Some(g) = group {
        student.group = Some(g);
    }
    let updated = student.clone();

    if let Err(e) = state.persist_students() {
        *state.student_mut(&id)? = previous;
        return Err(e);
    }
    Ok(json!({ "student": updated }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(respond(&req.id, Ok(students_list(state)))),
        "students.create" => Some(respond(&req.id, students_create(state, req))),
        "students.update" => Some(respond(&req.id, students_update(state, req))),
        _ => None,
    }
}
