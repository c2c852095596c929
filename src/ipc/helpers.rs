use crate::error::ExamError;
use crate::model::{Group, StudentId};
use serde_json::{json, Value};
use std::path::PathBuf;

pub fn required_str<'a>(params: &'a Value, key: &str) -> Result<&'a str, ExamError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ExamError::bad_params(format!("missing {}", key)))
}

pub fn optional_str<'a>(params: &'a Value, key: &str) -> Result<Option<&'a str>, ExamError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(ExamError::bad_params_with(
            format!("{} must be string", key),
            json!({ key: other }),
        )),
    }
}

pub fn required_path(params: &Value, key: &str) -> Result<PathBuf, ExamError> {
    let raw = required_str(params, key)?;
    if raw.trim().is_empty() {
        return Err(ExamError::bad_params(format!("{} must not be empty", key)));
    }
    Ok(PathBuf::from(raw))
}

/// Ids match the stored form: a number finds a numeric id, a string a text id.
pub fn student_id(params: &Value) -> Result<StudentId, ExamError> {
    match params.get("studentId") {
        None | Some(Value::Null) => Err(ExamError::bad_params("missing studentId")),
        Some(Value::Number(n)) => Ok(StudentId::Number(n.clone())),
        Some(Value::String(s)) if !s.is_empty() => Ok(StudentId::Text(s.clone())),
        Some(other) => Err(ExamError::bad_params_with(
            "studentId must be a number or a non-empty string",
            json!({ "studentId": other }),
        )),
    }
}

pub fn parse_group(raw: &str) -> Result<Group, ExamError> {
    Group::parse(raw).ok_or_else(|| {
        ExamError::bad_params_with("group must be one of: A, B, C", json!({ "group": raw }))
    })
}

pub fn optional_group(params: &Value) -> Result<Option<Group>, ExamError> {
    match optional_str(params, "group")? {
        None => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("ALL") => Ok(None),
        Some(s) => parse_group(s).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_id_keeps_stored_form() {
        assert_eq!(
            student_id(&json!({ "studentId": 4 })).expect("id"),
            StudentId::from(4)
        );
        assert_eq!(
            student_id(&json!({ "studentId": "s4" })).expect("id"),
            StudentId::Text("s4".into())
        );
        assert!(student_id(&json!({ "studentId": "" })).is_err());
        assert!(student_id(&json!({ "studentId": true })).is_err());
        assert!(student_id(&json!({})).is_err());
    }

    #[test]
    fn group_filter_accepts_all() {
        assert_eq!(optional_group(&json!({ "group": "ALL" })).expect("group"), None);
        assert_eq!(optional_group(&json!({})).expect("group"), None);
        assert_eq!(
            optional_group(&json!({ "group": "c" })).expect("group"),
            Some(Group::C)
        );
        assert!(optional_group(&json!({ "group": "Z" })).is_err());
        assert!(optional_group(&json!({ "group": 1 })).is_err());
    }
}
