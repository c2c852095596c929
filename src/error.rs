use crate::model::StudentId;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExamError {
    #[error("{message}")]
    BadParams {
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("student not found")]
    StudentNotFound(StudentId),

    #[error("log in as an examiner first")]
    NotLoggedIn,

    #[error("{0:#}")]
    Store(#[from] anyhow::Error),
}

impl ExamError {
    pub fn bad_params(message: impl Into<String>) -> Self {
        Self::BadParams {
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_params_with(message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::BadParams {
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::BadParams { .. } => "bad_params",
            Self::StudentNotFound(_) => "not_found",
            Self::NotLoggedIn => "not_logged_in",
            Self::Store(_) => "store_failed",
        }
    }

    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::BadParams { details, .. } => details.clone(),
            Self::StudentNotFound(id) => Some(json!({ "studentId": id })),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ExamError::bad_params("x").code(), "bad_params");
        assert_eq!(ExamError::StudentNotFound(StudentId::from(4)).code(), "not_found");
        assert_eq!(ExamError::NotLoggedIn.code(), "not_logged_in");
        let e: ExamError = anyhow::anyhow!("disk full").into();
        assert_eq!(e.code(), "store_failed");
        assert_eq!(e.to_string(), "disk full");
    }
}
