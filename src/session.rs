use crate::error::ExamError;
use crate::storage::Storage;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Default exam date. UTC, like the web app's `toISOString()` default.
pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub examiner_name: String,
    pub exam_date: String,
    pub logged_in: bool,
}

impl Session {
    /// Restores the last examiner if one was persisted. Read failures count as
    /// "no prior session".
    pub fn bootstrap(storage: &Storage, today: NaiveDate) -> Self {
        let name = match storage.load_examiner_name() {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "examiner name unreadable, starting logged out");
                None
            }
        };

        match name {
            Some(examiner_name) => {
                let exam_date = storage.load_exam_date().ok().flatten().unwrap_or_default();
                Self {
                    examiner_name,
                    exam_date,
                    logged_in: true,
                }
            }
            None => Self {
                examiner_name: String::new(),
                exam_date: today.format(DATE_FORMAT).to_string(),
                logged_in: false,
            },
        }
    }

    pub fn login(&mut self, storage: &mut Storage, name: &str, date: &str) -> Result<(), ExamError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ExamError::bad_params("examiner name must not be empty"));
        }
        let date = date.trim();
        if NaiveDate::parse_from_str(date, DATE_FORMAT).is_err() {
            return Err(ExamError::bad_params_with(
                "exam date must be YYYY-MM-DD",
                json!({ "date": date }),
            ));
        }

        storage.save_examiner_name(name)?;
        storage.save_exam_date(date)?;

        self.examiner_name = name.to_string();
        self.exam_date = date.to_string();
        self.logged_in = true;
        Ok(())
    }

    /// Only the examiner name is removed from storage; the exam date stays so
    /// the next login form can start from it.
    pub fn logout(&mut self, storage: &mut Storage) -> Result<(), ExamError> {
        storage.remove_examiner_name()?;
        self.logged_in = false;
        self.examiner_name.clear();
        Ok(())
    }

    pub fn require_examiner(&self) -> Result<&str, ExamError> {
        if self.logged_in && !self.examiner_name.is_empty() {
            Ok(&self.examiner_name)
        } else {
            Err(ExamError::NotLoggedIn)
        }
    }
}
