use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::ExamError;
use crate::model::{Student, StudentId};
use crate::routing::{HashRouter, Navigator};
use crate::session::Session;
use crate::storage::{RosterSource, Storage};

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Everything the front end can observe. Handlers get it by `&mut` and are
/// the only place it changes.
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub storage: Storage,
    pub session: Session,
    pub students: Vec<Student>,
    pub roster_source: RosterSource,
    pub router: HashRouter,
    pub navigator: Navigator,
}

impl AppState {
    pub fn new(storage: Storage, initial_fragment: &str, today: NaiveDate) -> Self {
        let navigator = Navigator::new(initial_fragment);
        let router = HashRouter::attach(&navigator);
        let session = Session::bootstrap(&storage, today);
        let (students, roster_source) = storage.load_students();
        let mut state = Self {
            workspace: None,
            storage,
            session,
            students,
            roster_source,
            router,
            navigator,
        };
        state.write_back_loaded_roster();
        state
    }

    /// Swaps the backing store and reloads session and roster from it. The
    /// current route is untouched.
    pub fn reload_from(&mut self, workspace: Option<PathBuf>, storage: Storage, today: NaiveDate) {
        self.workspace = workspace;
        self.storage = storage;
        self.session = Session::bootstrap(&self.storage, today);
        let (students, source) = self.storage.load_students();
        self.students = students;
        self.roster_source = source;
        self.write_back_loaded_roster();
    }

    /// The roster is written back as soon as it is loaded, seed included,
    /// unless that would overwrite stored JSON the roster type cannot hold.
    fn write_back_loaded_roster(&mut self) {
        if self.roster_source == RosterSource::SeedOverUnsupportedPayload {
            return;
        }
        if let Err(e) = self.persist_students() {
            tracing::warn!(error = %e, "initial roster save failed");
        }
    }

    pub fn persist_students(&mut self) -> Result<(), ExamError> {
        self.storage.save_students(&self.students)?;
        Ok(())
    }

    pub fn student_mut(&mut self, id: &StudentId) -> Result<&mut Student, ExamError> {
        self.students
            .iter_mut()
            .find(|s| s.id.as_ref() == Some(id))
            .ok_or_else(|| ExamError::StudentNotFound(id.clone()))
    }
}
