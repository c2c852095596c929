use crate::model::Student;
use crate::seed;
use anyhow::Context;
use std::collections::HashMap;

pub const STUDENTS_KEY: &str = "alghozali_students_5c_updated";
pub const EXAMINER_NAME_KEY: &str = "examinerName";
pub const EXAM_DATE_KEY: &str = "examDate";

/// String key/value persistence, shaped like browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&mut self, key: &str) -> anyhow::Result<()>;
    fn backend_name(&self) -> &'static str;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterSource {
    Stored,
    Seed,
    /// The stored value was not JSON; the seed replaces it.
    SeedAfterBadPayload,
    /// The stored value is JSON but not a list of students. The seed is used
    /// in memory and the stored value stays until the roster is next saved.
    SeedOverUnsupportedPayload,
}

impl RosterSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stored => "stored",
            Self::Seed => "seed",
            Self::SeedAfterBadPayload => "seed_after_bad_payload",
            Self::SeedOverUnsupportedPayload => "seed_over_unsupported_payload",
        }
    }
}

/// Typed access to the three persisted keys. Callers never touch raw keys.
pub struct Storage {
    backend: Box<dyn KeyValueStore>,
}

impl Storage {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    /// Never fails: an absent, unreadable or malformed roster yields the seed list.
    /// Any JSON array of objects is a roster, however loosely its entries are
    /// shaped.
    pub fn load_students(&self) -> (Vec<Student>, RosterSource) {
        let raw = match self.backend.get(STUDENTS_KEY) {
            Ok(Some(v)) => v,
            Ok(None) => return (seed::initial_students(), RosterSource::Seed),
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "roster read failed, using seed roster");
                return (seed::initial_students(), RosterSource::Seed);
            }
        };
        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "stored roster is malformed, using seed roster");
                return (seed::initial_students(), RosterSource::SeedAfterBadPayload);
            }
        };
        match students_from_value(value) {
            Ok(students) => (students, RosterSource::Stored),
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "stored roster has an unsupported shape, using seed roster");
                (seed::initial_students(), RosterSource::SeedOverUnsupportedPayload)
            }
        }
    }

    pub fn save_students(&mut self, students: &[Student]) -> anyhow::Result<()> {
        let payload = serialize_roster(students)?;
        self.backend
            .set(STUDENTS_KEY, &payload)
            .context("failed to persist roster")
    }

    /// Empty strings count as absent.
    pub fn load_examiner_name(&self) -> anyhow::Result<Option<String>> {
        Ok(self
            .backend
            .get(EXAMINER_NAME_KEY)?
            .filter(|v| !v.is_empty()))
    }

    pub fn save_examiner_name(&mut self, name: &str) -> anyhow::Result<()> {
        self.backend
            .set(EXAMINER_NAME_KEY, name)
            .context("failed to persist examiner name")
    }

    pub fn remove_examiner_name(&mut self) -> anyhow::Result<()> {
        self.backend
            .remove(EXAMINER_NAME_KEY)
            .context("failed to remove examiner name")
    }

    pub fn load_exam_date(&self) -> anyhow::Result<Option<String>> {
        Ok(self.backend.get(EXAM_DATE_KEY)?.filter(|v| !v.is_empty()))
    }

    pub fn save_exam_date(&mut self, date: &str) -> anyhow::Result<()> {
        self.backend
            .set(EXAM_DATE_KEY, date)
            .context("failed to persist exam date")
    }

    #[cfg(test)]
    pub fn raw_students(&self) -> anyhow::Result<Option<String>> {
        self.backend.get(STUDENTS_KEY)
    }
}

pub fn parse_roster(raw: &str) -> anyhow::Result<Vec<Student>> {
    let value: serde_json::Value =
        serde_json::from_str(raw).context("roster payload is not valid JSON")?;
    students_from_value(value)
}

fn students_from_value(value: serde_json::Value) -> anyhow::Result<Vec<Student>> {
    serde_json::from_value(value).context("roster payload is not an array of student objects")
}

pub fn serialize_roster(students: &[Student]) -> anyhow::Result<String> {
    serde_json::to_string(students).context("failed to serialize roster")
}
