use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::fmt;

pub const MAX_SCORE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Muhadatsah,
    Mutholaah,
    Nahwu,
    Shorof,
    Tarjamah,
}

pub const SUBJECTS: [Subject; 5] = [
    Subject::Muhadatsah,
    Subject::Mutholaah,
    Subject::Nahwu,
    Subject::Shorof,
    Subject::Tarjamah,
];

impl Subject {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "muhadatsah" => Some(Self::Muhadatsah),
            "mutholaah" => Some(Self::Mutholaah),
            "nahwu" => Some(Self::Nahwu),
            "shorof" => Some(Self::Shorof),
            "tarjamah" => Some(Self::Tarjamah),
            _ => None,
        }
    }

    /// Key used in the persisted `scores` object.
    pub fn key(self) -> &'static str {
        match self {
            Self::Muhadatsah => "muhadatsah",
            Self::Mutholaah => "mutholaah",
            Self::Nahwu => "nahwu",
            Self::Shorof => "shorof",
            Self::Tarjamah => "tarjamah",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Muhadatsah => "Muhadatsah",
            Self::Mutholaah => "Mutholaah",
            Self::Nahwu => "Nahwu",
            Self::Shorof => "Shorof",
            Self::Tarjamah => "Tarjamah",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Group {
    A,
    B,
    C,
}

pub const GROUPS: [Group; 3] = [Group::A, Group::B, Group::C];

impl Group {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        }
    }
}

/// A single subject score. Whole numbers serialize as JSON integers so a
/// roster written by the web front end survives a load/save cycle unchanged.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Score(pub f64);

impl Score {
    fn is_whole(self) -> bool {
        self.0.fract() == 0.0 && self.0.abs() < 1e15
    }

    /// Numbers and numeric strings count; null, missing and anything else
    /// read as "not graded yet".
    pub fn read(value: Option<&Value>) -> Self {
        let v = match value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        Score(v.filter(|x| x.is_finite()).unwrap_or(0.0))
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_whole() {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_whole() {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

fn score_value(score: Score) -> Value {
    serde_json::to_value(score).unwrap_or(Value::Null)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scores {
    pub muhadatsah: Score,
    pub mutholaah: Score,
    pub nahwu: Score,
    pub shorof: Score,
    pub tarjamah: Score,
}

impl Scores {
    /// Reads a stored `scores` value. Anything that is not an object is an
    /// ungraded sheet.
    pub fn read(value: Option<&Value>) -> Self {
        let mut scores = Scores::default();
        if let Some(Value::Object(obj)) = value {
            for subject in SUBJECTS {
                scores.set(subject, Score::read(obj.get(subject.key())).0);
            }
        }
        scores
    }

    pub fn get(&self, subject: Subject) -> f64 {
        match subject {
            Subject::Muhadatsah => self.muhadatsah.0,
            Subject::Mutholaah => self.mutholaah.0,
            Subject::Nahwu => self.nahwu.0,
            Subject::Shorof => self.shorof.0,
            Subject::Tarjamah => self.tarjamah.0,
        }
    }

    pub fn set(&mut self, subject: Subject, value: f64) {
        let slot = match subject {
            Subject::Muhadatsah => &mut self.muhadatsah,
            Subject::Mutholaah => &mut self.mutholaah,
            Subject::Nahwu => &mut self.nahwu,
            Subject::Shorof => &mut self.shorof,
            Subject::Tarjamah => &mut self.tarjamah,
        };
        *slot = Score(value);
    }

    /// Sum over the five subjects. Other keys in a stored sheet are not scores.
    pub fn total(&self) -> f64 {
        SUBJECTS.iter().map(|s| self.get(*s)).sum()
    }

    pub fn clear(&mut self) {
        for s in SUBJECTS {
            self.set(s, 0.0);
        }
    }
}

/// Student identifier as stored. The front end writes numbers, hand-edited
/// or imported rosters may carry strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StudentId {
    Number(Number),
    Text(String),
}

impl StudentId {
    fn read(value: Option<&Value>) -> Option<Self> {
        match value {
            Some(Value::Number(n)) => Some(Self::Number(n.clone())),
            Some(Value::String(s)) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) => n.as_u64(),
            Self::Text(_) => None,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Number(n) => Value::Number(n.clone()),
            Self::Text(s) => Value::String(s.clone()),
        }
    }
}

impl From<u64> for StudentId {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

fn read_name(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn read_group(value: Option<&Value>) -> Option<Group> {
    value.and_then(Value::as_str).and_then(Group::parse)
}

fn read_examiner(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

/// One roster entry. Typed fields are read leniently from the stored object;
/// on save, a field still holding the value it was read with is written back
/// exactly as stored, and keys this type does not know about pass through.
#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub id: Option<StudentId>,
    pub name: String,
    /// `None` when the stored group is not one of A, B or C.
    pub group: Option<Group>,
    pub scores: Scores,
    pub examiner: Option<String>,
    stored: Map<String, Value>,
}

impl Student {
    pub fn new(id: u64, name: impl Into<String>, group: Group) -> Self {
        let mut student = Self {
            id: Some(StudentId::from(id)),
            name: name.into(),
            group: Some(group),
            scores: Scores::default(),
            examiner: None,
            stored: Map::new(),
        };
        student.stored = student.canonical();
        student
    }

    pub fn from_stored(stored: Map<String, Value>) -> Self {
        Self {
            id: StudentId::read(stored.get("id")),
            name: read_name(stored.get("name")),
            group: read_group(stored.get("group")),
            scores: Scores::read(stored.get("scores")),
            examiner: read_examiner(stored.get("examiner")),
            stored,
        }
    }

    /// A student counts as graded once any subject carries a score.
    pub fn is_graded(&self) -> bool {
        self.scores.total() > 0.0
    }

    /// Group as shown in reports; an unrecognised stored value is shown as is.
    pub fn group_label(&self) -> String {
        match self.group {
            Some(g) => g.as_str().to_string(),
            None => self
                .stored
                .get("group")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }
    }

    fn canonical(&self) -> Map<String, Value> {
        let mut out = Map::new();
        if let Some(id) = &self.id {
            out.insert("id".into(), id.to_value());
        }
        out.insert("name".into(), Value::String(self.name.clone()));
        if let Some(g) = self.group {
            out.insert("group".into(), Value::String(g.as_str().to_string()));
        }
        let scores = SUBJECTS
            .iter()
            .map(|s| (s.key().to_string(), score_value(Score(self.scores.get(*s)))))
            .collect();
        out.insert("scores".into(), Value::Object(scores));
        if let Some(e) = &self.examiner {
            out.insert("examiner".into(), Value::String(e.clone()));
        }
        out
    }

    fn to_stored(&self) -> Map<String, Value> {
        let mut out = self.stored.clone();

        if StudentId::read(self.stored.get("id")) != self.id {
            put(&mut out, "id", self.id.as_ref().map(StudentId::to_value));
        }
        if read_name(self.stored.get("name")) != self.name {
            out.insert("name".into(), Value::String(self.name.clone()));
        }
        if read_group(self.stored.get("group")) != self.group {
            put(
                &mut out,
                "group",
                self.group.map(|g| Value::String(g.as_str().to_string())),
            );
        }
        if read_examiner(self.stored.get("examiner")) != self.examiner {
            put(&mut out, "examiner", self.examiner.clone().map(Value::String));
        }

        let stored_scores = self.stored.get("scores");
        if Scores::read(stored_scores) != self.scores {
            let mut sheet = match stored_scores {
                Some(Value::Object(obj)) => obj.clone(),
                _ => Map::new(),
            };
            for subject in SUBJECTS {
                let current = Score(self.scores.get(subject));
                if Score::read(sheet.get(subject.key())) != current {
                    sheet.insert(subject.key().to_string(), score_value(current));
                }
            }
            out.insert("scores".into(), Value::Object(sheet));
        }
        out
    }
}

fn put(map: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    match value {
        Some(v) => {
            map.insert(key.to_string(), v);
        }
        None => {
            map.remove(key);
        }
    }
}

impl Serialize for Student {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_stored().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Student {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::<String, Value>::deserialize(deserializer).map(Self::from_stored)
    }
}

/// Next free numeric id, or `None` once the numeric range is used up.
pub fn next_student_id(students: &[Student]) -> Option<u64> {
    let max = students
        .iter()
        .filter_map(|s| s.id.as_ref().and_then(StudentId::as_u64))
        .max();
    match max {
        Some(m) => m.checked_add(1),
        None => Some(1),
    }
}
