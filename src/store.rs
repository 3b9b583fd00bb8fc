//! Persisted calculator state: one JSON blob per section.
//!
//! Storage never fails a request. Reads that error or hold malformed blobs
//! fall back to the in-memory copy or the section default; writes that error
//! keep the in-memory copy and report `persisted = false`.

use crate::calc::{number_from_value, GradeLevel, ScoreEntry};
use crate::db;
use crate::gpa::Subject;
use crate::term::TermSubject;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    GradeLevel,
    SubjectType,
    WrittenWorks,
    PerformanceTasks,
    QuarterlyAssessment,
    TargetGrade,
    TertiarySubjects,
    TermSubjects,
    DarkMode,
    History,
}

impl Section {
    pub const ALL: [Section; 10] = [
        Section::GradeLevel,
        Section::SubjectType,
        Section::WrittenWorks,
        Section::PerformanceTasks,
        Section::QuarterlyAssessment,
        Section::TargetGrade,
        Section::TertiarySubjects,
        Section::TermSubjects,
        Section::DarkMode,
        Section::History,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|section| section.key() == s)
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::GradeLevel => "gradeLevel",
            Self::SubjectType => "subjectType",
            Self::WrittenWorks => "writtenWorks",
            Self::PerformanceTasks => "performanceTasks",
            Self::QuarterlyAssessment => "quarterlyAssessment",
            Self::TargetGrade => "targetGrade",
            Self::TertiarySubjects => "tertiarySubjects",
            Self::TermSubjects => "termSubjects",
            Self::DarkMode => "darkMode",
            Self::History => "history",
        }
    }
}

fn default_section(section: Section) -> Value {
    match section {
        Section::GradeLevel => json!("1"),
        Section::SubjectType => json!("core"),
        Section::WrittenWorks | Section::PerformanceTasks => {
            json!([ScoreEntry::default()])
        }
        Section::QuarterlyAssessment => json!(ScoreEntry::default()),
        Section::TargetGrade => json!(85.0),
        Section::TertiarySubjects => json!([Subject::default()]),
        Section::TermSubjects => json!([TermSubject::default()]),
        Section::DarkMode => json!(false),
        Section::History => json!([]),
    }
}

fn typed<T: DeserializeOwned + Serialize>(value: Value) -> Result<Value, String> {
    let parsed: T = serde_json::from_value(value).map_err(|e| e.to_string())?;
    serde_json::to_value(parsed).map_err(|e| e.to_string())
}

/// Checks a blob against its section's shape and returns the normalised form.
pub fn canonicalize(section: Section, value: Value) -> Result<Value, String> {
    match section {
        Section::GradeLevel => {
            let raw = match &value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return Err("gradeLevel must be a string".into()),
            };
            GradeLevel::parse(&raw)
                .map(|level| Value::String(level.key()))
                .ok_or_else(|| format!("unknown grade level: {}", raw))
        }
        Section::SubjectType => {
            let s = value
                .as_str()
                .ok_or_else(|| "subjectType must be a string".to_string())?
                .trim()
                .to_ascii_lowercase();
            if s != "core" && s != "applied" && s != "specialized" {
                return Err("subjectType must be one of: core, applied, specialized".into());
            }
            Ok(Value::String(s))
        }
        Section::WrittenWorks | Section::PerformanceTasks => typed::<Vec<ScoreEntry>>(value),
        Section::QuarterlyAssessment => typed::<ScoreEntry>(value),
        Section::TargetGrade => Ok(number_from_value(&value)
            .map(Value::from)
            .unwrap_or(Value::Null)),
        Section::TertiarySubjects => typed::<Vec<Subject>>(value),
        Section::TermSubjects => typed::<Vec<TermSubject>>(value),
        Section::DarkMode => value
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| "darkMode must be boolean".to_string()),
        Section::History => typed::<Vec<HistoryEntry>>(value),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    K12,
    Tertiary,
    Term,
}

/// A saved result snapshot with a user label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub label: String,
    pub saved_at: String,
    pub kind: HistoryKind,
    pub value: f64,
    #[serde(default)]
    pub snapshot: Value,
}

impl HistoryEntry {
    pub fn new(label: impl Into<String>, kind: HistoryKind, value: f64, snapshot: Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            label: label.into(),
            saved_at: chrono::Utc::now().to_rfc3339(),
            kind,
            value,
            snapshot,
        }
    }
}

#[derive(Debug, Default)]
pub struct Store {
    memory: HashMap<Section, Value>,
    /// Sections whose last write did not reach the database. Memory is newer
    /// than the saved blob for these until a later write succeeds.
    unsynced: HashSet<Section>,
}

impl Store {
    /// Drops in-memory values, e.g. when another workspace is selected.
    pub fn reset(&mut self) {
        self.memory.clear();
        self.unsynced.clear();
    }

    fn mark_synced(&mut self, section: Section, persisted: bool) {
        if persisted {
            self.unsynced.remove(&section);
        } else {
            self.unsynced.insert(section);
        }
    }

    pub fn load(&self, conn: Option<&Connection>, section: Section) -> Value {
        let conn = conn.filter(|_| !self.unsynced.contains(&section));
        if let Some(conn) = conn {
            match db::settings_get_json(conn, section.key()) {
                Ok(Some(saved)) => match canonicalize(section, saved) {
                    Ok(v) => return v,
                    Err(e) => {
                        tracing::warn!("ignoring malformed saved {}: {e}", section.key())
                    }
                },
                Ok(None) => {}
                Err(e) => tracing::warn!("failed to read saved {}: {e}", section.key()),
            }
        }
        self.memory
            .get(&section)
            .cloned()
            .unwrap_or_else(|| default_section(section))
    }

    pub fn load_all(&self, conn: Option<&Connection>) -> Map<String, Value> {
        Section::ALL
            .iter()
            .map(|s| (s.key().to_string(), self.load(conn, *s)))
            .collect()
    }

    /// Validates and stores a section. `Err` only for a malformed value; the
    /// `bool` says whether it reached the workspace database.
    pub fn save(
        &mut self,
        conn: Option<&Connection>,
        section: Section,
        value: Value,
    ) -> Result<bool, String> {
        let value = canonicalize(section, value)?;
        let persisted = match conn {
            Some(conn) => match db::settings_set_json(conn, section.key(), &value) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("failed to save {}: {e}", section.key());
                    false
                }
            },
            None => false,
        };
        self.memory.insert(section, value);
        self.mark_synced(section, persisted);
        Ok(persisted)
    }

    pub fn clear(&mut self, conn: Option<&Connection>, section: Section) -> bool {
        self.memory.remove(&section);
        let persisted = match conn {
            Some(conn) => match db::settings_delete(conn, section.key()) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("failed to clear {}: {e}", section.key());
                    false
                }
            },
            None => false,
        };
        self.mark_synced(section, persisted);
        persisted
    }

    pub fn history(&self, conn: Option<&Connection>) -> Vec<HistoryEntry> {
        serde_json::from_value(self.load(conn, Section::History)).unwrap_or_default()
    }

    fn save_history(&mut self, conn: Option<&Connection>, entries: &[HistoryEntry]) -> bool {
        let value = serde_json::to_value(entries).unwrap_or_else(|_| json!([]));
        self.save(conn, Section::History, value).unwrap_or(false)
    }

    /// Appends to the log; returns the persisted flag.
    pub fn append_history(&mut self, conn: Option<&Connection>, entry: HistoryEntry) -> bool {
        let mut entries = self.history(conn);
        entries.push(entry);
        self.save_history(conn, &entries)
    }

    /// Returns `(removed, persisted)`.
    pub fn remove_history(&mut self, conn: Option<&Connection>, id: &str) -> (bool, bool) {
        let entries = self.history(conn);
        let before = entries.len();
        let kept: Vec<HistoryEntry> = entries.into_iter().filter(|e| e.id != id).collect();
        if kept.len() == before {
            return (false, false);
        }
        (true, self.save_history(conn, &kept))
    }
}
