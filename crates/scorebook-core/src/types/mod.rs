//! # Core Type Definitions
//!
//! This module contains all record types for the Scorebook results store:
//! - Stored records (`Session`, `Class`, `Student`, `Subject`, `Mark`, `Admin`, `Setting`)
//! - Insert and patch inputs (`NewStudent`, `SubjectPatch`, ...)
//! - Joined read views (`StudentWithMarks`, `ClassWithData`, `SessionWithClasses`)
//! - Operation reports (`CascadeReport`, `BulkMarksOutcome`, `StoreStats`)
//! - Error types (`ScorebookError`)
//!
//! ## Encoding
//!
//! Stored records are written with postcard, which is not self-describing.
//! Stored structs therefore never use `skip_serializing_if`; the camelCase
//! renames only affect the JSON shape served by the API.

use crate::primitives::{PLACEHOLDER_MAX_MARKS, PLACEHOLDER_SUBJECT_NAME};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// ENTITY KINDS
// =============================================================================

/// The kinds of record the repository stores.
///
/// Each kind owns one id counter, keyed by its collection name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Session,
    Class,
    Student,
    Subject,
    Mark,
    Admin,
    Setting,
}

impl EntityKind {
    /// Collection name, also used as the id counter key.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Session => "sessions",
            Self::Class => "classes",
            Self::Student => "students",
            Self::Subject => "subjects",
            Self::Mark => "marks",
            Self::Admin => "admins",
            Self::Setting => "settings",
        }
    }

    /// Human-readable singular name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Session => "Session",
            Self::Class => "Class",
            Self::Student => "Student",
            Self::Subject => "Subject",
            Self::Mark => "Mark",
            Self::Admin => "Admin",
            Self::Setting => "Setting",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// STORED RECORDS
// =============================================================================

/// An academic session (e.g. "2025-26"). Owns its classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: u64,
    pub name: String,
    pub is_active: bool,
}

/// A cohort of students inside one session. Owns its students and subjects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: u64,
    pub name: String,
    pub session_id: u64,
}

/// A student enrolled in exactly one class.
///
/// `roll_no` orders the class register; it is not required to be unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: u64,
    pub roll_no: i64,
    pub name: String,
    pub class_id: u64,
    pub is_paid: bool,
}

/// One scored test or exam held for a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: u64,
    pub name: String,
    /// ISO `YYYY-MM-DD` date, if the test has been scheduled.
    pub date: Option<String>,
    pub max_marks: u32,
    pub class_id: u64,
}

impl Subject {
    /// Stand-in subject for a mark whose subject row is missing.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            id: 0,
            name: PLACEHOLDER_SUBJECT_NAME.to_string(),
            date: None,
            max_marks: PLACEHOLDER_MAX_MARKS,
            class_id: 0,
        }
    }
}

/// One student's score on one subject.
///
/// `obtained` stays textual end to end; aggregation parses it leniently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mark {
    pub id: u64,
    pub student_id: u64,
    pub subject_id: u64,
    pub obtained: String,
}

/// An administrator account. Never serialized to API clients directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: u64,
    pub email: String,
    /// PHC-format password hash.
    pub password_hash: String,
    pub name: String,
    pub is_super_admin: bool,
}

/// A free-form key/value display setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub id: u64,
    pub key: String,
    pub value: String,
}

/// A persisted login token record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRecord {
    pub admin_id: u64,
    /// Seconds since the Unix epoch.
    pub issued_at: u64,
}

// =============================================================================
// INSERT / PATCH INPUTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClass {
    pub name: String,
    pub session_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub roll_no: i64,
    pub name: String,
    pub class_id: u64,
    pub is_paid: bool,
}

impl NewStudent {
    /// A paid student, the default for new enrolments.
    #[must_use]
    pub fn new(roll_no: i64, name: impl Into<String>, class_id: u64) -> Self {
        Self {
            roll_no,
            name: name.into(),
            class_id,
            is_paid: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubject {
    pub name: String,
    pub date: Option<String>,
    pub max_marks: u32,
    pub class_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAdmin {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub is_super_admin: bool,
}

/// Partial update for a student. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub roll_no: Option<i64>,
}

/// Partial update for a subject. Changing `max_marks` never rescales marks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectPatch {
    pub name: Option<String>,
    pub max_marks: Option<u32>,
    pub date: Option<String>,
}

/// One row of a bulk mark replacement for a single student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkEntry {
    /// Existing mark id; selects that mark's subject when it still exists.
    pub mark_id: Option<u64>,
    /// Subject name, matched within the student's class.
    pub subject: String,
    pub date: Option<String>,
    pub obtained: String,
    pub max_marks: u32,
}

// =============================================================================
// JOINED VIEWS
// =============================================================================

/// A mark joined with its subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkWithSubject {
    #[serde(flatten)]
    pub mark: Mark,
    pub subject: Subject,
}

/// A student joined with all of its marks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentWithMarks {
    #[serde(flatten)]
    pub student: Student,
    pub marks: Vec<MarkWithSubject>,
}

/// A class with its students (joined) and subjects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassWithData {
    #[serde(flatten)]
    pub class: Class,
    pub students: Vec<StudentWithMarks>,
    pub subjects: Vec<Subject>,
}

/// A session with its classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWithClasses {
    #[serde(flatten)]
    pub session: Session,
    pub classes: Vec<Class>,
}

// =============================================================================
// OPERATION REPORTS
// =============================================================================

/// Counts of rows removed by a cascading delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeReport {
    pub sessions: usize,
    pub classes: usize,
    pub students: usize,
    pub subjects: usize,
    pub marks: usize,
}

impl CascadeReport {
    /// Fold a child report into this one.
    pub fn absorb(&mut self, other: Self) {
        self.sessions += other.sessions;
        self.classes += other.classes;
        self.students += other.students;
        self.subjects += other.subjects;
        self.marks += other.marks;
    }

    /// Total number of rows removed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.sessions + self.classes + self.students + self.subjects + self.marks
    }

    /// True when nothing was removed (the target did not exist).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Result of replacing a student's full mark set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkMarksOutcome {
    pub upserted: Vec<Mark>,
    pub deleted_mark_ids: Vec<u64>,
    pub created_subjects: Vec<Subject>,
}

/// Row counts per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub sessions: usize,
    pub classes: usize,
    pub students: usize,
    pub subjects: usize,
    pub marks: usize,
    pub admins: usize,
    pub settings: usize,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Scorebook core.
///
/// - No silent failures
/// - Use `Result<T, ScorebookError>` for fallible operations
/// - The core never panics; all errors are recoverable
#[derive(Debug, Error)]
pub enum ScorebookError {
    /// An input failed a business rule (unknown parent id, empty name, ...).
    #[error("{message}")]
    InvalidInput { field: String, message: String },

    /// The requested record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: u64 },

    /// A uniqueness rule was violated.
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// The underlying database failed.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// A stored record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ScorebookError {
    /// Shorthand for an `InvalidInput` error on `field`.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a `NotFound` error.
    #[must_use]
    pub const fn not_found(entity: EntityKind, id: u64) -> Self {
        Self::NotFound { entity, id }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_names_are_distinct() {
        let kinds = [
            EntityKind::Session,
            EntityKind::Class,
            EntityKind::Student,
            EntityKind::Subject,
            EntityKind::Mark,
            EntityKind::Admin,
            EntityKind::Setting,
        ];
        let names: std::collections::BTreeSet<_> =
            kinds.iter().map(|k| k.collection()).collect();
        assert_eq!(names.len(), kinds.len());
    }

    #[test]
    fn cascade_report_absorb() {
        let mut report = CascadeReport {
            students: 1,
            marks: 2,
            ..CascadeReport::default()
        };
        report.absorb(CascadeReport {
            subjects: 1,
            marks: 3,
            ..CascadeReport::default()
        });
        assert_eq!(report.marks, 5);
        assert_eq!(report.total(), 7);
        assert!(!report.is_empty());
        assert!(CascadeReport::default().is_empty());
    }

    #[test]
    fn student_with_marks_flattens_to_camel_case() {
        let view = StudentWithMarks {
            student: Student {
                id: 4,
                roll_no: 12,
                name: "Gungun".to_string(),
                class_id: 2,
                is_paid: true,
            },
            marks: vec![MarkWithSubject {
                mark: Mark {
                    id: 9,
                    student_id: 4,
                    subject_id: 3,
                    obtained: "54".to_string(),
                },
                subject: Subject::placeholder(),
            }],
        };

        let json = serde_json::to_string(&view).expect("json");
        assert!(json.contains("\"rollNo\":12"));
        assert!(json.contains("\"classId\":2"));
        assert!(json.contains("\"studentId\":4"));
        assert!(json.contains("\"name\":\"Unknown\""));
        assert!(json.contains("\"maxMarks\":100"));
    }

    #[test]
    fn not_found_message_names_entity() {
        let err = ScorebookError::not_found(EntityKind::Student, 7);
        assert_eq!(err.to_string(), "Student not found: 7");
    }

    #[test]
    fn stored_records_roundtrip_through_postcard() {
        let subject = Subject {
            id: 3,
            name: "IIC Annual Test".to_string(),
            date: None,
            max_marks: 80,
            class_id: 1,
        };
        let bytes = postcard::to_allocvec(&subject).expect("encode");
        let decoded: Subject = postcard::from_bytes(&bytes).expect("decode");
        assert_eq!(decoded, subject);
    }
}
