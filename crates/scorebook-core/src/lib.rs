//! # scorebook-core
//!
//! The records engine for Scorebook - THE DATA.
//!
//! This crate owns the school results model (sessions, classes, students,
//! subjects and marks) and every rule that keeps it consistent:
//! - `types` → records, inputs, joined views, errors
//! - `storage` → redb repository, id counters, cascades, mark upsert
//! - `aggregate` → totals, percentages, ranking, subject columns
//! - `seed` → demo roster loader
//!
//! ## Architectural Constraints
//!
//! - Every repository call is exactly one redb transaction
//! - A mark exists at most once per (student, subject) pair
//! - Deleting a parent removes everything reachable from it, atomically
//! - Has NO async, NO network dependencies (pure Rust)
//! - Does not log; callers receive reports and errors

// =============================================================================
// MODULES
// =============================================================================

pub mod aggregate;
pub mod primitives;
pub mod seed;
pub mod storage;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Admin, BulkMarksOutcome, CascadeReport, Class, ClassWithData, EntityKind, LoginRecord, Mark,
    MarkEntry, MarkWithSubject, NewAdmin, NewClass, NewSession, NewStudent, NewSubject,
    ScorebookError, Session, SessionWithClasses, Setting, StoreStats, Student, StudentPatch,
    StudentWithMarks, Subject, SubjectPatch,
};

// =============================================================================
// RE-EXPORTS: Storage & Aggregation
// =============================================================================

pub use aggregate::{ClassResults, ClassSummary, RankedStudent, Totals, class_results};
pub use seed::{SeedReport, seed_demo};
pub use storage::Repository;
