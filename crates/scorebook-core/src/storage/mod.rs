//! # redb-backed Record Storage
//!
//! A disk-backed document store for Scorebook records using the redb
//! embedded database, providing:
//! - ACID transactions (one transaction per repository call)
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)
//!
//! ## Layout
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | `sessions`, `classes`, `students`, `subjects`, `marks`, `admins` | id `u64` | postcard record |
//! | `settings` | key `&str` | postcard [`Setting`](crate::Setting) |
//! | `counters` | collection name | last issued id |
//! | `mark_index` | `(student_id, subject_id)` | mark id |
//! | `admin_emails` | lowercased email | admin id |
//! | `logins` | token | postcard [`LoginRecord`](crate::LoginRecord) |
//!
//! `mark_index` is what makes "at most one mark per pair" hold: every mark
//! write goes through [`cascade::upsert_mark`], which consults it.

pub(crate) mod bulk;
pub(crate) mod cascade;
pub(crate) mod documents;
pub(crate) mod ids;
mod repository;

pub use repository::Repository;

use crate::ScorebookError;
use redb::TableDefinition;

/// Id counters: collection name -> last issued id.
pub(crate) const COUNTERS: TableDefinition<&str, u64> = TableDefinition::new("counters");

/// Pair index: (student_id, subject_id) -> mark id.
pub(crate) const MARK_INDEX: TableDefinition<(u64, u64), u64> =
    TableDefinition::new("mark_index");

/// Unique email index: lowercased email -> admin id.
pub(crate) const ADMIN_EMAILS: TableDefinition<&str, u64> = TableDefinition::new("admin_emails");

/// Settings: key -> serialized Setting.
pub(crate) const SETTINGS: TableDefinition<&str, &[u8]> = TableDefinition::new("settings");

/// Login tokens: token -> serialized LoginRecord.
pub(crate) const LOGINS: TableDefinition<&str, &[u8]> = TableDefinition::new("logins");

/// Map any redb error into a storage error.
pub(crate) fn storage_err(e: impl std::fmt::Display) -> ScorebookError {
    ScorebookError::StorageError(e.to_string())
}
