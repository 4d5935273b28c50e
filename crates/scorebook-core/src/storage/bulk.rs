//! Bulk replacement of one student's mark set.
//!
//! The entries are the complete desired set: every entry resolves a subject
//! and upserts its mark, and any mark the student had before that no entry
//! touched is removed afterwards.

use super::cascade::{insert_subject, remove_mark, upsert_mark};
use super::documents::{load, load_required, load_where, store};
use crate::{BulkMarksOutcome, Mark, MarkEntry, NewSubject, ScorebookError, Student, Subject};
use redb::WriteTransaction;
use std::collections::BTreeSet;

/// The subject an entry's existing mark points at, if both still exist.
fn subject_of_mark(
    txn: &WriteTransaction,
    student: &Student,
    mark_id: u64,
) -> Result<Option<Subject>, ScorebookError> {
    let Some(mark) = load::<Mark>(txn, mark_id)? else {
        return Ok(None);
    };
    if mark.student_id != student.id {
        return Ok(None);
    }
    load::<Subject>(txn, mark.subject_id)
}

/// Find or create the subject an entry refers to, refreshing its fields.
fn resolve_subject(
    txn: &WriteTransaction,
    student: &Student,
    entry: &MarkEntry,
    created: &mut Vec<Subject>,
) -> Result<u64, ScorebookError> {
    let by_mark = match entry.mark_id {
        Some(mark_id) => subject_of_mark(txn, student, mark_id)?,
        None => None,
    };
    if let Some(mut subject) = by_mark {
        subject.name.clone_from(&entry.subject);
        subject.max_marks = entry.max_marks;
        subject.date.clone_from(&entry.date);
        store(txn, &subject)?;
        return Ok(subject.id);
    }

    let existing = load_where::<Subject, _>(txn, |s| {
        s.class_id == student.class_id && s.name == entry.subject
    })?;
    match existing.into_iter().next() {
        Some(mut subject) => {
            subject.max_marks = entry.max_marks;
            subject.date.clone_from(&entry.date);
            store(txn, &subject)?;
            Ok(subject.id)
        }
        None => {
            let subject = insert_subject(
                txn,
                NewSubject {
                    name: entry.subject.clone(),
                    date: entry.date.clone(),
                    max_marks: entry.max_marks,
                    class_id: student.class_id,
                },
            )?;
            let id = subject.id;
            created.push(subject);
            Ok(id)
        }
    }
}

/// Make `entries` the student's complete mark set.
pub(crate) fn replace_student_marks(
    txn: &WriteTransaction,
    student_id: u64,
    entries: &[MarkEntry],
) -> Result<BulkMarksOutcome, ScorebookError> {
    let student = load_required::<Student>(txn, student_id)?;
    let before = load_where::<Mark, _>(txn, |m| m.student_id == student_id)?;

    let mut outcome = BulkMarksOutcome::default();
    let mut touched = BTreeSet::new();
    for entry in entries {
        let subject_id = resolve_subject(txn, &student, entry, &mut outcome.created_subjects)?;
        let mark = upsert_mark(txn, student_id, subject_id, &entry.obtained)?;
        touched.insert(mark.id);
        outcome.upserted.push(mark);
    }

    for mark in before.iter().filter(|m| !touched.contains(&m.id)) {
        if remove_mark(txn, mark)? {
            outcome.deleted_mark_ids.push(mark.id);
        }
    }
    Ok(outcome)
}
