//! # Integrity Cascade
//!
//! Referential integrity without a foreign-key engine:
//!
//! - **Upsert by pair**: [`upsert_mark`] is the only code that creates marks.
//!   It consults `mark_index`, so a second write for a (student, subject)
//!   pair updates the existing row instead of adding one.
//! - **Provisioning**: a new student gets a zero mark for every subject of
//!   its class, and a new subject gets one for every student of its class.
//! - **Cascading deletes**: marks go before their student or subject,
//!   students and subjects before their class, classes before their session.
//!
//! All functions run inside the caller's write transaction, so a cascade is
//! either fully committed or not visible at all.

use super::documents::{erase, load, load_where, store};
use super::ids::allocate;
use super::{MARK_INDEX, storage_err};
use crate::primitives::ZERO_MARK;
use crate::{
    CascadeReport, Class, EntityKind, Mark, NewStudent, NewSubject, ScorebookError, Student,
    Subject,
};
use redb::{ReadableTable, WriteTransaction};

// =============================================================================
// MARK UPSERT
// =============================================================================

fn indexed_mark_id(
    txn: &WriteTransaction,
    student_id: u64,
    subject_id: u64,
) -> Result<Option<u64>, ScorebookError> {
    let index = txn.open_table(MARK_INDEX).map_err(storage_err)?;
    let id = index
        .get((student_id, subject_id))
        .map_err(storage_err)?
        .map(|v| v.value());
    Ok(id)
}

/// Whether a mark already exists for the pair.
pub(crate) fn has_mark(
    txn: &WriteTransaction,
    student_id: u64,
    subject_id: u64,
) -> Result<bool, ScorebookError> {
    Ok(indexed_mark_id(txn, student_id, subject_id)?.is_some())
}

/// Update the pair's mark, or create it with a fresh id.
pub(crate) fn upsert_mark(
    txn: &WriteTransaction,
    student_id: u64,
    subject_id: u64,
    obtained: &str,
) -> Result<Mark, ScorebookError> {
    if let Some(mark_id) = indexed_mark_id(txn, student_id, subject_id)? {
        // A dangling index entry falls through and is overwritten below.
        if let Some(mut mark) = load::<Mark>(txn, mark_id)? {
            mark.obtained = obtained.to_string();
            store(txn, &mark)?;
            return Ok(mark);
        }
    }

    let mark = Mark {
        id: allocate(txn, EntityKind::Mark)?,
        student_id,
        subject_id,
        obtained: obtained.to_string(),
    };
    store(txn, &mark)?;
    let mut index = txn.open_table(MARK_INDEX).map_err(storage_err)?;
    index
        .insert((student_id, subject_id), mark.id)
        .map_err(storage_err)?;
    Ok(mark)
}

/// Remove one mark and its pair index entry.
pub(crate) fn remove_mark(txn: &WriteTransaction, mark: &Mark) -> Result<bool, ScorebookError> {
    let existed = erase::<Mark>(txn, mark.id)?;
    let pair = (mark.student_id, mark.subject_id);
    if indexed_mark_id(txn, mark.student_id, mark.subject_id)? == Some(mark.id) {
        let mut index = txn.open_table(MARK_INDEX).map_err(storage_err)?;
        index.remove(pair).map_err(storage_err)?;
    }
    Ok(existed)
}

fn remove_marks_where<F>(txn: &WriteTransaction, selected: F) -> Result<usize, ScorebookError>
where
    F: Fn(&Mark) -> bool,
{
    let doomed = load_where::<Mark, _>(txn, selected)?;
    let mut removed = 0;
    for mark in &doomed {
        if remove_mark(txn, mark)? {
            removed += 1;
        }
    }
    Ok(removed)
}

// =============================================================================
// PROVISIONING
// =============================================================================

fn require_class(txn: &WriteTransaction, class_id: u64) -> Result<(), ScorebookError> {
    if load::<Class>(txn, class_id)?.is_none() {
        return Err(ScorebookError::invalid(
            "classId",
            format!("Class {} does not exist", class_id),
        ));
    }
    Ok(())
}

/// Persist a new student and provision its zero marks.
pub(crate) fn insert_student(
    txn: &WriteTransaction,
    new: NewStudent,
) -> Result<Student, ScorebookError> {
    require_class(txn, new.class_id)?;
    let student = Student {
        id: allocate(txn, EntityKind::Student)?,
        roll_no: new.roll_no,
        name: new.name,
        class_id: new.class_id,
        is_paid: new.is_paid,
    };
    store(txn, &student)?;
    provision_student(txn, &student)?;
    Ok(student)
}

/// Persist a new subject and provision its zero marks.
pub(crate) fn insert_subject(
    txn: &WriteTransaction,
    new: NewSubject,
) -> Result<Subject, ScorebookError> {
    require_class(txn, new.class_id)?;
    let subject = Subject {
        id: allocate(txn, EntityKind::Subject)?,
        name: new.name,
        date: new.date,
        max_marks: new.max_marks,
        class_id: new.class_id,
    };
    store(txn, &subject)?;
    provision_subject(txn, &subject)?;
    Ok(subject)
}

/// Give a new student a zero mark for every subject of its class.
pub(crate) fn provision_student(
    txn: &WriteTransaction,
    student: &Student,
) -> Result<usize, ScorebookError> {
    let subjects = load_where::<Subject, _>(txn, |s| s.class_id == student.class_id)?;
    let mut created = 0;
    for subject in &subjects {
        if !has_mark(txn, student.id, subject.id)? {
            upsert_mark(txn, student.id, subject.id, ZERO_MARK)?;
            created += 1;
        }
    }
    Ok(created)
}

/// Give every student of the subject's class a zero mark for it.
pub(crate) fn provision_subject(
    txn: &WriteTransaction,
    subject: &Subject,
) -> Result<usize, ScorebookError> {
    let students = load_where::<Student, _>(txn, |s| s.class_id == subject.class_id)?;
    let mut created = 0;
    for student in &students {
        if !has_mark(txn, student.id, subject.id)? {
            upsert_mark(txn, student.id, subject.id, ZERO_MARK)?;
            created += 1;
        }
    }
    Ok(created)
}

// =============================================================================
// CASCADING DELETES
// =============================================================================

/// Delete a student's marks, then the student.
pub(crate) fn purge_student(
    txn: &WriteTransaction,
    student_id: u64,
) -> Result<CascadeReport, ScorebookError> {
    let marks = remove_marks_where(txn, |m| m.student_id == student_id)?;
    let students = usize::from(erase::<Student>(txn, student_id)?);
    Ok(CascadeReport {
        students,
        marks,
        ..CascadeReport::default()
    })
}

/// Delete a subject's marks, then the subject.
pub(crate) fn purge_subject(
    txn: &WriteTransaction,
    subject_id: u64,
) -> Result<CascadeReport, ScorebookError> {
    let marks = remove_marks_where(txn, |m| m.subject_id == subject_id)?;
    let subjects = usize::from(erase::<Subject>(txn, subject_id)?);
    Ok(CascadeReport {
        subjects,
        marks,
        ..CascadeReport::default()
    })
}

/// Delete every student and subject of a class, then the class.
pub(crate) fn purge_class(
    txn: &WriteTransaction,
    class_id: u64,
) -> Result<CascadeReport, ScorebookError> {
    let mut report = CascadeReport::default();

    for student in load_where::<Student, _>(txn, |s| s.class_id == class_id)? {
        report.absorb(purge_student(txn, student.id)?);
    }
    for subject in load_where::<Subject, _>(txn, |s| s.class_id == class_id)? {
        report.absorb(purge_subject(txn, subject.id)?);
    }

    report.classes += usize::from(erase::<Class>(txn, class_id)?);
    Ok(report)
}

/// Delete every class of a session, then the session.
pub(crate) fn purge_session(
    txn: &WriteTransaction,
    session_id: u64,
) -> Result<CascadeReport, ScorebookError> {
    let mut report = CascadeReport::default();

    for class in load_where::<Class, _>(txn, |c| c.session_id == session_id)? {
        report.absorb(purge_class(txn, class.id)?);
    }

    report.sessions += usize::from(erase::<crate::Session>(txn, session_id)?);
    Ok(report)
}
