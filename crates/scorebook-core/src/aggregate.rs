//! # Aggregation Engine
//!
//! Pure functions over joined records: totals, percentages, pass flags,
//! ranking and the subject-column union used by the leaderboard.
//!
//! Nothing here touches storage. Inputs are the joined views the
//! [`Repository`](crate::Repository) returns, so the same rows always produce
//! the same table.
//!
//! ## Rules
//!
//! - `obtained` is parsed leniently: surrounding whitespace is ignored and
//!   anything that is not a finite number counts as `0`. The whole string
//!   must be numeric, so `"54abc"` is `0`, not `54`.
//! - percentage = `100 * obtained / max`, or `0` when `max` is `0`.
//! - Ranking is by percentage, highest first; equal percentages keep their
//!   input order.
//! - A missing subject date sorts before every dated subject.

#![allow(clippy::float_arithmetic)]

use crate::primitives::PASS_THRESHOLD_PERCENT;
use crate::{Class, ClassWithData, MarkWithSubject, StudentWithMarks, Subject};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

// =============================================================================
// SCALARS
// =============================================================================

/// Numeric value of a textual mark; invalid, empty and non-finite are `0`.
pub fn parse_obtained(obtained: &str) -> f64 {
    match obtained.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// `100 * obtained / max`, or `0` when `max` is not positive.
pub fn percentage(obtained: f64, max: f64) -> f64 {
    if max > 0.0 {
        100.0 * obtained / max
    } else {
        0.0
    }
}

/// Whether a single mark reaches the pass threshold.
pub fn is_pass(obtained: &str, max_marks: u32) -> bool {
    percentage(parse_obtained(obtained), f64::from(max_marks)) >= PASS_THRESHOLD_PERCENT
}

// =============================================================================
// PER-STUDENT TOTALS
// =============================================================================

/// Summed marks of one student.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub obtained: f64,
    pub max: u64,
    pub percentage: f64,
}

impl Totals {
    /// The pass threshold applied to the aggregate.
    pub fn is_pass(&self) -> bool {
        self.percentage >= PASS_THRESHOLD_PERCENT
    }
}

/// Sum a student's marks against their subjects' maximums.
pub fn student_totals(marks: &[MarkWithSubject]) -> Totals {
    let obtained: f64 = marks.iter().map(|m| parse_obtained(&m.mark.obtained)).sum();
    let max: u64 = marks.iter().map(|m| u64::from(m.subject.max_marks)).sum();
    Totals {
        obtained,
        max,
        percentage: percentage(obtained, max as f64),
    }
}

// =============================================================================
// RANKING
// =============================================================================

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedStudent {
    /// 1-based position on the leaderboard.
    pub rank: usize,
    pub student_id: u64,
    pub roll_no: i64,
    pub name: String,
    pub totals: Totals,
    pub passed: bool,
}

/// Order students by percentage, highest first. Stable on ties.
pub fn rank_students(students: &[StudentWithMarks]) -> Vec<RankedStudent> {
    let mut rows: Vec<(&StudentWithMarks, Totals)> = students
        .iter()
        .map(|s| (s, student_totals(&s.marks)))
        .collect();
    // sort_by is stable
    rows.sort_by(|a, b| b.1.percentage.total_cmp(&a.1.percentage));

    rows.into_iter()
        .enumerate()
        .map(|(index, (s, totals))| RankedStudent {
            rank: index + 1,
            student_id: s.student.id,
            roll_no: s.student.roll_no,
            name: s.student.name.clone(),
            totals,
            passed: totals.is_pass(),
        })
        .collect()
}

// =============================================================================
// SUBJECT COLUMNS
// =============================================================================

fn by_date(a: &Subject, b: &Subject) -> Ordering {
    match (&a.date, &b.date) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.cmp(y),
    }
}

/// Distinct subjects referenced by any mark, oldest first.
///
/// Deduplicated by subject id in first-seen order, then stable-sorted by
/// date, so undated subjects lead and same-day subjects keep their order.
pub fn subject_columns(students: &[StudentWithMarks]) -> Vec<Subject> {
    let mut seen = BTreeSet::new();
    let mut columns: Vec<Subject> = students
        .iter()
        .flat_map(|s| s.marks.iter())
        .filter(|m| seen.insert(m.subject.id))
        .map(|m| m.subject.clone())
        .collect();
    columns.sort_by(by_date);
    columns
}

// =============================================================================
// CLASS RESULTS
// =============================================================================

/// Headline figures for a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    pub student_count: usize,
    /// Mean of the students' percentages; `0` for an empty class.
    pub average_percentage: f64,
    pub top_performer: Option<String>,
}

/// The full leaderboard of one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassResults {
    pub class: Class,
    pub columns: Vec<Subject>,
    pub rows: Vec<RankedStudent>,
    pub summary: ClassSummary,
}

/// Build the leaderboard for a class and its joined students.
pub fn class_results(data: &ClassWithData) -> ClassResults {
    let rows = rank_students(&data.students);
    let average_percentage = if rows.is_empty() {
        0.0
    } else {
        rows.iter().map(|r| r.totals.percentage).sum::<f64>() / rows.len() as f64
    };
    let summary = ClassSummary {
        student_count: rows.len(),
        average_percentage,
        top_performer: rows.first().map(|r| r.name.clone()),
    };

    ClassResults {
        class: data.class.clone(),
        columns: subject_columns(&data.students),
        rows,
        summary,
    }
}
