//! Demo data loader.
//!
//! Loads one session, one class, one annual test and its 39-student roster.
//! Running it again is a no-op: the session and class are matched by name,
//! and the roster is only loaded into a class that has no students yet.

use crate::{NewClass, NewSession, NewStudent, NewSubject, Repository, ScorebookError};
use serde::{Deserialize, Serialize};

pub const DEMO_SESSION: &str = "2025-26";
pub const DEMO_CLASS: &str = "10th Grade";
pub const DEMO_SUBJECT: &str = "IIC Annual Test 2026";
pub const DEMO_SUBJECT_DATE: &str = "2026-01-18";
pub const DEMO_MAX_MARKS: u32 = 80;

/// (roll number, name, marks obtained out of [`DEMO_MAX_MARKS`]).
pub const DEMO_ROSTER: [(i64, &str, u32); 39] = [
    (1, "Aakash Yadav", 54),
    (2, "Aryan Kumar", 51),
    (3, "Rahul Kumar", 70),
    (4, "Aman Kumar", 46),
    (5, "Prince Kumar", 0),
    (6, "Faiz Raza", 58),
    (7, "Meraj Alam", 0),
    (8, "Afroz", 0),
    (9, "Ismail", 0),
    (10, "Khusboo", 62),
    (11, "Salma Parveen", 0),
    (12, "Aaisha Khatoon", 49),
    (13, "Sahima", 0),
    (14, "Aashiya", 45),
    (15, "Shanzida", 36),
    (16, "Maimuna", 68),
    (17, "Soha", 56),
    (18, "Naziya (U)", 58),
    (19, "Jashmin", 56),
    (20, "Usha Kumari", 38),
    (21, "Gungun", 54),
    (22, "Naziya (D)", 45),
    (23, "Shahina Khatoon", 60),
    (24, "Sonam Kumari", 40),
    (25, "Farzana", 65),
    (26, "Muskan Khatoon", 53),
    (27, "Sabina", 60),
    (28, "Farhin", 0),
    (29, "Sanaa Parveen", 66),
    (30, "Rani Parveen", 56),
    (31, "Gulafsa", 68),
    (32, "Sajiya Khatoon", 54),
    (33, "Amarjit Kumar", 47),
    (34, "Prince Yadav", 21),
    (35, "Tabrez", 41),
    (36, "Faiz", 0),
    (37, "Muskan II", 0),
    (38, "Tahir", 40),
    (39, "Anshu Kumari", 0),
];

/// What a seeding run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub session_id: u64,
    pub class_id: u64,
    pub created_session: bool,
    pub created_class: bool,
    pub created_students: usize,
}

/// Load the demo data into `repo` unless it is already there.
pub fn seed_demo(repo: &Repository) -> Result<SeedReport, ScorebookError> {
    let mut report = SeedReport::default();

    let existing = repo
        .list_sessions()?
        .into_iter()
        .find(|s| s.name == DEMO_SESSION);
    let session = match existing {
        Some(session) => session,
        None => {
            report.created_session = true;
            repo.create_session(NewSession {
                name: DEMO_SESSION.to_string(),
                is_active: true,
            })?
        }
    };
    report.session_id = session.id;

    let existing = repo
        .list_classes(Some(session.id))?
        .into_iter()
        .find(|c| c.name == DEMO_CLASS);
    let class = match existing {
        Some(class) => class,
        None => {
            report.created_class = true;
            repo.create_class(NewClass {
                name: DEMO_CLASS.to_string(),
                session_id: session.id,
            })?
        }
    };
    report.class_id = class.id;

    if !repo.list_students_in_class(class.id)?.is_empty() {
        return Ok(report);
    }

    let subject = repo.create_subject(NewSubject {
        name: DEMO_SUBJECT.to_string(),
        date: Some(DEMO_SUBJECT_DATE.to_string()),
        max_marks: DEMO_MAX_MARKS,
        class_id: class.id,
    })?;
    for (roll_no, name, obtained) in DEMO_ROSTER {
        let student = repo.create_student(NewStudent::new(roll_no, name, class.id))?;
        repo.update_mark(student.id, subject.id, &obtained.to_string())?;
        report.created_students += 1;
    }

    Ok(report)
}
