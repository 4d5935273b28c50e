//! The entity repository.
//!
//! Every public method is exactly one redb transaction. Writes go through
//! [`Repository::write`], which commits on success and aborts on any error,
//! so a failed cascade or bulk replacement leaves no trace.

use super::bulk::replace_student_marks;
use super::cascade::{
    insert_student, insert_subject, purge_class, purge_session, purge_student, purge_subject,
    remove_mark, upsert_mark,
};
use super::documents::{
    Document, decode, encode, load, load_required, load_where, read, read_all, store,
};
use super::ids::allocate;
use super::{ADMIN_EMAILS, COUNTERS, LOGINS, MARK_INDEX, SETTINGS, storage_err};
use crate::{
    Admin, BulkMarksOutcome, CascadeReport, Class, ClassWithData, EntityKind, LoginRecord, Mark,
    MarkEntry, MarkWithSubject, NewAdmin, NewClass, NewSession, NewStudent, NewSubject,
    ScorebookError, Session, SessionWithClasses, Setting, StoreStats, Student, StudentPatch,
    StudentWithMarks, Subject, SubjectPatch,
};
use redb::backends::InMemoryBackend;
use redb::{
    Database, ReadTransaction, ReadableDatabase, ReadableTable, ReadableTableMetadata,
    WriteTransaction,
};
use std::collections::BTreeMap;
use std::path::Path;

/// Handle to a Scorebook database.
///
/// Constructed explicitly and shared (behind an `Arc`) by whoever serves
/// requests; there is no global instance.
pub struct Repository {
    db: Database,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository").finish_non_exhaustive()
    }
}

impl Repository {
    /// Open or create a database file, creating any missing tables.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ScorebookError> {
        let db = Database::create(path.as_ref()).map_err(storage_err)?;
        Self::initialize(db)
    }

    /// A volatile database, used by tests and dry runs.
    pub fn in_memory() -> Result<Self, ScorebookError> {
        let db = Database::builder()
            .create_with_backend(InMemoryBackend::new())
            .map_err(storage_err)?;
        Self::initialize(db)
    }

    fn initialize(db: Database) -> Result<Self, ScorebookError> {
        let repo = Self { db };
        repo.write(|txn| {
            txn.open_table(Session::TABLE).map_err(storage_err)?;
            txn.open_table(Class::TABLE).map_err(storage_err)?;
            txn.open_table(Student::TABLE).map_err(storage_err)?;
            txn.open_table(Subject::TABLE).map_err(storage_err)?;
            txn.open_table(Mark::TABLE).map_err(storage_err)?;
            txn.open_table(Admin::TABLE).map_err(storage_err)?;
            txn.open_table(SETTINGS).map_err(storage_err)?;
            txn.open_table(COUNTERS).map_err(storage_err)?;
            txn.open_table(MARK_INDEX).map_err(storage_err)?;
            txn.open_table(ADMIN_EMAILS).map_err(storage_err)?;
            txn.open_table(LOGINS).map_err(storage_err)?;
            Ok(())
        })?;
        Ok(repo)
    }

    /// Run `op` in one write transaction; commit on `Ok`, abort on `Err`.
    fn write<T, F>(&self, op: F) -> Result<T, ScorebookError>
    where
        F: FnOnce(&WriteTransaction) -> Result<T, ScorebookError>,
    {
        let txn = self.db.begin_write().map_err(storage_err)?;
        match op(&txn) {
            Ok(value) => {
                txn.commit().map_err(storage_err)?;
                Ok(value)
            }
            Err(err) => {
                txn.abort().map_err(storage_err)?;
                Err(err)
            }
        }
    }

    fn snapshot(&self) -> Result<ReadTransaction, ScorebookError> {
        self.db.begin_read().map_err(storage_err)
    }

    /// Allocate an id for `kind` in its own transaction.
    ///
    /// Repository inserts allocate inside their own transaction instead;
    /// this is for callers that need an id without a record.
    pub fn next_id(&self, kind: EntityKind) -> Result<u64, ScorebookError> {
        self.write(|txn| allocate(txn, kind))
    }

    /// Row counts per collection.
    pub fn stats(&self) -> Result<StoreStats, ScorebookError> {
        let txn = self.snapshot()?;
        let count = |len: Result<u64, redb::StorageError>| -> Result<usize, ScorebookError> {
            len.map(|n| n as usize).map_err(storage_err)
        };
        Ok(StoreStats {
            sessions: count(txn.open_table(Session::TABLE).map_err(storage_err)?.len())?,
            classes: count(txn.open_table(Class::TABLE).map_err(storage_err)?.len())?,
            students: count(txn.open_table(Student::TABLE).map_err(storage_err)?.len())?,
            subjects: count(txn.open_table(Subject::TABLE).map_err(storage_err)?.len())?,
            marks: count(txn.open_table(Mark::TABLE).map_err(storage_err)?.len())?,
            admins: count(txn.open_table(Admin::TABLE).map_err(storage_err)?.len())?,
            settings: count(txn.open_table(SETTINGS).map_err(storage_err)?.len())?,
        })
    }

    // =========================================================================
    // SESSIONS
    // =========================================================================

    pub fn list_sessions(&self) -> Result<Vec<Session>, ScorebookError> {
        read_all(&self.snapshot()?)
    }

    /// A session with its classes, or `None` if it does not exist.
    pub fn get_session_with_classes(
        &self,
        id: u64,
    ) -> Result<Option<SessionWithClasses>, ScorebookError> {
        let txn = self.snapshot()?;
        let Some(session) = read::<Session>(&txn, id)? else {
            return Ok(None);
        };
        let classes = read_all::<Class>(&txn)?
            .into_iter()
            .filter(|c| c.session_id == id)
            .collect();
        Ok(Some(SessionWithClasses { session, classes }))
    }

    /// Create a session. Names are unique.
    pub fn create_session(&self, new: NewSession) -> Result<Session, ScorebookError> {
        self.write(|txn| {
            if !load_where::<Session, _>(txn, |s| s.name == new.name)?.is_empty() {
                return Err(ScorebookError::Duplicate(format!(
                    "Session '{}' already exists",
                    new.name
                )));
            }
            let session = Session {
                id: allocate(txn, EntityKind::Session)?,
                name: new.name,
                is_active: new.is_active,
            };
            store(txn, &session)?;
            Ok(session)
        })
    }

    /// Delete a session and everything reachable from it.
    pub fn delete_session(&self, id: u64) -> Result<CascadeReport, ScorebookError> {
        self.write(|txn| purge_session(txn, id))
    }

    // =========================================================================
    // CLASSES
    // =========================================================================

    /// All classes, optionally restricted to one session.
    pub fn list_classes(&self, session_id: Option<u64>) -> Result<Vec<Class>, ScorebookError> {
        let classes = read_all::<Class>(&self.snapshot()?)?;
        Ok(match session_id {
            Some(sid) => classes.into_iter().filter(|c| c.session_id == sid).collect(),
            None => classes,
        })
    }

    pub fn get_class(&self, id: u64) -> Result<Option<Class>, ScorebookError> {
        read(&self.snapshot()?, id)
    }

    /// A class with its joined students and its subjects.
    pub fn get_class_with_data(&self, id: u64) -> Result<Option<ClassWithData>, ScorebookError> {
        let txn = self.snapshot()?;
        let Some(class) = read::<Class>(&txn, id)? else {
            return Ok(None);
        };
        let subjects = read_all::<Subject>(&txn)?;
        let students = read_all::<Student>(&txn)?
            .into_iter()
            .filter(|s| s.class_id == id)
            .collect();
        let students = join_students(students, &read_all::<Mark>(&txn)?, &subjects);
        let subjects = subjects.into_iter().filter(|s| s.class_id == id).collect();
        Ok(Some(ClassWithData {
            class,
            students,
            subjects,
        }))
    }

    /// Create a class in an existing session.
    pub fn create_class(&self, new: NewClass) -> Result<Class, ScorebookError> {
        self.write(|txn| {
            if load::<Session>(txn, new.session_id)?.is_none() {
                return Err(ScorebookError::invalid(
                    "sessionId",
                    format!("Session {} does not exist", new.session_id),
                ));
            }
            let class = Class {
                id: allocate(txn, EntityKind::Class)?,
                name: new.name,
                session_id: new.session_id,
            };
            store(txn, &class)?;
            Ok(class)
        })
    }

    /// Delete a class, its students, its subjects and all their marks.
    pub fn delete_class(&self, id: u64) -> Result<CascadeReport, ScorebookError> {
        self.write(|txn| purge_class(txn, id))
    }

    // =========================================================================
    // STUDENTS
    // =========================================================================

    /// Every student joined with its marks and their subjects.
    pub fn list_students(&self) -> Result<Vec<StudentWithMarks>, ScorebookError> {
        let txn = self.snapshot()?;
        Ok(join_students(
            read_all::<Student>(&txn)?,
            &read_all::<Mark>(&txn)?,
            &read_all::<Subject>(&txn)?,
        ))
    }

    /// The joined students of one class.
    pub fn list_students_in_class(
        &self,
        class_id: u64,
    ) -> Result<Vec<StudentWithMarks>, ScorebookError> {
        let txn = self.snapshot()?;
        let students = read_all::<Student>(&txn)?
            .into_iter()
            .filter(|s| s.class_id == class_id)
            .collect();
        Ok(join_students(
            students,
            &read_all::<Mark>(&txn)?,
            &read_all::<Subject>(&txn)?,
        ))
    }

    pub fn get_student(&self, id: u64) -> Result<Option<StudentWithMarks>, ScorebookError> {
        let txn = self.snapshot()?;
        let Some(student) = read::<Student>(&txn, id)? else {
            return Ok(None);
        };
        let marks = read_all::<Mark>(&txn)?;
        let subjects = read_all::<Subject>(&txn)?;
        let mut joined = join_students(vec![student], &marks, &subjects);
        Ok(joined.pop())
    }

    /// Enrol a student and give it a zero mark for every subject of its class.
    pub fn create_student(&self, new: NewStudent) -> Result<Student, ScorebookError> {
        self.write(|txn| insert_student(txn, new))
    }

    pub fn update_student(&self, id: u64, patch: StudentPatch) -> Result<Student, ScorebookError> {
        self.write(|txn| {
            let mut student = load_required::<Student>(txn, id)?;
            if let Some(name) = patch.name {
                student.name = name;
            }
            if let Some(roll_no) = patch.roll_no {
                student.roll_no = roll_no;
            }
            store(txn, &student)?;
            Ok(student)
        })
    }

    /// Delete a student and its marks.
    pub fn delete_student(&self, id: u64) -> Result<CascadeReport, ScorebookError> {
        self.write(|txn| purge_student(txn, id))
    }

    // =========================================================================
    // SUBJECTS
    // =========================================================================

    /// All subjects, optionally restricted to one class.
    pub fn list_subjects(&self, class_id: Option<u64>) -> Result<Vec<Subject>, ScorebookError> {
        let subjects = read_all::<Subject>(&self.snapshot()?)?;
        Ok(match class_id {
            Some(cid) => subjects.into_iter().filter(|s| s.class_id == cid).collect(),
            None => subjects,
        })
    }

    pub fn get_subject(&self, id: u64) -> Result<Option<Subject>, ScorebookError> {
        read(&self.snapshot()?, id)
    }

    /// Create a subject and give every student of its class a zero mark.
    pub fn create_subject(&self, new: NewSubject) -> Result<Subject, ScorebookError> {
        self.write(|txn| insert_subject(txn, new))
    }

    /// Patch a subject. Existing marks are never rescaled.
    pub fn update_subject(&self, id: u64, patch: SubjectPatch) -> Result<Subject, ScorebookError> {
        self.write(|txn| {
            let mut subject = load_required::<Subject>(txn, id)?;
            if let Some(name) = patch.name {
                subject.name = name;
            }
            if let Some(max_marks) = patch.max_marks {
                subject.max_marks = max_marks;
            }
            if patch.date.is_some() {
                subject.date = patch.date;
            }
            store(txn, &subject)?;
            Ok(subject)
        })
    }

    /// Delete a subject and its marks.
    pub fn delete_subject(&self, id: u64) -> Result<CascadeReport, ScorebookError> {
        self.write(|txn| purge_subject(txn, id))
    }

    // =========================================================================
    // MARKS
    // =========================================================================

    pub fn list_marks(&self) -> Result<Vec<Mark>, ScorebookError> {
        read_all(&self.snapshot()?)
    }

    /// Set the mark for a (student, subject) pair, creating it if needed.
    pub fn update_mark(
        &self,
        student_id: u64,
        subject_id: u64,
        obtained: &str,
    ) -> Result<Mark, ScorebookError> {
        self.write(|txn| {
            if load::<Student>(txn, student_id)?.is_none() {
                return Err(ScorebookError::invalid(
                    "studentId",
                    format!("Student {} does not exist", student_id),
                ));
            }
            if load::<Subject>(txn, subject_id)?.is_none() {
                return Err(ScorebookError::invalid(
                    "subjectId",
                    format!("Subject {} does not exist", subject_id),
                ));
            }
            upsert_mark(txn, student_id, subject_id, obtained)
        })
    }

    /// Remove one mark; returns whether it existed.
    pub fn delete_mark(&self, id: u64) -> Result<bool, ScorebookError> {
        self.write(|txn| match load::<Mark>(txn, id)? {
            Some(mark) => remove_mark(txn, &mark),
            None => Ok(false),
        })
    }

    /// Replace a student's whole mark set with `entries`.
    pub fn replace_student_marks(
        &self,
        student_id: u64,
        entries: &[MarkEntry],
    ) -> Result<BulkMarksOutcome, ScorebookError> {
        self.write(|txn| replace_student_marks(txn, student_id, entries))
    }

    // =========================================================================
    // SETTINGS
    // =========================================================================

    pub fn get_setting(&self, key: &str) -> Result<Option<String>, ScorebookError> {
        let txn = self.snapshot()?;
        let table = txn.open_table(SETTINGS).map_err(storage_err)?;
        let setting = table
            .get(key)
            .map_err(storage_err)?
            .map(|v| decode::<Setting>(v.value()))
            .transpose()?;
        Ok(setting.map(|s| s.value))
    }

    /// Insert or overwrite a setting. An id is allocated only for a new key.
    pub fn set_setting(&self, key: &str, value: &str) -> Result<Setting, ScorebookError> {
        self.write(|txn| {
            let existing = {
                let table = txn.open_table(SETTINGS).map_err(storage_err)?;
                table
                    .get(key)
                    .map_err(storage_err)?
                    .map(|v| decode::<Setting>(v.value()))
                    .transpose()?
            };
            let setting = match existing {
                Some(mut setting) => {
                    setting.value = value.to_string();
                    setting
                }
                None => Setting {
                    id: allocate(txn, EntityKind::Setting)?,
                    key: key.to_string(),
                    value: value.to_string(),
                },
            };
            let bytes = encode(&setting)?;
            let mut table = txn.open_table(SETTINGS).map_err(storage_err)?;
            table.insert(key, bytes.as_slice()).map_err(storage_err)?;
            Ok(setting)
        })
    }

    /// All settings, ordered by key.
    pub fn list_settings(&self) -> Result<Vec<Setting>, ScorebookError> {
        let txn = self.snapshot()?;
        let table = txn.open_table(SETTINGS).map_err(storage_err)?;
        let mut settings = Vec::new();
        for entry in table.iter().map_err(storage_err)? {
            let (_, value) = entry.map_err(storage_err)?;
            settings.push(decode(value.value())?);
        }
        Ok(settings)
    }

    // =========================================================================
    // ADMINS
    // =========================================================================

    /// Look an admin up by email, case-insensitively.
    pub fn get_admin_by_email(&self, email: &str) -> Result<Option<Admin>, ScorebookError> {
        let txn = self.snapshot()?;
        let admin_id = {
            let index = txn.open_table(ADMIN_EMAILS).map_err(storage_err)?;
            index
                .get(normalize_email(email).as_str())
                .map_err(storage_err)?
                .map(|v| v.value())
        };
        match admin_id {
            Some(id) => read(&txn, id),
            None => Ok(None),
        }
    }

    /// Create an admin. Emails are unique, compared case-insensitively.
    pub fn create_admin(&self, new: NewAdmin) -> Result<Admin, ScorebookError> {
        let email = normalize_email(&new.email);
        self.write(|txn| {
            let mut index = txn.open_table(ADMIN_EMAILS).map_err(storage_err)?;
            if index.get(email.as_str()).map_err(storage_err)?.is_some() {
                return Err(ScorebookError::Duplicate(format!(
                    "Admin '{}' already exists",
                    email
                )));
            }
            let admin = Admin {
                id: allocate(txn, EntityKind::Admin)?,
                email: email.clone(),
                password_hash: new.password_hash,
                name: new.name,
                is_super_admin: new.is_super_admin,
            };
            index
                .insert(email.as_str(), admin.id)
                .map_err(storage_err)?;
            store(txn, &admin)?;
            Ok(admin)
        })
    }

    // =========================================================================
    // LOGIN TOKENS
    // =========================================================================

    /// Persist a login token for `admin_id`, issued at `issued_at` (epoch seconds).
    ///
    /// Tokens older than `ttl_secs` are removed in the same transaction;
    /// returns how many were swept.
    pub fn store_login(
        &self,
        token: &str,
        admin_id: u64,
        issued_at: u64,
        ttl_secs: u64,
    ) -> Result<usize, ScorebookError> {
        let bytes = encode(&LoginRecord {
            admin_id,
            issued_at,
        })?;
        self.write(|txn| {
            let mut table = txn.open_table(LOGINS).map_err(storage_err)?;
            let mut expired = Vec::new();
            for entry in table.iter().map_err(storage_err)? {
                let (key, value) = entry.map_err(storage_err)?;
                let record = decode::<LoginRecord>(value.value())?;
                if issued_at.saturating_sub(record.issued_at) > ttl_secs {
                    expired.push(key.value().to_string());
                }
            }
            for key in &expired {
                table.remove(key.as_str()).map_err(storage_err)?;
            }
            table.insert(token, bytes.as_slice()).map_err(storage_err)?;
            Ok(expired.len())
        })
    }

    /// The admin a token belongs to, unless it is unknown or older than `ttl_secs`.
    pub fn resolve_login(
        &self,
        token: &str,
        now: u64,
        ttl_secs: u64,
    ) -> Result<Option<Admin>, ScorebookError> {
        let txn = self.snapshot()?;
        let record = {
            let table = txn.open_table(LOGINS).map_err(storage_err)?;
            table
                .get(token)
                .map_err(storage_err)?
                .map(|v| decode::<LoginRecord>(v.value()))
                .transpose()?
        };
        match record {
            Some(record) if now.saturating_sub(record.issued_at) <= ttl_secs => {
                read(&txn, record.admin_id)
            }
            _ => Ok(None),
        }
    }

    /// Forget a login token; returns whether it existed.
    pub fn revoke_login(&self, token: &str) -> Result<bool, ScorebookError> {
        self.write(|txn| {
            let mut table = txn.open_table(LOGINS).map_err(storage_err)?;
            let existed = table.remove(token).map_err(storage_err)?.is_some();
            Ok(existed)
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Attach each student's marks (in id order) and their subjects.
///
/// A mark whose subject row is gone is shown with [`Subject::placeholder`].
fn join_students(
    students: Vec<Student>,
    marks: &[Mark],
    subjects: &[Subject],
) -> Vec<StudentWithMarks> {
    let subjects: BTreeMap<u64, &Subject> = subjects.iter().map(|s| (s.id, s)).collect();
    let mut by_student: BTreeMap<u64, Vec<MarkWithSubject>> = BTreeMap::new();
    for mark in marks {
        let subject = subjects
            .get(&mark.subject_id)
            .map(|s| (*s).clone())
            .unwrap_or_else(Subject::placeholder);
        by_student
            .entry(mark.student_id)
            .or_default()
            .push(MarkWithSubject {
                mark: mark.clone(),
                subject,
            });
    }

    students
        .into_iter()
        .map(|student| {
            let marks = by_student.remove(&student.id).unwrap_or_default();
            StudentWithMarks { student, marks }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reopen_preserves_records_and_counters() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("scorebook.redb");

        {
            let repo = Repository::open(&path).unwrap();
            repo.create_session(NewSession {
                name: "2025-26".to_string(),
                is_active: true,
            })
            .unwrap();
        }

        let repo = Repository::open(&path).unwrap();
        assert_eq!(repo.list_sessions().unwrap().len(), 1);
        let next = repo
            .create_session(NewSession {
                name: "2026-27".to_string(),
                is_active: false,
            })
            .unwrap();
        assert_eq!(next.id, 2);
    }

    #[test]
    fn next_id_counts_per_kind_and_never_repeats() {
        let repo = Repository::in_memory().unwrap();
        let ids: Vec<u64> = (0..3)
            .map(|_| repo.next_id(EntityKind::Session).unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(repo.next_id(EntityKind::Class).unwrap(), 1);

        let session = repo
            .create_session(NewSession {
                name: "2025-26".to_string(),
                is_active: true,
            })
            .unwrap();
        assert_eq!(session.id, 4);
        repo.delete_session(session.id).unwrap();
        assert_eq!(repo.next_id(EntityKind::Session).unwrap(), 5);
    }

    #[test]
    fn failed_write_is_rolled_back() {
        let repo = Repository::in_memory().unwrap();
        let err = repo
            .create_class(NewClass {
                name: "10th Grade".to_string(),
                session_id: 99,
            })
            .unwrap_err();
        assert!(matches!(err, ScorebookError::InvalidInput { ref field, .. } if field == "sessionId"));
        assert_eq!(repo.stats().unwrap(), StoreStats::default());
    }

    #[test]
    fn orphaned_mark_joins_placeholder_subject() {
        let student = Student {
            id: 1,
            roll_no: 1,
            name: "Aakash Yadav".to_string(),
            class_id: 1,
            is_paid: true,
        };
        let mark = Mark {
            id: 5,
            student_id: 1,
            subject_id: 42,
            obtained: "54".to_string(),
        };
        let joined = join_students(vec![student], &[mark], &[]);
        assert_eq!(joined[0].marks.len(), 1);
        assert_eq!(joined[0].marks[0].subject, Subject::placeholder());
    }

    #[test]
    fn settings_keep_their_id_on_overwrite() {
        let repo = Repository::in_memory().unwrap();
        assert_eq!(repo.get_setting("schoolName").unwrap(), None);

        let first = repo.set_setting("schoolName", "IIC").unwrap();
        let second = repo.set_setting("schoolName", "IIC Patna").unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(
            repo.get_setting("schoolName").unwrap().as_deref(),
            Some("IIC Patna")
        );
        assert_eq!(repo.list_settings().unwrap().len(), 1);
    }

    #[test]
    fn admin_emails_are_case_insensitive_and_unique() {
        let repo = Repository::in_memory().unwrap();
        let admin = repo
            .create_admin(NewAdmin {
                email: "Head@School.test".to_string(),
                password_hash: "hash".to_string(),
                name: "Head".to_string(),
                is_super_admin: true,
            })
            .unwrap();
        assert_eq!(admin.email, "head@school.test");

        let found = repo.get_admin_by_email("HEAD@school.test").unwrap();
        assert_eq!(found.map(|a| a.id), Some(admin.id));

        let dup = repo.create_admin(NewAdmin {
            email: "head@school.test".to_string(),
            password_hash: "other".to_string(),
            name: "Other".to_string(),
            is_super_admin: false,
        });
        assert!(matches!(dup, Err(ScorebookError::Duplicate(_))));
    }

    #[test]
    fn login_tokens_expire_and_revoke() {
        let repo = Repository::in_memory().unwrap();
        let admin = repo
            .create_admin(NewAdmin {
                email: "a@b.test".to_string(),
                password_hash: "hash".to_string(),
                name: "A".to_string(),
                is_super_admin: false,
            })
            .unwrap();
        assert_eq!(repo.store_login("tok", admin.id, 1_000, 600).unwrap(), 0);

        assert!(repo.resolve_login("tok", 1_500, 600).unwrap().is_some());
        assert!(repo.resolve_login("tok", 1_601, 600).unwrap().is_none());
        assert!(repo.resolve_login("other", 1_500, 600).unwrap().is_none());

        assert!(repo.revoke_login("tok").unwrap());
        assert!(!repo.revoke_login("tok").unwrap());
        assert!(repo.resolve_login("tok", 1_500, 600).unwrap().is_none());
    }

    #[test]
    fn new_login_sweeps_expired_tokens() {
        let repo = Repository::in_memory().unwrap();
        repo.store_login("old", 1, 1_000, 600).unwrap();
        repo.store_login("recent", 1, 1_500, 600).unwrap();

        assert_eq!(repo.store_login("fresh", 1, 1_700, 600).unwrap(), 1);
        assert!(!repo.revoke_login("old").unwrap());
        assert!(repo.revoke_login("recent").unwrap());
        assert!(repo.revoke_login("fresh").unwrap());
    }
}
