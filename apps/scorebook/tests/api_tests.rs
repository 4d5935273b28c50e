//! Integration tests for the Scorebook HTTP API.
//!
//! Uses axum-test to drive the router against an in-memory database without
//! starting a real server.

#![allow(clippy::unwrap_used, clippy::panic, clippy::float_arithmetic)]

use axum::http::{HeaderValue, StatusCode, header};
use axum_test::{TestRequest, TestServer};
use scorebook::api::{
    AdminProfile, AppState, BulkMarksResponse, ErrorBody, HealthResponse, LoginResponse,
    SettingValue, SuccessResponse, create_router, hash_password,
};
use scorebook::config::{AccessPolicy, ServerConfig};
use scorebook_core::{
    Class, ClassResults, ClassWithData, Mark, NewAdmin, Repository, Session, SessionWithClasses,
    Setting, Student, StudentWithMarks, Subject,
};
use serde_json::json;

const ADMIN_EMAIL: &str = "head@school.test";
const ADMIN_PASSWORD: &str = "correct horse battery";

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn test_config(policy: AccessPolicy) -> ServerConfig {
    ServerConfig {
        rate_limit: 0,
        access_policy: policy,
        ..ServerConfig::default()
    }
}

/// A server over a fresh in-memory database holding one admin account.
fn create_test_server_with(policy: AccessPolicy) -> TestServer {
    let repo = Repository::in_memory().unwrap();
    repo.create_admin(NewAdmin {
        email: ADMIN_EMAIL.to_string(),
        password_hash: hash_password(ADMIN_PASSWORD).unwrap(),
        name: "Head Teacher".to_string(),
        is_super_admin: true,
    })
    .unwrap();
    let router = create_router(AppState::new(repo, test_config(policy)));
    TestServer::new(router).unwrap()
}

fn create_test_server() -> TestServer {
    create_test_server_with(AccessPolicy::Strict)
}

async fn login(server: &TestServer) -> String {
    let response = server
        .post("/api/login")
        .json(&json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD}))
        .await;
    response.assert_status_ok();
    response.json::<LoginResponse>().token
}

fn bearer(request: TestRequest, token: &str) -> TestRequest {
    request.add_header(
        header::AUTHORIZATION,
        format!("Bearer {}", token).parse::<HeaderValue>().unwrap(),
    )
}

/// Session + class, returning the class id.
async fn create_class(server: &TestServer, token: &str) -> u64 {
    let session: Session = bearer(server.post("/api/sessions"), token)
        .json(&json!({"name": "2025-26", "isActive": true}))
        .await
        .json();
    let class: Class = bearer(server.post("/api/classes"), token)
        .json(&json!({"name": "10th Grade", "sessionId": session.id}))
        .await
        .json();
    class.id
}

async fn create_student(
    server: &TestServer,
    token: &str,
    class_id: u64,
    roll: i64,
    name: &str,
) -> u64 {
    let response = bearer(server.post("/api/students"), token)
        .json(&json!({"rollNo": roll, "name": name, "classId": class_id}))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Student>().id
}

async fn create_subject(
    server: &TestServer,
    token: &str,
    class_id: u64,
    name: &str,
    max: u32,
) -> u64 {
    let response = bearer(server.post("/api/subjects"), token)
        .json(&json!({"name": name, "maxMarks": max, "classId": class_id}))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Subject>().id
}

async fn get_student(server: &TestServer, id: u64) -> StudentWithMarks {
    let response = server.get(&format!("/api/students/{}", id)).await;
    response.assert_status_ok();
    response.json()
}

// =============================================================================
// HEALTH & AUTH
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_test_server();

    let response = server.get("/api/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_login_sets_cookie_and_returns_profile() {
    let server = create_test_server();

    let response = server
        .post("/api/login")
        .json(&json!({"email": "HEAD@school.test", "password": ADMIN_PASSWORD}))
        .await;

    response.assert_status_ok();
    let cookie = response.header(header::SET_COOKIE);
    let cookie = cookie.to_str().unwrap();
    assert!(cookie.starts_with("scorebook_sid="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));

    let body: LoginResponse = response.json();
    assert_eq!(body.admin.email, ADMIN_EMAIL);
    assert!(body.admin.is_super_admin);
    assert!(cookie.contains(&body.token));
}

#[tokio::test]
async fn test_login_wrong_password_is_unauthorized() {
    let server = create_test_server();

    let response = server
        .post("/api/login")
        .json(&json!({"email": ADMIN_EMAIL, "password": "nope"}))
        .await;

    response.assert_status_unauthorized();
    let body: ErrorBody = response.json();
    assert_eq!(body.message, "Invalid email or password");
}

#[tokio::test]
async fn test_user_endpoint_follows_login_and_logout() {
    let server = create_test_server();

    server.get("/api/user").await.assert_status_unauthorized();

    let token = login(&server).await;
    let response = bearer(server.get("/api/user"), &token).await;
    response.assert_status_ok();
    let profile: AdminProfile = response.json();
    assert_eq!(profile.email, ADMIN_EMAIL);

    bearer(server.post("/api/logout"), &token)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    bearer(server.get("/api/user"), &token)
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn test_cookie_authenticates_requests() {
    let server = create_test_server();
    let token = login(&server).await;

    let response = server
        .get("/api/user")
        .add_header(
            header::COOKIE,
            format!("scorebook_sid={}", token)
                .parse::<HeaderValue>()
                .unwrap(),
        )
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_register_requires_admin_and_rejects_duplicates() {
    let server = create_test_server();
    let request = json!({"name": "Clerk", "email": "clerk@school.test", "password": "pw"});

    server
        .post("/api/register")
        .json(&request)
        .await
        .assert_status_unauthorized();

    let token = login(&server).await;
    let response = bearer(server.post("/api/register"), &token)
        .json(&request)
        .await;
    response.assert_status(StatusCode::CREATED);
    let profile: AdminProfile = response.json();
    assert!(!profile.is_super_admin);

    bearer(server.post("/api/register"), &token)
        .json(&request)
        .await
        .assert_status(StatusCode::CONFLICT);

    server
        .post("/api/login")
        .json(&json!({"email": "clerk@school.test", "password": "pw"}))
        .await
        .assert_status_ok();
}

// =============================================================================
// ACCESS POLICY
// =============================================================================

#[tokio::test]
async fn test_strict_policy_rejects_anonymous_writes() {
    let server = create_test_server();

    let response = server
        .post("/api/sessions")
        .json(&json!({"name": "2025-26"}))
        .await;
    response.assert_status_unauthorized();
    let body: ErrorBody = response.json();
    assert_eq!(body.message, "Unauthorized: Admin access required");

    server
        .post("/api/marks")
        .json(&json!({"studentId": 1, "subjectId": 1, "obtained": "5"}))
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn test_legacy_policy_opens_session_and_class_writes() {
    let server = create_test_server_with(AccessPolicy::Legacy);

    let response = server
        .post("/api/sessions")
        .json(&json!({"name": "2025-26"}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let session: Session = response.json();

    let response = server
        .post("/api/classes")
        .json(&json!({"name": "9th", "sessionId": session.id}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let class: Class = response.json();

    server
        .post("/api/subjects")
        .json(&json!({"name": "Maths", "classId": class.id}))
        .await
        .assert_status(StatusCode::CREATED);

    // Student creation and mark writes stay admin-only.
    server
        .post("/api/students")
        .json(&json!({"rollNo": 1, "name": "Asha", "classId": class.id}))
        .await
        .assert_status_unauthorized();

    server
        .delete(&format!("/api/classes/{}", class.id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

// =============================================================================
// SESSIONS & CLASSES
// =============================================================================

#[tokio::test]
async fn test_session_crud_and_duplicate_name() {
    let server = create_test_server();
    let token = login(&server).await;

    let response = bearer(server.post("/api/sessions"), &token)
        .json(&json!({"name": "2025-26", "isActive": true}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let session: Session = response.json();
    assert!(session.is_active);

    bearer(server.post("/api/sessions"), &token)
        .json(&json!({"name": "2025-26"}))
        .await
        .assert_status(StatusCode::CONFLICT);

    let sessions: Vec<Session> = server.get("/api/sessions").await.json();
    assert_eq!(sessions, vec![session.clone()]);

    let detail: SessionWithClasses = server
        .get(&format!("/api/sessions/{}", session.id))
        .await
        .json();
    assert!(detail.classes.is_empty());

    server
        .get("/api/sessions/999")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_class_requires_existing_session() {
    let server = create_test_server();
    let token = login(&server).await;

    let response = bearer(server.post("/api/classes"), &token)
        .json(&json!({"name": "10th", "sessionId": 42}))
        .await;

    response.assert_status_bad_request();
    let body: ErrorBody = response.json();
    assert_eq!(body.field.as_deref(), Some("sessionId"));
}

#[tokio::test]
async fn test_blank_name_is_validation_error() {
    let server = create_test_server();
    let token = login(&server).await;

    let response = bearer(server.post("/api/sessions"), &token)
        .json(&json!({"name": "   "}))
        .await;

    response.assert_status_bad_request();
    let body: ErrorBody = response.json();
    assert_eq!(body.field.as_deref(), Some("name"));
}

#[tokio::test]
async fn test_mistyped_json_is_bad_request() {
    let server = create_test_server();
    let token = login(&server).await;

    let response = bearer(server.post("/api/sessions"), &token)
        .json(&json!({"name": 2025}))
        .await;

    response.assert_status_bad_request();
    let body: ErrorBody = response.json();
    assert!(body.field.is_none());
}

#[tokio::test]
async fn test_unparsable_path_id_is_json_error() {
    let server = create_test_server();

    let response = server.get("/api/students/abc").await;

    response.assert_status_bad_request();
    let body: ErrorBody = response.json();
    assert!(body.message.contains("abc"));
}

#[tokio::test]
async fn test_malformed_query_filter_is_json_error() {
    let server = create_test_server();

    let response = server.get("/api/classes?sessionId=x").await;

    response.assert_status_bad_request();
    let body: ErrorBody = response.json();
    assert!(!body.message.is_empty());
}

#[tokio::test]
async fn test_missing_record_names_id() {
    let server = create_test_server();

    let response = server.get("/api/subjects/77").await;

    response.assert_status_not_found();
    let body: ErrorBody = response.json();
    assert_eq!(body.message, "Subject not found: 77");
}

#[tokio::test]
async fn test_list_classes_filters_by_session() {
    let server = create_test_server();
    let token = login(&server).await;
    let class_id = create_class(&server, &token).await;

    let other: Session = bearer(server.post("/api/sessions"), &token)
        .json(&json!({"name": "2026-27"}))
        .await
        .json();
    bearer(server.post("/api/classes"), &token)
        .json(&json!({"name": "11th", "sessionId": other.id}))
        .await
        .assert_status(StatusCode::CREATED);

    let all: Vec<Class> = server.get("/api/classes").await.json();
    assert_eq!(all.len(), 2);

    let filtered: Vec<Class> = server
        .get(&format!("/api/classes?sessionId={}", other.id))
        .await
        .json();
    assert_eq!(filtered.len(), 1);
    assert_ne!(filtered[0].id, class_id);
}

// =============================================================================
// PROVISIONING & MARKS
// =============================================================================

#[tokio::test]
async fn test_subject_create_provisions_zero_marks() {
    let server = create_test_server();
    let token = login(&server).await;
    let class_id = create_class(&server, &token).await;
    let a = create_student(&server, &token, class_id, 1, "Asha").await;
    let b = create_student(&server, &token, class_id, 2, "Bilal").await;

    create_subject(&server, &token, class_id, "Maths", 80).await;

    for id in [a, b] {
        let student = get_student(&server, id).await;
        assert_eq!(student.marks.len(), 1);
        assert_eq!(student.marks[0].mark.obtained, "0");
        assert_eq!(student.marks[0].subject.name, "Maths");
    }
}

#[tokio::test]
async fn test_student_create_provisions_zero_marks() {
    let server = create_test_server();
    let token = login(&server).await;
    let class_id = create_class(&server, &token).await;
    create_subject(&server, &token, class_id, "Maths", 80).await;
    create_subject(&server, &token, class_id, "Science", 50).await;

    let id = create_student(&server, &token, class_id, 1, "Asha").await;

    let student = get_student(&server, id).await;
    assert_eq!(student.marks.len(), 2);
    assert!(student.marks.iter().all(|m| m.mark.obtained == "0"));
}

#[tokio::test]
async fn test_single_mark_upsert_keeps_one_row() {
    let server = create_test_server();
    let token = login(&server).await;
    let class_id = create_class(&server, &token).await;
    let student_id = create_student(&server, &token, class_id, 1, "Asha").await;
    let subject_id = create_subject(&server, &token, class_id, "Maths", 80).await;

    let first: Mark = bearer(server.post("/api/marks"), &token)
        .json(&json!({"studentId": student_id, "subjectId": subject_id, "obtained": "40"}))
        .await
        .json();
    let second: Mark = bearer(server.post("/api/marks"), &token)
        .json(&json!({"studentId": student_id, "subjectId": subject_id, "obtained": 54}))
        .await
        .json();

    assert_eq!(first.id, second.id);
    assert_eq!(second.obtained, "54");
    let student = get_student(&server, student_id).await;
    assert_eq!(student.marks.len(), 1);
    assert_eq!(student.marks[0].mark.obtained, "54");
}

#[tokio::test]
async fn test_mark_for_unknown_student_is_validation_error() {
    let server = create_test_server();
    let token = login(&server).await;

    let response = bearer(server.post("/api/marks"), &token)
        .json(&json!({"studentId": 77, "subjectId": 1, "obtained": "5"}))
        .await;

    response.assert_status_bad_request();
    let body: ErrorBody = response.json();
    assert_eq!(body.field.as_deref(), Some("studentId"));
}

#[tokio::test]
async fn test_bulk_marks_replace_the_full_set() {
    let server = create_test_server();
    let token = login(&server).await;
    let class_id = create_class(&server, &token).await;
    let student_id = create_student(&server, &token, class_id, 1, "Asha").await;
    create_subject(&server, &token, class_id, "Maths", 80).await;
    create_subject(&server, &token, class_id, "Science", 80).await;

    let before = get_student(&server, student_id).await;
    let maths = before
        .marks
        .iter()
        .find(|m| m.subject.name == "Maths")
        .unwrap();
    let science_mark_id = before
        .marks
        .iter()
        .find(|m| m.subject.name == "Science")
        .unwrap()
        .mark
        .id;

    let response = bearer(server.post("/api/marks"), &token)
        .json(&json!({
            "studentId": student_id,
            "marks": [
                {"id": maths.mark.id, "subject": "Mathematics", "date": "2026-01-18", "obtained": "54", "max": 80},
                {"id": "new-1", "subject": "English", "obtained": 30, "maxMarks": 50}
            ]
        }))
        .await;

    response.assert_status_ok();
    let body: BulkMarksResponse = response.json();
    assert_eq!(body.message, "Marks updated");
    assert_eq!(body.outcome.upserted.len(), 2);
    assert_eq!(body.outcome.deleted_mark_ids, vec![science_mark_id]);
    assert_eq!(body.outcome.created_subjects.len(), 1);
    assert_eq!(body.outcome.created_subjects[0].name, "English");

    let after = get_student(&server, student_id).await;
    let mut names: Vec<&str> = after.marks.iter().map(|m| m.subject.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["English", "Mathematics"]);

    let renamed: Subject = server
        .get(&format!("/api/subjects/{}", maths.subject.id))
        .await
        .json();
    assert_eq!(renamed.name, "Mathematics");
    assert_eq!(renamed.date.as_deref(), Some("2026-01-18"));
}

#[tokio::test]
async fn test_bulk_marks_rejects_bad_date() {
    let server = create_test_server();
    let token = login(&server).await;

    let response = bearer(server.post("/api/marks"), &token)
        .json(&json!({
            "studentId": 1,
            "marks": [{"subject": "Maths", "date": "18/01/2026", "obtained": "5"}]
        }))
        .await;

    response.assert_status_bad_request();
    let body: ErrorBody = response.json();
    assert_eq!(body.field.as_deref(), Some("marks.0.date"));
}

#[tokio::test]
async fn test_bulk_marks_entry_without_subject_names_field() {
    let server = create_test_server();
    let token = login(&server).await;
    let class_id = create_class(&server, &token).await;
    let student_id = create_student(&server, &token, class_id, 1, "Asha").await;

    let response = bearer(server.post("/api/marks"), &token)
        .json(&json!({
            "studentId": student_id,
            "marks": [
                {"subject": "Maths", "obtained": "40", "max": 80},
                {"obtained": "12"}
            ]
        }))
        .await;

    response.assert_status_bad_request();
    let body: ErrorBody = response.json();
    assert_eq!(body.field.as_deref(), Some("marks.1.subject"));
    assert_eq!(body.message, "marks.1.subject is required");
    assert!(get_student(&server, student_id).await.marks.is_empty());
}

#[tokio::test]
async fn test_delete_mark_is_idempotent() {
    let server = create_test_server();
    let token = login(&server).await;
    let class_id = create_class(&server, &token).await;
    let student_id = create_student(&server, &token, class_id, 1, "Asha").await;
    create_subject(&server, &token, class_id, "Maths", 80).await;
    let mark_id = get_student(&server, student_id).await.marks[0].mark.id;

    for _ in 0..2 {
        bearer(server.delete(&format!("/api/marks/{}", mark_id)), &token)
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }
    assert!(get_student(&server, student_id).await.marks.is_empty());
}

// =============================================================================
// CASCADES
// =============================================================================

#[tokio::test]
async fn test_class_delete_cascades() {
    let server = create_test_server();
    let token = login(&server).await;
    let class_id = create_class(&server, &token).await;
    let student_id = create_student(&server, &token, class_id, 1, "Asha").await;
    let subject_id = create_subject(&server, &token, class_id, "Maths", 80).await;

    bearer(server.delete(&format!("/api/classes/{}", class_id)), &token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .get(&format!("/api/classes/{}", class_id))
        .await
        .assert_status_not_found();
    server
        .get(&format!("/api/students/{}", student_id))
        .await
        .assert_status_not_found();
    server
        .get(&format!("/api/subjects/{}", subject_id))
        .await
        .assert_status_not_found();
    let students: Vec<StudentWithMarks> = server.get("/api/students").await.json();
    assert!(students.is_empty());
}

#[tokio::test]
async fn test_session_delete_cascades() {
    let server = create_test_server();
    let token = login(&server).await;
    let class_id = create_class(&server, &token).await;
    create_student(&server, &token, class_id, 1, "Asha").await;
    create_subject(&server, &token, class_id, "Maths", 80).await;

    let sessions: Vec<Session> = server.get("/api/sessions").await.json();
    bearer(
        server.delete(&format!("/api/sessions/{}", sessions[0].id)),
        &token,
    )
    .await
    .assert_status(StatusCode::NO_CONTENT);

    let classes: Vec<Class> = server.get("/api/classes").await.json();
    let subjects: Vec<Subject> = server.get("/api/subjects").await.json();
    let students: Vec<StudentWithMarks> = server.get("/api/students").await.json();
    assert!(classes.is_empty());
    assert!(subjects.is_empty());
    assert!(students.is_empty());
}

#[tokio::test]
async fn test_subject_delete_removes_its_marks() {
    let server = create_test_server();
    let token = login(&server).await;
    let class_id = create_class(&server, &token).await;
    let student_id = create_student(&server, &token, class_id, 1, "Asha").await;
    let maths = create_subject(&server, &token, class_id, "Maths", 80).await;
    create_subject(&server, &token, class_id, "Science", 80).await;

    bearer(server.delete(&format!("/api/subjects/{}", maths)), &token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let student = get_student(&server, student_id).await;
    assert_eq!(student.marks.len(), 1);
    assert_eq!(student.marks[0].subject.name, "Science");
}

#[tokio::test]
async fn test_delete_absent_student_is_no_content() {
    let server = create_test_server();
    let token = login(&server).await;

    bearer(server.delete("/api/students/404"), &token)
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

// =============================================================================
// STUDENTS & SUBJECTS
// =============================================================================

#[tokio::test]
async fn test_patch_student_and_subject() {
    let server = create_test_server();
    let token = login(&server).await;
    let class_id = create_class(&server, &token).await;
    let student_id = create_student(&server, &token, class_id, 1, "Asha").await;
    let subject_id = create_subject(&server, &token, class_id, "Maths", 80).await;

    let student: Student = bearer(server.patch(&format!("/api/students/{}", student_id)), &token)
        .json(&json!({"rollNo": 12}))
        .await
        .json();
    assert_eq!(student.roll_no, 12);
    assert_eq!(student.name, "Asha");

    let subject: Subject = bearer(server.patch(&format!("/api/subjects/{}", subject_id)), &token)
        .json(&json!({"maxMarks": 100, "date": "2026-03-01"}))
        .await
        .json();
    assert_eq!(subject.max_marks, 100);
    assert_eq!(subject.date.as_deref(), Some("2026-03-01"));

    bearer(server.patch("/api/students/999"), &token)
        .json(&json!({"name": "Ghost"}))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_list_students_by_class() {
    let server = create_test_server();
    let token = login(&server).await;
    let class_id = create_class(&server, &token).await;
    create_student(&server, &token, class_id, 2, "Bilal").await;
    create_student(&server, &token, class_id, 1, "Asha").await;

    let students: Vec<StudentWithMarks> = server
        .get(&format!("/api/students?classId={}", class_id))
        .await
        .json();
    assert_eq!(students.len(), 2);

    let none: Vec<StudentWithMarks> = server.get("/api/students?classId=999").await.json();
    assert!(none.is_empty());
}

// =============================================================================
// RESULTS
// =============================================================================

#[tokio::test]
async fn test_class_results_ranks_students() {
    let server = create_test_server();
    let token = login(&server).await;
    let class_id = create_class(&server, &token).await;
    let asha = create_student(&server, &token, class_id, 1, "Asha").await;
    let bilal = create_student(&server, &token, class_id, 2, "Bilal").await;
    let maths = create_subject(&server, &token, class_id, "Maths", 80).await;
    create_subject(&server, &token, class_id, "Science", 80).await;

    for (student, obtained) in [(asha, "54"), (bilal, "70")] {
        bearer(server.post("/api/marks"), &token)
            .json(&json!({"studentId": student, "subjectId": maths, "obtained": obtained}))
            .await
            .assert_status_ok();
    }

    let response = server.get(&format!("/api/classes/{}/results", class_id)).await;
    response.assert_status_ok();
    let results: ClassResults = response.json();

    assert_eq!(results.columns.len(), 2);
    assert_eq!(results.rows[0].name, "Bilal");
    assert_eq!(results.rows[0].rank, 1);
    assert_eq!(results.rows[1].name, "Asha");
    assert_eq!(results.rows[1].totals.max, 160);
    assert!((results.rows[1].totals.percentage - 33.75).abs() < 1e-9);
    assert!(results.rows[1].passed);
    assert_eq!(results.summary.student_count, 2);
    assert_eq!(results.summary.top_performer.as_deref(), Some("Bilal"));

    server
        .get("/api/classes/999/results")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_class_detail_includes_students_and_subjects() {
    let server = create_test_server();
    let token = login(&server).await;
    let class_id = create_class(&server, &token).await;
    create_student(&server, &token, class_id, 1, "Asha").await;
    create_subject(&server, &token, class_id, "Maths", 80).await;

    let data: ClassWithData = server
        .get(&format!("/api/classes/{}", class_id))
        .await
        .json();
    assert_eq!(data.students.len(), 1);
    assert_eq!(data.subjects.len(), 1);
    assert_eq!(data.students[0].marks.len(), 1);
}

// =============================================================================
// SETTINGS
// =============================================================================

#[tokio::test]
async fn test_settings_roundtrip() {
    let server = create_test_server();
    let token = login(&server).await;

    let unset: SettingValue = server.get("/api/settings/school_name").await.json();
    assert_eq!(unset.value, "");

    let response = bearer(server.post("/api/settings"), &token)
        .json(&json!({"key": "school_name", "value": "IIC"}))
        .await;
    response.assert_status_ok();
    assert!(response.json::<SuccessResponse>().success);

    bearer(server.post("/api/settings"), &token)
        .json(&json!({"key": "school_name", "value": "IIC Academy"}))
        .await
        .assert_status_ok();

    let value: SettingValue = server.get("/api/settings/school_name").await.json();
    assert_eq!(value.value, "IIC Academy");
    let all: Vec<Setting> = server.get("/api/settings").await.json();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_settings_write_requires_admin() {
    let server = create_test_server();

    server
        .post("/api/settings")
        .json(&json!({"key": "k", "value": "v"}))
        .await
        .assert_status_unauthorized();
}
