//! # API Endpoint Handlers
//!
//! This module implements the resource handlers. Reads are public; writes
//! take a [`RequireAdmin`] or [`PolicyGate`] extractor.
//!
//! Deletes are idempotent: deleting an absent id still answers 204, and the
//! cascade report (possibly empty) is logged.

use super::AppState;
use super::error::ApiError;
use super::extract::{ApiPath, ApiQuery, PolicyGate, RequireAdmin, ValidJson};
use super::types::{
    BulkMarksResponse, ClassFilterQuery, ClassListQuery, CreateClassRequest, CreateSessionRequest,
    CreateStudentRequest, CreateSubjectRequest, HealthResponse, MarksRequest,
    SettingRequest, SettingValue, SuccessResponse, UpdateStudentRequest, UpdateSubjectRequest,
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use scorebook_core::{
    CascadeReport, Class, ClassResults, ClassWithData, EntityKind, MarkEntry, Session,
    SessionWithClasses, Setting, Student, StudentWithMarks, Subject, class_results,
};

fn missing(kind: EntityKind, id: u64) -> ApiError {
    ApiError::not_found(format!("{} not found: {}", kind, id))
}

fn log_cascade(kind: EntityKind, id: u64, report: &CascadeReport) {
    if report.is_empty() {
        tracing::debug!(event = "cascade_delete", entity = %kind, id, "Nothing to delete");
        return;
    }
    tracing::info!(
        event = "cascade_delete",
        entity = %kind,
        id,
        sessions = report.sessions,
        classes = report.classes,
        students = report.students,
        subjects = report.subjects,
        marks = report.marks,
        "Deleted {} rows",
        report.total()
    );
}

// =============================================================================
// HEALTH
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// SESSIONS
// =============================================================================

pub async fn list_sessions_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Session>>, ApiError> {
    Ok(Json(state.repo.list_sessions()?))
}

pub async fn get_session_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<SessionWithClasses>, ApiError> {
    state
        .repo
        .get_session_with_classes(id)?
        .map(Json)
        .ok_or_else(|| missing(EntityKind::Session, id))
}

pub async fn create_session_handler(
    State(state): State<AppState>,
    _gate: PolicyGate,
    ValidJson(request): ValidJson<CreateSessionRequest>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let session = state.repo.create_session(request.into())?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn delete_session_handler(
    State(state): State<AppState>,
    _gate: PolicyGate,
    ApiPath(id): ApiPath<u64>,
) -> Result<StatusCode, ApiError> {
    let report = state.repo.delete_session(id)?;
    log_cascade(EntityKind::Session, id, &report);
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// CLASSES
// =============================================================================

pub async fn list_classes_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ClassListQuery>,
) -> Result<Json<Vec<Class>>, ApiError> {
    Ok(Json(state.repo.list_classes(query.session_id)?))
}

pub async fn get_class_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<ClassWithData>, ApiError> {
    state
        .repo
        .get_class_with_data(id)?
        .map(Json)
        .ok_or_else(|| missing(EntityKind::Class, id))
}

/// Leaderboard of one class.
pub async fn class_results_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<ClassResults>, ApiError> {
    let data = state
        .repo
        .get_class_with_data(id)?
        .ok_or_else(|| missing(EntityKind::Class, id))?;
    Ok(Json(class_results(&data)))
}

pub async fn create_class_handler(
    State(state): State<AppState>,
    _gate: PolicyGate,
    ValidJson(request): ValidJson<CreateClassRequest>,
) -> Result<(StatusCode, Json<Class>), ApiError> {
    let class = state.repo.create_class(request.into())?;
    Ok((StatusCode::CREATED, Json(class)))
}

pub async fn delete_class_handler(
    State(state): State<AppState>,
    _gate: PolicyGate,
    ApiPath(id): ApiPath<u64>,
) -> Result<StatusCode, ApiError> {
    let report = state.repo.delete_class(id)?;
    log_cascade(EntityKind::Class, id, &report);
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// STUDENTS
// =============================================================================

pub async fn list_students_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ClassFilterQuery>,
) -> Result<Json<Vec<StudentWithMarks>>, ApiError> {
    let students = match query.class_id {
        Some(class_id) => state.repo.list_students_in_class(class_id)?,
        None => state.repo.list_students()?,
    };
    Ok(Json(students))
}

pub async fn get_student_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<StudentWithMarks>, ApiError> {
    state
        .repo
        .get_student(id)?
        .map(Json)
        .ok_or_else(|| missing(EntityKind::Student, id))
}

pub async fn create_student_handler(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidJson(request): ValidJson<CreateStudentRequest>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    let student = state.repo.create_student(request.into())?;
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn update_student_handler(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<u64>,
    ValidJson(request): ValidJson<UpdateStudentRequest>,
) -> Result<Json<Student>, ApiError> {
    Ok(Json(state.repo.update_student(id, request.into())?))
}

pub async fn delete_student_handler(
    State(state): State<AppState>,
    _gate: PolicyGate,
    ApiPath(id): ApiPath<u64>,
) -> Result<StatusCode, ApiError> {
    let report = state.repo.delete_student(id)?;
    log_cascade(EntityKind::Student, id, &report);
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// SUBJECTS
// =============================================================================

pub async fn list_subjects_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ClassFilterQuery>,
) -> Result<Json<Vec<Subject>>, ApiError> {
    Ok(Json(state.repo.list_subjects(query.class_id)?))
}

pub async fn get_subject_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<Subject>, ApiError> {
    state
        .repo
        .get_subject(id)?
        .map(Json)
        .ok_or_else(|| missing(EntityKind::Subject, id))
}

pub async fn create_subject_handler(
    State(state): State<AppState>,
    _gate: PolicyGate,
    ValidJson(request): ValidJson<CreateSubjectRequest>,
) -> Result<(StatusCode, Json<Subject>), ApiError> {
    let subject = state.repo.create_subject(request.into())?;
    Ok((StatusCode::CREATED, Json(subject)))
}

pub async fn update_subject_handler(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<u64>,
    ValidJson(request): ValidJson<UpdateSubjectRequest>,
) -> Result<Json<Subject>, ApiError> {
    Ok(Json(state.repo.update_subject(id, request.into())?))
}

pub async fn delete_subject_handler(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<u64>,
) -> Result<StatusCode, ApiError> {
    let report = state.repo.delete_subject(id)?;
    log_cascade(EntityKind::Subject, id, &report);
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// MARKS
// =============================================================================

/// Set one mark, or replace a student's whole mark set.
pub async fn marks_handler(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidJson(request): ValidJson<MarksRequest>,
) -> Result<Response, ApiError> {
    match request {
        MarksRequest::Single(single) => {
            let mark = state.repo.update_mark(
                single.student_id,
                single.subject_id,
                &single.obtained.into_text(),
            )?;
            Ok(Json(mark).into_response())
        }
        MarksRequest::Bulk(bulk) => {
            let entries: Vec<MarkEntry> = bulk.marks.into_iter().map(MarkEntry::from).collect();
            let outcome = state.repo.replace_student_marks(bulk.student_id, &entries)?;
            tracing::info!(
                event = "marks_replaced",
                student_id = bulk.student_id,
                upserted = outcome.upserted.len(),
                deleted = outcome.deleted_mark_ids.len(),
                created_subjects = outcome.created_subjects.len(),
                "Replaced student marks"
            );
            Ok(Json(BulkMarksResponse::new(outcome)).into_response())
        }
    }
}

pub async fn delete_mark_handler(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<u64>,
) -> Result<StatusCode, ApiError> {
    let existed = state.repo.delete_mark(id)?;
    tracing::info!(event = "mark_deleted", id, existed, "Deleted mark");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// SETTINGS
// =============================================================================

pub async fn list_settings_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Setting>>, ApiError> {
    Ok(Json(state.repo.list_settings()?))
}

/// A setting's value, or `""` when it was never set.
pub async fn get_setting_handler(
    State(state): State<AppState>,
    ApiPath(key): ApiPath<String>,
) -> Result<Json<SettingValue>, ApiError> {
    let value = state.repo.get_setting(&key)?.unwrap_or_default();
    Ok(Json(SettingValue { value }))
}

pub async fn set_setting_handler(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidJson(request): ValidJson<SettingRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .repo
        .set_setting(request.key.trim(), &request.value)?;
    Ok(Json(SuccessResponse { success: true }))
}
