//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API. Field names are
//! camelCase on the wire.
//!
//! Every request body implements [`Validate`]; the [`ValidJson`](super::ValidJson)
//! extractor runs it before a handler sees the value, so handlers only deal
//! with well-formed input. Validation reports the first offending field.

use super::error::ApiError;
use scorebook_core::primitives::{
    DEFAULT_MAX_MARKS, MAX_BULK_MARKS, MAX_NAME_LENGTH, MAX_OBTAINED_LENGTH,
    MAX_SETTING_KEY_LENGTH, MAX_SETTING_VALUE_LENGTH,
};
use scorebook_core::{
    Admin, BulkMarksOutcome, MarkEntry, NewClass, NewSession, NewStudent, NewSubject,
    StudentPatch, SubjectPatch,
};
use serde::{Deserialize, Deserializer, Serialize, de};

// =============================================================================
// VALIDATION
// =============================================================================

/// Checks a decoded request body.
pub trait Validate {
    fn validate(&self) -> Result<(), ApiError>;
}

fn check_name(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(field, format!("{} is required", field)));
    }
    if value.len() > MAX_NAME_LENGTH {
        return Err(ApiError::validation(
            field,
            format!("{} must be at most {} characters", field, MAX_NAME_LENGTH),
        ));
    }
    Ok(())
}

fn check_date(field: &str, value: Option<&str>) -> Result<(), ApiError> {
    match value {
        Some(date) if !is_iso_date(date) => Err(ApiError::validation(
            field,
            format!("{} must be a YYYY-MM-DD date", field),
        )),
        _ => Ok(()),
    }
}

fn check_obtained(field: &str, value: &str) -> Result<(), ApiError> {
    if value.len() > MAX_OBTAINED_LENGTH {
        return Err(ApiError::validation(
            field,
            format!("{} must be at most {} characters", field, MAX_OBTAINED_LENGTH),
        ));
    }
    Ok(())
}

/// `YYYY-MM-DD` with plausible month and day numbers.
pub fn is_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    let digits = [0, 1, 2, 3, 5, 6, 8, 9];
    if !digits.iter().all(|&i| bytes[i].is_ascii_digit()) {
        return false;
    }
    let month: u32 = value[5..7].parse().unwrap_or(0);
    let day: u32 = value[8..10].parse().unwrap_or(0);
    (1..=12).contains(&month) && (1..=31).contains(&day)
}

/// Blank dates mean "not scheduled".
fn normalize_date(date: Option<String>) -> Option<String> {
    date.map(|d| d.trim().to_string()).filter(|d| !d.is_empty())
}

fn default_max_marks() -> u32 {
    DEFAULT_MAX_MARKS
}

fn default_paid() -> bool {
    true
}

// =============================================================================
// LOOSE SCALARS
// =============================================================================

/// A JSON value accepted as either a string or a number.
///
/// Older clients send marks as numbers; stored marks are always text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
}

impl TextOrNumber {
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }

    fn as_text(&self) -> String {
        self.clone().into_text()
    }
}

/// Reference to an existing mark in a bulk entry.
///
/// Clients send numeric ids for saved marks and `"new-…"` placeholders for
/// rows they have not saved yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarkIdRef {
    Id(u64),
    Text(String),
}

impl MarkIdRef {
    /// The stored mark id this refers to, if any.
    pub fn mark_id(&self) -> Option<u64> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

// =============================================================================
// SESSIONS & CLASSES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
}

impl Validate for CreateSessionRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_name("name", &self.name)
    }
}

impl From<CreateSessionRequest> for NewSession {
    fn from(req: CreateSessionRequest) -> Self {
        Self {
            name: req.name.trim().to_string(),
            is_active: req.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassRequest {
    pub name: String,
    pub session_id: u64,
}

impl Validate for CreateClassRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_name("name", &self.name)
    }
}

impl From<CreateClassRequest> for NewClass {
    fn from(req: CreateClassRequest) -> Self {
        Self {
            name: req.name.trim().to_string(),
            session_id: req.session_id,
        }
    }
}

/// `?sessionId=` filter for class listings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassListQuery {
    pub session_id: Option<u64>,
}

// =============================================================================
// STUDENTS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentRequest {
    pub roll_no: i64,
    pub name: String,
    pub class_id: u64,
    #[serde(default = "default_paid")]
    pub is_paid: bool,
}

impl Validate for CreateStudentRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_name("name", &self.name)
    }
}

impl From<CreateStudentRequest> for NewStudent {
    fn from(req: CreateStudentRequest) -> Self {
        Self {
            roll_no: req.roll_no,
            name: req.name.trim().to_string(),
            class_id: req.class_id,
            is_paid: req.is_paid,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub roll_no: Option<i64>,
}

impl Validate for UpdateStudentRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = &self.name {
            check_name("name", name)?;
        }
        Ok(())
    }
}

impl From<UpdateStudentRequest> for StudentPatch {
    fn from(req: UpdateStudentRequest) -> Self {
        Self {
            name: req.name.map(|n| n.trim().to_string()),
            roll_no: req.roll_no,
        }
    }
}

/// `?classId=` filter for student and subject listings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassFilterQuery {
    pub class_id: Option<u64>,
}

// =============================================================================
// SUBJECTS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubjectRequest {
    pub name: String,
    #[serde(default = "default_max_marks")]
    pub max_marks: u32,
    #[serde(default)]
    pub date: Option<String>,
    pub class_id: u64,
}

impl Validate for CreateSubjectRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_name("name", &self.name)?;
        check_date("date", normalize_date(self.date.clone()).as_deref())
    }
}

impl From<CreateSubjectRequest> for NewSubject {
    fn from(req: CreateSubjectRequest) -> Self {
        Self {
            name: req.name.trim().to_string(),
            date: normalize_date(req.date),
            max_marks: req.max_marks,
            class_id: req.class_id,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubjectRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub max_marks: Option<u32>,
    #[serde(default)]
    pub date: Option<String>,
}

impl Validate for UpdateSubjectRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = &self.name {
            check_name("name", name)?;
        }
        check_date("date", normalize_date(self.date.clone()).as_deref())
    }
}

impl From<UpdateSubjectRequest> for SubjectPatch {
    fn from(req: UpdateSubjectRequest) -> Self {
        Self {
            name: req.name.map(|n| n.trim().to_string()),
            max_marks: req.max_marks,
            date: normalize_date(req.date),
        }
    }
}

// =============================================================================
// MARKS
// =============================================================================

/// Set one (student, subject) mark.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleMarkRequest {
    pub student_id: u64,
    pub subject_id: u64,
    pub obtained: TextOrNumber,
}

/// One row of a bulk replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkMarkItem {
    #[serde(default)]
    pub id: Option<MarkIdRef>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub obtained: Option<TextOrNumber>,
    #[serde(alias = "maxMarks", default = "default_max_marks")]
    pub max: u32,
}

impl From<BulkMarkItem> for MarkEntry {
    fn from(item: BulkMarkItem) -> Self {
        Self {
            mark_id: item.id.as_ref().and_then(MarkIdRef::mark_id),
            subject: item.subject.trim().to_string(),
            date: normalize_date(item.date),
            obtained: item.obtained.map(TextOrNumber::into_text).unwrap_or_default(),
            max_marks: item.max,
        }
    }
}

/// Replace a student's complete mark set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkMarksRequest {
    pub student_id: u64,
    pub marks: Vec<BulkMarkItem>,
}

/// Body of `POST /api/marks`: a bulk replacement or a single mark.
///
/// A `marks` key selects the bulk shape.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MarksRequest {
    Bulk(BulkMarksRequest),
    Single(SingleMarkRequest),
}

impl<'de> Deserialize<'de> for MarksRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        if value.get("marks").is_some() {
            serde_json::from_value(value)
                .map(Self::Bulk)
                .map_err(de::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(Self::Single)
                .map_err(de::Error::custom)
        }
    }
}

impl Validate for MarksRequest {
    fn validate(&self) -> Result<(), ApiError> {
        match self {
            Self::Single(single) => check_obtained("obtained", &single.obtained.as_text()),
            Self::Bulk(bulk) => {
                if bulk.marks.len() > MAX_BULK_MARKS {
                    return Err(ApiError::validation(
                        "marks",
                        format!("At most {} marks per request", MAX_BULK_MARKS),
                    ));
                }
                for (i, item) in bulk.marks.iter().enumerate() {
                    check_name(&format!("marks.{}.subject", i), &item.subject)?;
                    let field = format!("marks.{}.obtained", i);
                    let Some(obtained) = &item.obtained else {
                        return Err(ApiError::validation(&field, format!("{} is required", field)));
                    };
                    check_obtained(&field, &obtained.as_text())?;
                    check_date(
                        &format!("marks.{}.date", i),
                        normalize_date(item.date.clone()).as_deref(),
                    )?;
                }
                Ok(())
            }
        }
    }
}

/// Result of a bulk replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkMarksResponse {
    pub message: String,
    #[serde(flatten)]
    pub outcome: BulkMarksOutcome,
}

impl BulkMarksResponse {
    pub fn new(outcome: BulkMarksOutcome) -> Self {
        Self {
            message: "Marks updated".to_string(),
            outcome,
        }
    }
}

// =============================================================================
// SETTINGS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingRequest {
    pub key: String,
    pub value: String,
}

impl Validate for SettingRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.key.trim().is_empty() {
            return Err(ApiError::validation("key", "key is required"));
        }
        if self.key.len() > MAX_SETTING_KEY_LENGTH {
            return Err(ApiError::validation(
                "key",
                format!("key must be at most {} characters", MAX_SETTING_KEY_LENGTH),
            ));
        }
        if self.value.len() > MAX_SETTING_VALUE_LENGTH {
            return Err(ApiError::validation(
                "value",
                format!(
                    "value must be at most {} characters",
                    MAX_SETTING_VALUE_LENGTH
                ),
            ));
        }
        Ok(())
    }
}

/// A single setting value; empty when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingValue {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

// =============================================================================
// AUTH
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.email.trim().is_empty() {
            return Err(ApiError::validation("email", "email is required"));
        }
        if self.password.is_empty() {
            return Err(ApiError::validation("password", "password is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_name("name", &self.name)?;
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') || email.len() > MAX_NAME_LENGTH {
            return Err(ApiError::validation("email", "email must be a valid address"));
        }
        if self.password.is_empty() {
            return Err(ApiError::validation("password", "password is required"));
        }
        Ok(())
    }
}

/// An admin as shown to clients. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub id: u64,
    pub email: String,
    pub name: String,
    pub is_super_admin: bool,
}

impl From<Admin> for AdminProfile {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            email: admin.email,
            name: admin.name,
            is_super_admin: admin.is_super_admin,
        }
    }
}

/// Login result: the profile plus the token also set as a cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub admin: AdminProfile,
    pub token: String,
}

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
