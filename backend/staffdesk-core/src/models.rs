// src/models.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::dates;
use crate::workflow::RequestStatus;

/// Record identifier. The API uses GUID strings for people and integers for
/// some records; both are kept in their wire form so they round-trip, and
/// compare by their textual value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(i64),
    Text(String),
}

impl EntityId {
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            EntityId::Number(n) => Cow::Owned(n.to_string()),
            EntityId::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, EntityId::Text(s) if s.trim().is_empty())
    }
}

impl PartialEq for EntityId {
    fn eq(&self, other: &Self) -> bool {
        self.as_key() == other.as_key()
    }
}

impl Eq for EntityId {}

impl Hash for EntityId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_key().hash(state);
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_key())
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        EntityId::Text(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        EntityId::Text(value)
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        EntityId::Number(value)
    }
}

// --- Auth ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: EntityId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<UserSummary>,
}

// --- Employees ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EntityId,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub salary: Option<Decimal>,
    #[serde(default)]
    pub employee_role_id: Option<i64>,
    #[serde(default)]
    pub boss_id: Option<EntityId>,
    #[serde(default)]
    pub employee_shift_id: Option<i64>,
}

impl Employee {
    /// `firstName lastName` trimmed, falling back to `name`.
    pub fn display_name(&self) -> String {
        let full = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string();
        if full.is_empty() {
            self.name.clone().unwrap_or_default().trim().to_string()
        } else {
            full
        }
    }
}

/// Payload for `AddEmployee` / `UpdateEmployee`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub salary: Decimal,
    pub password: String,
    pub role_id: i64,
    pub boss_id: String,
    pub shift_id: i64,
}

// --- Permissions ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRequest {
    pub id: EntityId,
    #[serde(default)]
    pub requester_id: Option<EntityId>,
    #[serde(default)]
    pub target_employee_id: Option<EntityId>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default, with = "dates::flexible_option")]
    pub begin_date: Option<DateTime<Utc>>,
    #[serde(default, with = "dates::flexible_option")]
    pub end_date: Option<DateTime<Utc>>,
    pub status: RequestStatus,
    #[serde(default, with = "dates::flexible_option")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `RequestToBoss`: the caller asks for leave for themself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionDraft {
    pub reason: String,
    #[serde(with = "dates::flexible")]
    pub begin_date: DateTime<Utc>,
    #[serde(with = "dates::flexible")]
    pub end_date: DateTime<Utc>,
}

/// Body of `CreateForEmployee`: a privileged caller files leave for someone else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnBehalfDraft {
    pub target_employee_id: EntityId,
    pub reason: String,
    #[serde(with = "dates::flexible")]
    pub begin_date: DateTime<Utc>,
    #[serde(with = "dates::flexible")]
    pub end_date: DateTime<Utc>,
}

// --- Vacations ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationRequest {
    pub id: EntityId,
    #[serde(default)]
    pub employee_id: Option<EntityId>,
    #[serde(default, with = "dates::flexible_option")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, with = "dates::flexible_option")]
    pub end_date: Option<DateTime<Utc>>,
    pub status: RequestStatus,
}

impl VacationRequest {
    /// Days covered, `0` when either end is missing.
    pub fn days(&self) -> i64 {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => dates::day_count(start, end),
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationDraft {
    #[serde(with = "dates::flexible")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "dates::flexible")]
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationDecision {
    pub vacation_request_id: EntityId,
    pub status: RequestStatus,
}

// --- Time clock ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntryRequest {
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub employee_id: Option<EntityId>,
    #[serde(default, alias = "logType", alias = "type")]
    pub action: Option<String>,
    #[serde(
        default,
        alias = "timestamp",
        alias = "logTime",
        alias = "createdAt",
        with = "dates::flexible_option"
    )]
    pub logged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[serde(default)]
    pub employee_id: Option<EntityId>,
    #[serde(default, with = "dates::flexible_option")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, alias = "entryTime", with = "dates::flexible_option")]
    pub check_in: Option<DateTime<Utc>>,
    #[serde(default, alias = "exitTime", with = "dates::flexible_option")]
    pub check_out: Option<DateTime<Utc>>,
    #[serde(default, alias = "totalHours")]
    pub hours_worked: Option<f64>,
}
