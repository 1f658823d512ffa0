//! Data models for the fraud report console.
//!
//! This module contains the wire structures exchanged with the reports API
//! and the dashboard statistics produced by the aggregator.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Report status, as stored in `status_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Waiting for an administrator
    Pending,
    /// Confirmed as fraud
    Accepted,
    /// Dismissed
    Rejected,
}

impl Status {
    pub const fn id(self) -> i64 {
        match self {
            Status::Pending => 1,
            Status::Accepted => 2,
            Status::Rejected => 3,
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(Status::Pending),
            2 => Some(Status::Accepted),
            3 => Some(Status::Rejected),
            _ => None,
        }
    }

    /// Whether an administrator has already resolved the report.
    pub fn is_resolved(self) -> bool {
        matches!(self, Status::Accepted | Status::Rejected)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&status_label(self.id()))
    }
}

const CATEGORY_NAMES: [&str; 10] = [
    "Sitio Web Bancario Falso",
    "Aplicación Bancaria Falsa",
    "Phishing por Email",
    "Estafa Telefónica",
    "SMS Fraudulento",
    "Fraude en Redes Sociales",
    "Sitio de Compras Falso",
    "Estafa de Inversión",
    "Fraude Presencial",
    "Clonación de Tarjetas",
];

const STATUS_NAMES: [&str; 3] = ["Pendiente", "Aceptado", "Rechazado"];

fn lookup(table: &[&'static str], id: i64) -> Option<&'static str> {
    usize::try_from(id)
        .ok()
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| table.get(i).copied())
}

/// Display name for a category id, with a generic fallback for unknown ids.
pub fn category_label(id: i64) -> std::borrow::Cow<'static, str> {
    match lookup(&CATEGORY_NAMES, id) {
        Some(name) => name.into(),
        None => format!("Categoría {}", id).into(),
    }
}

/// Display name for a status id, with a generic fallback for unknown ids.
pub fn status_label(id: i64) -> std::borrow::Cow<'static, str> {
    match lookup(&STATUS_NAMES, id) {
        Some(name) => name.into(),
        None => format!("Estado {}", id).into(),
    }
}

/// A user-submitted fraud report as returned by the API.
///
/// Decoding is lenient: a `null` text or id field decodes to its default and
/// flags accept `0`/`1`, so one odd row never rejects a whole listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub incident_date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub evidence_url: Option<String>,
    /// Administrator in charge. `None` and `Some(0)` both mean unassigned.
    #[serde(default)]
    pub assigned_admin_id: Option<i64>,
    #[serde(default, deserialize_with = "flag")]
    pub is_anonymous: bool,
    /// ISO-8601 creation timestamp. Kept raw so malformed values survive decoding.
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
}

/// Decodes `null` as the type's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Boolean columns may arrive as `true`/`false` or as `0`/`1`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(value)) => value,
        Some(Flag::Int(value)) => value != 0,
        None => false,
    })
}

impl Report {
    pub fn status(&self) -> Option<Status> {
        Status::from_id(self.status_id)
    }

    /// Returns the assigned admin, treating `0` as unassigned.
    pub fn assigned_admin(&self) -> Option<i64> {
        self.assigned_admin_id.filter(|id| *id != 0)
    }
}

/// A comment attached to a report by an administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportComment {
    pub id: i64,
    pub report_id: i64,
    pub admin_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_name: Option<String>,
    pub comment: String,
    #[serde(default, deserialize_with = "flag")]
    pub is_internal: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Body for `POST /reports/{id}/comments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub comment: String,
    #[serde(default)]
    pub is_internal: bool,
}

/// Body for `PUT /reports/admin/{id}`. Only fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateReportRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_admin_id: Option<i64>,
}

impl UpdateReportRequest {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One page of a client-side paginated listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

/// Urgency chosen by the user when asking for help.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpPriority {
    Urgent,
    Normal,
    Low,
}

impl HelpPriority {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "urgent" => Some(Self::Urgent),
            "normal" => Some(Self::Normal),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    /// Queue position weight; higher is served first.
    pub fn rank(self) -> u8 {
        match self {
            Self::Urgent => 3,
            Self::Normal => 2,
            Self::Low => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Urgent => "Urgente",
            Self::Normal => "Normal",
            Self::Low => "Baja",
        }
    }
}

/// Lifecycle of a help request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HelpStatus {
    Pending,
    InProgress,
    Resolved,
    Closed,
}

impl HelpStatus {
    pub const ALL: [HelpStatus; 4] = [
        HelpStatus::Pending,
        HelpStatus::InProgress,
        HelpStatus::Resolved,
        HelpStatus::Closed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pendiente",
            Self::InProgress => "En Progreso",
            Self::Resolved => "Resuelto",
            Self::Closed => "Cerrado",
        }
    }
}

impl FromStr for HelpStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown help request status '{}' (expected pending, in_progress, resolved or closed)",
                    raw
                )
            })
    }
}

impl fmt::Display for HelpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request for assistance sent by a user to the administrators.
///
/// `priority` and `status` are kept raw; use the typed accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelpRequest {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_response: Option<String>,
    #[serde(default)]
    pub assigned_admin_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_admin_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
}

impl HelpRequest {
    pub fn priority(&self) -> Option<HelpPriority> {
        HelpPriority::parse(&self.priority)
    }

    pub fn status(&self) -> Option<HelpStatus> {
        self.status.parse().ok()
    }

    /// Display name for the status; unknown values are shown as-is.
    pub fn status_label(&self) -> &str {
        match self.status() {
            Some(status) => status.label(),
            None => &self.status,
        }
    }

    /// Returns the assigned admin, treating `0` as unassigned.
    pub fn assigned_admin(&self) -> Option<i64> {
        self.assigned_admin_id.filter(|id| *id != 0)
    }

    /// Only unclaimed pending requests can be taken.
    pub fn can_assign(&self) -> bool {
        self.status() == Some(HelpStatus::Pending) && self.assigned_admin().is_none()
    }

    pub fn can_respond(&self) -> bool {
        matches!(
            self.status(),
            Some(HelpStatus::Pending) | Some(HelpStatus::InProgress)
        )
    }
}

/// Body for `PATCH /help-requests/{id}/respond`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RespondHelpRequest {
    pub admin_response: String,
    pub status: HelpStatus,
}

// Dashboard statistics. Field names are consumed by chart components and
// must stay exactly as serialized here.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekCount {
    pub week: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthCount {
    pub month: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTime {
    pub status: String,
    pub avg_days: i64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminWorkload {
    pub admin_name: String,
    pub count: usize,
    pub resolved: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptancePoint {
    pub period: String,
    pub accepted: usize,
    pub rejected: usize,
    pub acceptance_rate: i64,
    pub rejection_rate: i64,
}

/// All dashboard views computed from one report list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub reports_by_type: Vec<TypeCount>,
    pub reports_by_status: Vec<StatusCount>,
    pub reports_by_week: Vec<WeekCount>,
    pub reports_by_month: Vec<MonthCount>,
    pub response_time: Vec<ResponseTime>,
    pub reports_by_admin: Vec<AdminWorkload>,
    pub acceptance_trend: Vec<AcceptancePoint>,
    pub total_reports: usize,
}
