//! Class and class session models

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Catalog lifecycle status of a class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "class_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ClassStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

/// Lifecycle status of a single scheduled session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "session_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Scheduled,
    Completed,
    Cancelled,
}

/// Class entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Class {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i32,
    pub location: Option<String>,
    pub capacity: i32,
    pub enrolled_count: i32,
    pub status: ClassStatus,
    pub waitlist_enabled: bool,
    pub waitlist_capacity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Class session entity
///
/// A session is a concrete scheduled occurrence of a class; `end_date` is
/// set for multi-day sessions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClassSession {
    pub id: Uuid,
    pub class_id: Uuid,
    pub session_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub capacity: i32,
    pub enrolled_count: i32,
    pub min_enrollment: i32,
    pub instructor_id: Option<Uuid>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New class creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClassRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub price_cents: i32,
    pub location: Option<String>,
    pub capacity: i32,
    #[serde(default)]
    pub waitlist_enabled: bool,
    #[serde(default)]
    pub waitlist_capacity: i32,
}

/// New class session creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionRequest {
    pub session_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub capacity: i32,
    #[serde(default)]
    pub min_enrollment: i32,
    pub instructor_id: Option<Uuid>,
}

/// Class detail including its scheduled sessions
#[derive(Debug, Clone, Serialize)]
pub struct ClassDetailResponse {
    #[serde(flatten)]
    pub class: Class,
    pub sessions: Vec<ClassSession>,
}
