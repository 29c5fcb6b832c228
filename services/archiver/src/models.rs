use chrono::NaiveDate;
use sqlx::types::Uuid;

/// A live session whose date range has passed
#[derive(Debug, Clone)]
pub struct EndedSession {
    pub id: Uuid,
    pub class_id: Uuid,
    pub session_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Counters reported at the end of an archival run
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveOutcome {
    pub sessions_archived: u64,
    pub enrollments_archived: u64,
    pub sessions_failed: u64,
}
