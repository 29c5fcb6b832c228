//! Waitlist entry model and status handling
//!
//! A user holds at most one waitlist slot per class. Positions are assigned
//! sequentially at join time and are not reshuffled when entries leave.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::DomainError;

/// Status of a waitlist entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "waitlist_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WaitlistStatus {
    /// Holding a slot, no decision yet
    Waiting,
    /// Under review
    Pending,
    /// A seat was offered to this user
    Offered,
    /// Admitted from the waitlist
    Approved,
    /// Turned down
    Rejected,
    /// User left the waitlist; row kept for audit
    Cancelled,
}

impl WaitlistStatus {
    /// Returns the string representation used for persistence and API
    /// serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitlistStatus::Waiting => "waiting",
            WaitlistStatus::Pending => "pending",
            WaitlistStatus::Offered => "offered",
            WaitlistStatus::Approved => "approved",
            WaitlistStatus::Rejected => "rejected",
            WaitlistStatus::Cancelled => "cancelled",
        }
    }

    /// Whether this status counts against the waitlist capacity
    pub fn is_active(&self) -> bool {
        !matches!(self, WaitlistStatus::Cancelled | WaitlistStatus::Rejected)
    }

    /// Whether the admin status-update endpoint accepts this status.
    ///
    /// `offered` is set only by the seat-offer flow, never directly.
    pub fn is_updatable(&self) -> bool {
        !matches!(self, WaitlistStatus::Offered)
    }
}

impl FromStr for WaitlistStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(WaitlistStatus::Waiting),
            "pending" => Ok(WaitlistStatus::Pending),
            "offered" => Ok(WaitlistStatus::Offered),
            "approved" => Ok(WaitlistStatus::Approved),
            "rejected" => Ok(WaitlistStatus::Rejected),
            "cancelled" => Ok(WaitlistStatus::Cancelled),
            _ => Err(DomainError::InvalidWaitlistStatus {
                status: s.to_string(),
            }),
        }
    }
}

/// Waitlist entry entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WaitlistEntry {
    pub id: Uuid,
    pub class_id: Uuid,
    pub user_id: Uuid,
    pub position: i32,
    pub status: WaitlistStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin payload for adding a named user to a waitlist
#[derive(Debug, Clone, Deserialize)]
pub struct WaitlistAddRequest {
    pub user_id: Uuid,
}

/// Payload for changing a waitlist entry's status
#[derive(Debug, Clone, Deserialize)]
pub struct WaitlistStatusRequest {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string_round_trip() {
        let statuses = vec![
            WaitlistStatus::Waiting,
            WaitlistStatus::Pending,
            WaitlistStatus::Offered,
            WaitlistStatus::Approved,
            WaitlistStatus::Rejected,
            WaitlistStatus::Cancelled,
        ];

        for status in statuses {
            let s = status.as_str();
            match WaitlistStatus::from_str(s) {
                Ok(parsed) => assert_eq!(status, parsed),
                Err(e) => panic!("Failed to parse status string: {s}: {e}"),
            }
        }
    }

    #[test]
    fn test_invalid_status_string() {
        assert!(WaitlistStatus::from_str("expired").is_err());
        assert!(WaitlistStatus::from_str("").is_err());
        assert!(WaitlistStatus::from_str("WAITING").is_err());
    }

    #[test]
    fn test_active_statuses_count_against_capacity() {
        assert!(WaitlistStatus::Waiting.is_active());
        assert!(WaitlistStatus::Pending.is_active());
        assert!(WaitlistStatus::Offered.is_active());
        assert!(WaitlistStatus::Approved.is_active());
        assert!(!WaitlistStatus::Rejected.is_active());
        assert!(!WaitlistStatus::Cancelled.is_active());
    }

    #[test]
    fn test_offered_is_not_directly_updatable() {
        assert!(!WaitlistStatus::Offered.is_updatable());
        assert!(WaitlistStatus::Waiting.is_updatable());
        assert!(WaitlistStatus::Cancelled.is_updatable());
    }
}
