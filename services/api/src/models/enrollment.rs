//! Enrollment model and admission status tracking
//!
//! An enrollment is created `pending` and moves to `approved` or `rejected`
//! through admin review. Cancellation of an approved enrollment deletes the
//! row; there is no cancelled status on enrollments themselves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Admission status of an enrollment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "enrollment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    /// Awaiting admin review
    Pending,
    /// Admitted; counts against the class's enrolled_count
    Approved,
    /// Turned down by an admin
    Rejected,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "pending",
            EnrollmentStatus::Approved => "approved",
            EnrollmentStatus::Rejected => "rejected",
        }
    }
}

/// Payment status carried on the enrollment row
///
/// Payment verification happens outside this service; the value is recorded
/// as reported by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Refunded,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Paid
    }
}

/// Enrollment entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub class_id: Uuid,
    pub session_id: Uuid,
    pub payment_status: PaymentStatus,
    pub enrollment_status: EnrollmentStatus,
    pub admin_notes: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
    pub enrolled_at: DateTime<Utc>,
}

/// Enrollment request payload
#[derive(Debug, Clone, Deserialize)]
pub struct EnrollRequest {
    pub session_id: Uuid,
    #[serde(default)]
    pub payment_status: PaymentStatus,
}

/// Admin review payload for approve/reject
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewRequest {
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(EnrollmentStatus::Pending.as_str(), "pending");
        assert_eq!(EnrollmentStatus::Approved.as_str(), "approved");
        assert_eq!(EnrollmentStatus::Rejected.as_str(), "rejected");
    }

    #[test]
    fn test_payment_status_defaults_to_paid() {
        let request: EnrollRequest =
            serde_json::from_str(r#"{"session_id":"7f2c1a90-5b92-4f4e-a8f3-3a4cc5db2f10"}"#)
                .expect("deserialization failed");
        assert_eq!(request.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn test_payment_status_from_request() {
        let request: EnrollRequest = serde_json::from_str(
            r#"{"session_id":"7f2c1a90-5b92-4f4e-a8f3-3a4cc5db2f10","payment_status":"pending"}"#,
        )
        .expect("deserialization failed");
        assert_eq!(request.payment_status, PaymentStatus::Pending);
    }
}
