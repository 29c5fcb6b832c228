//! Enrollment repository implementing the admission state machine
//!
//! Every read-then-write sequence here (enroll, approve, cancel) runs inside
//! a single transaction with the relevant rows locked, so the cached
//! enrolled_count on classes and sessions can only move together with the
//! status transition that justifies it.

use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::DomainError;
use crate::models::{Class, ClassSession, Enrollment, EnrollmentStatus, PaymentStatus};
use crate::repositories::classes::{map_class, map_session};
use crate::repositories::map_unique_violation;

const ENROLLMENT_COLUMNS: &str = "id, user_id, class_id, session_id, payment_status, \
     enrollment_status, admin_notes, reviewed_at, reviewed_by, enrolled_at";

const CLASS_COLUMNS: &str = "id, title, description, price_cents, location, capacity, \
     enrolled_count, status, waitlist_enabled, waitlist_capacity, created_at, updated_at";

const SESSION_COLUMNS: &str = "id, class_id, session_date, end_date, start_time, end_time, \
     capacity, enrolled_count, min_enrollment, instructor_id, status, created_at, updated_at";

/// Map an enrollments row into an [`Enrollment`]
fn map_enrollment(row: &PgRow) -> Enrollment {
    Enrollment {
        id: row.get("id"),
        user_id: row.get("user_id"),
        class_id: row.get("class_id"),
        session_id: row.get("session_id"),
        payment_status: row.get("payment_status"),
        enrollment_status: row.get("enrollment_status"),
        admin_notes: row.get("admin_notes"),
        reviewed_at: row.get("reviewed_at"),
        reviewed_by: row.get("reviewed_by"),
        enrolled_at: row.get("enrolled_at"),
    }
}

/// Enrollment repository for database operations
#[derive(Clone)]
pub struct EnrollmentRepository {
    pool: PgPool,
}

impl EnrollmentRepository {
    /// Create a new enrollment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Enroll a user in a class session
    ///
    /// The new enrollment starts out `pending`. The class row is locked for
    /// the duration of the transaction so concurrent enrollments for the
    /// same class serialize; the unique constraint on (class_id, user_id)
    /// backstops the duplicate check.
    ///
    /// Returns the created enrollment together with the class and session it
    /// belongs to, so the caller can compose a confirmation without another
    /// round trip.
    pub async fn enroll(
        &self,
        user_id: Uuid,
        class_id: Uuid,
        session_id: Uuid,
        payment_status: PaymentStatus,
    ) -> Result<(Enrollment, Class, ClassSession), DomainError> {
        let mut tx = self.pool.begin().await?;

        let class_row = sqlx::query(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes WHERE id = $1 FOR UPDATE",
        ))
        .bind(class_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DomainError::ClassNotFound)?;
        let class = map_class(&class_row);

        let session_row = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS} FROM class_sessions WHERE id = $1 AND class_id = $2",
        ))
        .bind(session_id)
        .bind(class_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DomainError::SessionNotFound)?;
        let session = map_session(&session_row);

        if session.session_date <= Utc::now().date_naive() {
            return Err(DomainError::SessionStarted);
        }

        let already_enrolled: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM enrollments WHERE class_id = $1 AND user_id = $2)",
        )
        .bind(class_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_enrolled {
            return Err(DomainError::AlreadyEnrolled);
        }

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO enrollments (user_id, class_id, session_id, payment_status)
            VALUES ($1, $2, $3, $4)
            RETURNING {ENROLLMENT_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(class_id)
        .bind(session_id)
        .bind(payment_status)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            map_unique_violation(
                e,
                "enrollments_class_id_user_id_key",
                DomainError::AlreadyEnrolled,
            )
        })?;

        tx.commit().await?;

        Ok((map_enrollment(&row), class, session))
    }

    /// Approve a pending enrollment
    ///
    /// Stamps the review metadata and increments the enrolled_count of the
    /// owning class and session in the same transaction. Fails with
    /// `EnrollmentNotPending` if the enrollment has already been reviewed,
    /// so a repeated approve cannot double-increment the counters.
    ///
    /// Note: capacity is intentionally NOT checked here; an admin may
    /// approve past capacity.
    pub async fn approve(
        &self,
        enrollment_id: Uuid,
        admin_id: Uuid,
        notes: Option<&str>,
    ) -> Result<Enrollment, DomainError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = $1 FOR UPDATE",
        ))
        .bind(enrollment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DomainError::EnrollmentNotFound)?;
        let enrollment = map_enrollment(&row);

        if enrollment.enrollment_status != EnrollmentStatus::Pending {
            return Err(DomainError::EnrollmentNotPending);
        }

        let row = sqlx::query(&format!(
            r#"
            UPDATE enrollments
            SET enrollment_status = $2, reviewed_at = NOW(), reviewed_by = $3,
                admin_notes = $4
            WHERE id = $1
            RETURNING {ENROLLMENT_COLUMNS}
            "#,
        ))
        .bind(enrollment_id)
        .bind(EnrollmentStatus::Approved)
        .bind(admin_id)
        .bind(notes)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE classes SET enrolled_count = enrolled_count + 1, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(enrollment.class_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE class_sessions SET enrolled_count = enrolled_count + 1, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(enrollment.session_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(map_enrollment(&row))
    }

    /// Reject a pending enrollment
    ///
    /// Same precondition as approve; does not touch any counter.
    pub async fn reject(
        &self,
        enrollment_id: Uuid,
        admin_id: Uuid,
        notes: Option<&str>,
    ) -> Result<Enrollment, DomainError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = $1 FOR UPDATE",
        ))
        .bind(enrollment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DomainError::EnrollmentNotFound)?;
        let enrollment = map_enrollment(&row);

        if enrollment.enrollment_status != EnrollmentStatus::Pending {
            return Err(DomainError::EnrollmentNotPending);
        }

        let row = sqlx::query(&format!(
            r#"
            UPDATE enrollments
            SET enrollment_status = $2, reviewed_at = NOW(), reviewed_by = $3,
                admin_notes = $4
            WHERE id = $1
            RETURNING {ENROLLMENT_COLUMNS}
            "#,
        ))
        .bind(enrollment_id)
        .bind(EnrollmentStatus::Rejected)
        .bind(admin_id)
        .bind(notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(map_enrollment(&row))
    }

    /// Cancel the caller's approved enrollment in a class
    ///
    /// Hard-deletes the row and decrements the counters, floored at zero.
    /// Pending and rejected enrollments cannot be cancelled through this
    /// path.
    pub async fn cancel(&self, user_id: Uuid, class_id: Uuid) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await?;

        let class_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM classes WHERE id = $1)")
                .bind(class_id)
                .fetch_one(&mut *tx)
                .await?;

        if !class_exists {
            return Err(DomainError::ClassNotFound);
        }

        let row = sqlx::query(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments
             WHERE class_id = $1 AND user_id = $2 FOR UPDATE",
        ))
        .bind(class_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DomainError::EnrollmentNotFound)?;
        let enrollment = map_enrollment(&row);

        if enrollment.enrollment_status != EnrollmentStatus::Approved {
            return Err(DomainError::EnrollmentNotApproved);
        }

        sqlx::query("DELETE FROM enrollments WHERE id = $1")
            .bind(enrollment.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE classes
             SET enrolled_count = GREATEST(enrolled_count - 1, 0), updated_at = NOW()
             WHERE id = $1",
        )
        .bind(class_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE class_sessions
             SET enrolled_count = GREATEST(enrolled_count - 1, 0), updated_at = NOW()
             WHERE id = $1",
        )
        .bind(enrollment.session_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Get all enrollments for a user, newest first
    pub async fn get_by_user(&self, user_id: Uuid) -> Result<Vec<Enrollment>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments
             WHERE user_id = $1 ORDER BY enrolled_at DESC",
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_enrollment).collect())
    }

    /// Get all enrollments, newest first
    pub async fn get_all(&self) -> Result<Vec<Enrollment>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments ORDER BY enrolled_at DESC",
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_enrollment).collect())
    }

    /// Get pending enrollments, oldest first (review queue order)
    pub async fn get_pending(&self) -> Result<Vec<Enrollment>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments
             WHERE enrollment_status = $1 ORDER BY enrolled_at ASC",
        ))
        .bind(EnrollmentStatus::Pending)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_enrollment).collect())
    }
}
