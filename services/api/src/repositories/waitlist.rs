//! Waitlist repository for database operations
//!
//! Capacity and position reads run with the class row locked, so two
//! concurrent joins cannot both pass the capacity check or claim the same
//! position.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::DomainError;
use crate::models::{WaitlistEntry, WaitlistStatus};
use crate::repositories::map_unique_violation;

const WAITLIST_COLUMNS: &str =
    "id, class_id, user_id, position, status, created_at, updated_at";

/// Map a class_waitlist row into a [`WaitlistEntry`]
fn map_entry(row: &PgRow) -> WaitlistEntry {
    WaitlistEntry {
        id: row.get("id"),
        class_id: row.get("class_id"),
        user_id: row.get("user_id"),
        position: row.get("position"),
        status: row.get("status"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Waitlist repository for database operations
#[derive(Clone)]
pub struct WaitlistRepository {
    pool: PgPool,
}

impl WaitlistRepository {
    /// Create a new waitlist repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Check whether a user exists
    pub async fn user_exists(&self, user_id: Uuid) -> Result<bool, DomainError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// Add a user to a class's waitlist
    ///
    /// Fails when waitlisting is disabled for the class, when the active
    /// entries have reached waitlist_capacity (a capacity of zero or less
    /// means no cap), or when the user already holds a slot. The position is
    /// the next integer after the current maximum for the class.
    pub async fn join(
        &self,
        class_id: Uuid,
        user_id: Uuid,
    ) -> Result<WaitlistEntry, DomainError> {
        let mut tx = self.pool.begin().await?;

        let class_row = sqlx::query(
            "SELECT waitlist_enabled, waitlist_capacity FROM classes WHERE id = $1 FOR UPDATE",
        )
        .bind(class_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DomainError::ClassNotFound)?;

        let waitlist_enabled: bool = class_row.get("waitlist_enabled");
        let waitlist_capacity: i32 = class_row.get("waitlist_capacity");

        if !waitlist_enabled {
            return Err(DomainError::WaitlistNotEnabled);
        }

        let active_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM class_waitlist
             WHERE class_id = $1 AND status NOT IN ($2, $3)",
        )
        .bind(class_id)
        .bind(WaitlistStatus::Cancelled)
        .bind(WaitlistStatus::Rejected)
        .fetch_one(&mut *tx)
        .await?;

        if waitlist_capacity > 0 && active_count >= i64::from(waitlist_capacity) {
            return Err(DomainError::WaitlistFull);
        }

        let position: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(position), 0) + 1 FROM class_waitlist WHERE class_id = $1",
        )
        .bind(class_id)
        .fetch_one(&mut *tx)
        .await?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO class_waitlist (class_id, user_id, position)
            VALUES ($1, $2, $3)
            RETURNING {WAITLIST_COLUMNS}
            "#,
        ))
        .bind(class_id)
        .bind(user_id)
        .bind(position)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            map_unique_violation(
                e,
                "class_waitlist_class_id_user_id_key",
                DomainError::AlreadyOnWaitlist,
            )
        })?;

        tx.commit().await?;

        Ok(map_entry(&row))
    }

    /// Change a waitlist entry's status
    pub async fn update_status(
        &self,
        class_id: Uuid,
        waitlist_id: Uuid,
        status: WaitlistStatus,
    ) -> Result<WaitlistEntry, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE class_waitlist
            SET status = $3, updated_at = NOW()
            WHERE id = $2 AND class_id = $1
            RETURNING {WAITLIST_COLUMNS}
            "#,
        ))
        .bind(class_id)
        .bind(waitlist_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DomainError::WaitlistEntryNotFound)?;

        Ok(map_entry(&row))
    }

    /// Mark the caller's waitlist entry as cancelled
    ///
    /// The row is kept for audit; its position is not reassigned.
    pub async fn leave(&self, class_id: Uuid, user_id: Uuid) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE class_waitlist
             SET status = $3, updated_at = NOW()
             WHERE class_id = $1 AND user_id = $2 AND status != $3",
        )
        .bind(class_id)
        .bind(user_id)
        .bind(WaitlistStatus::Cancelled)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::WaitlistEntryNotFound);
        }

        Ok(())
    }

    /// Remove a waitlist entry entirely (admin)
    pub async fn remove(&self, class_id: Uuid, waitlist_id: Uuid) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM class_waitlist WHERE id = $2 AND class_id = $1")
            .bind(class_id)
            .bind(waitlist_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::WaitlistEntryNotFound);
        }

        Ok(())
    }

    /// Get the waitlist for a class, ordered by position
    pub async fn get_for_class(&self, class_id: Uuid) -> Result<Vec<WaitlistEntry>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {WAITLIST_COLUMNS} FROM class_waitlist
             WHERE class_id = $1 ORDER BY position ASC",
        ))
        .bind(class_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_entry).collect())
    }
}
