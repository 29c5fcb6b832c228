use crate::models::EndedSession;
use anyhow::Result;
use sqlx::{PgPool, Row, types::Uuid};

const ARCHIVED_REASON_ENDED: &str = "session ended";

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find live sessions whose end date (or session date, when no end date
    /// is set) has passed. Cancelled sessions are left alone.
    pub async fn find_ended_sessions(&self) -> Result<Vec<EndedSession>> {
        let rows = sqlx::query(
            "SELECT id, class_id, session_date, end_date
             FROM class_sessions
             WHERE COALESCE(end_date, session_date) < CURRENT_DATE
               AND status <> 'cancelled'
             ORDER BY session_date ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let sessions = rows
            .into_iter()
            .map(|row| EndedSession {
                id: row.get("id"),
                class_id: row.get("class_id"),
                session_date: row.get("session_date"),
                end_date: row.get("end_date"),
            })
            .collect();

        Ok(sessions)
    }

    /// Archive one session and its enrollments.
    ///
    /// Copies the session into historical_sessions and each of its
    /// enrollments into historical_enrollments with back-references to the
    /// original ids, then deletes the live rows, all in one transaction. A
    /// session is therefore either fully live or fully archived.
    ///
    /// Returns the number of enrollments archived.
    pub async fn archive_session(&self, session_id: Uuid) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO historical_sessions
                 (original_session_id, class_id, session_date, end_date, start_time,
                  end_time, capacity, enrolled_count, min_enrollment, instructor_id,
                  status, archived_reason)
             SELECT id, class_id, session_date, end_date, start_time,
                    end_time, capacity, enrolled_count, min_enrollment, instructor_id,
                    status, $2
             FROM class_sessions
             WHERE id = $1",
        )
        .bind(session_id)
        .bind(ARCHIVED_REASON_ENDED)
        .execute(&mut *tx)
        .await?;

        let enrollments = sqlx::query(
            "INSERT INTO historical_enrollments
                 (original_enrollment_id, original_session_id, user_id, class_id,
                  payment_status, enrollment_status, admin_notes, reviewed_at,
                  reviewed_by, enrolled_at)
             SELECT id, session_id, user_id, class_id,
                    payment_status, enrollment_status, admin_notes, reviewed_at,
                    reviewed_by, enrolled_at
             FROM enrollments
             WHERE session_id = $1",
        )
        .bind(session_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM enrollments WHERE session_id = $1")
            .bind(session_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM class_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(enrollments.rows_affected())
    }
}
