//! Class catalog repository for database operations

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::DomainError;
use crate::models::{Class, ClassSession, ClassStatus, CreateClassRequest, CreateSessionRequest};

/// Map a classes row into a [`Class`]
pub(crate) fn map_class(row: &PgRow) -> Class {
    Class {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        price_cents: row.get("price_cents"),
        location: row.get("location"),
        capacity: row.get("capacity"),
        enrolled_count: row.get("enrolled_count"),
        status: row.get("status"),
        waitlist_enabled: row.get("waitlist_enabled"),
        waitlist_capacity: row.get("waitlist_capacity"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Map a class_sessions row into a [`ClassSession`]
pub(crate) fn map_session(row: &PgRow) -> ClassSession {
    ClassSession {
        id: row.get("id"),
        class_id: row.get("class_id"),
        session_date: row.get("session_date"),
        end_date: row.get("end_date"),
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        capacity: row.get("capacity"),
        enrolled_count: row.get("enrolled_count"),
        min_enrollment: row.get("min_enrollment"),
        instructor_id: row.get("instructor_id"),
        status: row.get("status"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const CLASS_COLUMNS: &str = "id, title, description, price_cents, location, capacity, \
     enrolled_count, status, waitlist_enabled, waitlist_capacity, created_at, updated_at";

const SESSION_COLUMNS: &str = "id, class_id, session_date, end_date, start_time, end_time, \
     capacity, enrolled_count, min_enrollment, instructor_id, status, created_at, updated_at";

/// Class repository for database operations
#[derive(Clone)]
pub struct ClassRepository {
    pool: PgPool,
}

impl ClassRepository {
    /// Create a new class repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new class
    pub async fn create(&self, payload: &CreateClassRequest) -> Result<Class, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO classes (title, description, price_cents, location, capacity,
                                 waitlist_enabled, waitlist_capacity)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {CLASS_COLUMNS}
            "#,
        ))
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.price_cents)
        .bind(&payload.location)
        .bind(payload.capacity)
        .bind(payload.waitlist_enabled)
        .bind(payload.waitlist_capacity)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_class(&row))
    }

    /// Get all classes, optionally filtered by status
    pub async fn get_all(&self, status: Option<ClassStatus>) -> Result<Vec<Class>, DomainError> {
        let rows = match status {
            Some(status) => {
                sqlx::query(&format!(
                    r#"
                    SELECT {CLASS_COLUMNS}
                    FROM classes
                    WHERE status = $1
                    ORDER BY created_at DESC
                    "#,
                ))
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    r#"
                    SELECT {CLASS_COLUMNS}
                    FROM classes
                    ORDER BY created_at DESC
                    "#,
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.iter().map(map_class).collect())
    }

    /// Get a class by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Class>, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {CLASS_COLUMNS}
            FROM classes
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_class))
    }

    /// Create a new session for a class
    pub async fn create_session(
        &self,
        class_id: Uuid,
        payload: &CreateSessionRequest,
    ) -> Result<ClassSession, DomainError> {
        let class_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM classes WHERE id = $1)")
                .bind(class_id)
                .fetch_one(&self.pool)
                .await?;

        if !class_exists {
            return Err(DomainError::ClassNotFound);
        }

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO class_sessions (class_id, session_date, end_date, start_time,
                                        end_time, capacity, min_enrollment, instructor_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {SESSION_COLUMNS}
            "#,
        ))
        .bind(class_id)
        .bind(payload.session_date)
        .bind(payload.end_date)
        .bind(payload.start_time)
        .bind(payload.end_time)
        .bind(payload.capacity)
        .bind(payload.min_enrollment)
        .bind(payload.instructor_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_session(&row))
    }

    /// Get all sessions for a class, soonest first
    pub async fn get_sessions_for_class(
        &self,
        class_id: Uuid,
    ) -> Result<Vec<ClassSession>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM class_sessions
            WHERE class_id = $1
            ORDER BY session_date ASC, start_time ASC
            "#,
        ))
        .bind(class_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_session).collect())
    }
}
