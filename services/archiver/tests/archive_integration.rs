//! Integration test for the session archival batch
//!
//! Exercises the full copy-then-delete flow against a real database.

use archiver::archive::SessionArchiver;
use archiver::database::Database;
use chrono::{Duration, Utc};
use common::database::{DatabaseConfig, init_pool};
use sqlx::{PgPool, Row};
use uuid::Uuid;

async fn setup_pool() -> Result<PgPool, Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;
    sqlx::migrate!("../api/migrations").run(&pool).await?;
    Ok(pool)
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_archival_moves_ended_session_and_enrollments(
) -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup_pool().await?;

    // A session that ended last week, with one enrollment
    let user_id: Uuid = sqlx::query(
        "INSERT INTO users (email, password_hash, first_name, last_name)
         VALUES ($1, 'hash', 'Test', 'Parent') RETURNING id",
    )
    .bind(format!("archival-{}@example.com", Uuid::new_v4()))
    .fetch_one(&pool)
    .await?
    .get("id");

    let class_id: Uuid = sqlx::query(
        "INSERT INTO classes (title, capacity) VALUES ('Toddler Music', 10) RETURNING id",
    )
    .fetch_one(&pool)
    .await?
    .get("id");

    let ended_date = (Utc::now() - Duration::days(7)).date_naive();
    let session_id: Uuid = sqlx::query(
        "INSERT INTO class_sessions (class_id, session_date, start_time, end_time, capacity)
         VALUES ($1, $2, '09:00', '10:00', 10) RETURNING id",
    )
    .bind(class_id)
    .bind(ended_date)
    .fetch_one(&pool)
    .await?
    .get("id");

    let enrollment_id: Uuid = sqlx::query(
        "INSERT INTO enrollments (user_id, class_id, session_id)
         VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(user_id)
    .bind(class_id)
    .bind(session_id)
    .fetch_one(&pool)
    .await?
    .get("id");

    let archiver = SessionArchiver::new(Database::new(pool.clone()));
    let outcome = archiver.run().await?;

    assert!(outcome.sessions_archived >= 1);
    assert!(outcome.enrollments_archived >= 1);

    // Historical rows reference the originals
    let historical_session_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM historical_sessions WHERE original_session_id = $1",
    )
    .bind(session_id)
    .fetch_one(&pool)
    .await?;
    assert_eq!(historical_session_count, 1);

    let historical_enrollment_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM historical_enrollments
         WHERE original_enrollment_id = $1 AND original_session_id = $2",
    )
    .bind(enrollment_id)
    .bind(session_id)
    .fetch_one(&pool)
    .await?;
    assert_eq!(historical_enrollment_count, 1);

    // Live rows are gone
    let live_session_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM class_sessions WHERE id = $1")
            .bind(session_id)
            .fetch_one(&pool)
            .await?;
    assert_eq!(live_session_count, 0);

    let live_enrollment_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE id = $1")
            .bind(enrollment_id)
            .fetch_one(&pool)
            .await?;
    assert_eq!(live_enrollment_count, 0);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_future_sessions_are_left_alone() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup_pool().await?;

    let class_id: Uuid = sqlx::query(
        "INSERT INTO classes (title, capacity) VALUES ('Preschool Art', 8) RETURNING id",
    )
    .fetch_one(&pool)
    .await?
    .get("id");

    let future_date = (Utc::now() + Duration::days(30)).date_naive();
    let session_id: Uuid = sqlx::query(
        "INSERT INTO class_sessions (class_id, session_date, start_time, end_time, capacity)
         VALUES ($1, $2, '09:00', '10:00', 8) RETURNING id",
    )
    .bind(class_id)
    .bind(future_date)
    .fetch_one(&pool)
    .await?
    .get("id");

    let archiver = SessionArchiver::new(Database::new(pool.clone()));
    archiver.run().await?;

    let live_session_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM class_sessions WHERE id = $1")
            .bind(session_id)
            .fetch_one(&pool)
            .await?;
    assert_eq!(live_session_count, 1);

    Ok(())
}
