use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use archiver::archive::SessionArchiver;
use archiver::database::Database;
use common::database::{DatabaseConfig, health_check, init_pool};

/// One-shot archival run.
///
/// Invoked by an external scheduler (cron); archives every ended session
/// and exits.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_max_level(Level::INFO)
        .init();

    info!("Starting session archival run");

    // Initialize database connection
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let database = Database::new(pool);
    let archiver = SessionArchiver::new(database);

    let outcome = archiver.run().await?;

    info!(
        "Archival run complete: {} sessions and {} enrollments archived, {} failed",
        outcome.sessions_archived, outcome.enrollments_archived, outcome.sessions_failed
    );

    Ok(())
}
