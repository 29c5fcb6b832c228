use anyhow::Result;
use std::env;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use common::database::{DatabaseConfig, health_check, init_pool};
use common::error::DatabaseError;

use api::{
    repositories::{ClassRepository, EnrollmentRepository, WaitlistRepository},
    routes,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting enrollment API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Apply pending migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;
    info!("Database migrations applied");

    // Initialize repositories
    let class_repository = ClassRepository::new(pool.clone());
    let enrollment_repository = EnrollmentRepository::new(pool.clone());
    let waitlist_repository = WaitlistRepository::new(pool.clone());

    let app_state = AppState {
        db_pool: pool,
        class_repository,
        enrollment_repository,
        waitlist_repository,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Enrollment API service listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
