//! Application state shared across handlers

use sqlx::PgPool;

use crate::repositories::{ClassRepository, EnrollmentRepository, WaitlistRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub class_repository: ClassRepository,
    pub enrollment_repository: EnrollmentRepository,
    pub waitlist_repository: WaitlistRepository,
}
