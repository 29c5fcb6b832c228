use crate::database::Database;
use crate::models::ArchiveOutcome;
use anyhow::Result;
use tracing::{error, info};

/// Moves ended sessions and their enrollments into the historical tables.
pub struct SessionArchiver {
    database: Database,
}

impl SessionArchiver {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Archive every ended session.
    ///
    /// A failure on one session is logged and does not stop the run; the
    /// session stays live and will be picked up again next time.
    pub async fn run(&self) -> Result<ArchiveOutcome> {
        let ended = self.database.find_ended_sessions().await?;
        info!("Found {} ended sessions to archive", ended.len());

        let mut outcome = ArchiveOutcome::default();

        for session in ended {
            match self.database.archive_session(session.id).await {
                Ok(enrollments) => {
                    info!(
                        "Archived session {} (dated {}, {} enrollments)",
                        session.id, session.session_date, enrollments
                    );
                    outcome.sessions_archived += 1;
                    outcome.enrollments_archived += enrollments;
                }
                Err(e) => {
                    error!("Failed to archive session {}: {}", session.id, e);
                    outcome.sessions_failed += 1;
                }
            }
        }

        Ok(outcome)
    }
}
