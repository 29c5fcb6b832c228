//! Enrollment notifications
//!
//! The email provider is disabled in this deployment; composed messages are
//! logged so the delivery path can be reinstated without touching callers.

use tracing::info;
use uuid::Uuid;

use crate::models::{Class, ClassSession};

/// Log a best-effort enrollment confirmation
///
/// Class and session details are passed in explicitly by the caller. A
/// notification that cannot be delivered never affects the enrollment
/// itself.
pub fn send_enrollment_confirmation(user_id: Uuid, class: &Class, session: &ClassSession) {
    info!(
        "Enrollment confirmation for user {}: \"{}\" on {} at {} (email delivery disabled)",
        user_id, class.title, session.session_date, session.start_time
    );
}
