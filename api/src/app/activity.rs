//! Activity log helper shared by the services

use crate::domain::entities::NewActivity;
use crate::domain::ports::ActivityRepository;

/// Append to the activity log. A failed write is logged and otherwise ignored.
pub async fn record_activity<A: ActivityRepository + ?Sized>(repo: &A, activity: NewActivity) {
    if let Err(e) = repo.record(&activity).await {
        tracing::warn!(
            action = %activity.action,
            error = %e,
            "Failed to record activity"
        );
    }
}
