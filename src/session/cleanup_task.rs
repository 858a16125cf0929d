use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, instrument};

use super::service::SessionService;

/// Configuration for the session cleanup task
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// How often expired sessions are swept
    pub cleanup_interval: Duration,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(5 * 60),
        }
    }
}

/// Periodically removes expired sessions from the store. Runs until the task is dropped.
#[instrument(skip(session_service))]
pub async fn start_cleanup_task(session_service: Arc<SessionService>, config: CleanupConfig) {
    info!(
        cleanup_interval_secs = config.cleanup_interval.as_secs(),
        "Starting session cleanup background task"
    );

    let mut cleanup_interval = interval(config.cleanup_interval);

    loop {
        cleanup_interval.tick().await;

        match session_service.cleanup_expired().await {
            Ok(0) => {}
            Ok(removed) => info!(removed = removed, "Expired sessions removed"),
            Err(e) => error!(error = %e, "Session cleanup failed"),
        }
    }
}
