use std::time::Duration;
use tokio::task::JoinHandle;

use crate::{
    error::Result,
    models::session::{Session, SessionStatus},
    repositories::session::{SessionBackend, SharedBackend},
    services::sessions,
};

/// Moves a session to any status. Manual edits follow no transition graph.
pub async fn set_status(
    backend: &dyn SessionBackend,
    id: i64,
    status: SessionStatus,
) -> Result<Session> {
    sessions::update_status(backend, id, status).await
}

/// Returns quota-expired sessions to the pool.
///
/// Safe to run at any time and any number of times; only rows currently in
/// `QuotaExpired` are touched.
pub async fn trigger_scheduled_reset(backend: &dyn SessionBackend) -> Result<u64> {
    let count = sessions::reset_expired_quota(backend).await?;
    tracing::info!("♻️ Reset {} expired quota session(s)", count);
    Ok(count)
}

/// Spawns the in-process reset loop. Failures are logged and the loop keeps going.
pub fn spawn_reset_job(backend: SharedBackend, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            tracing::info!("🧹 Running scheduled reset of expired quota sessions...");
            match trigger_scheduled_reset(backend.as_ref()).await {
                Ok(_) => {
                    tracing::info!("✅ Reset job completed successfully");
                }
                Err(e) => {
                    tracing::error!("❌ Reset job failed: {}", e);
                }
            }
        }
    })
}
