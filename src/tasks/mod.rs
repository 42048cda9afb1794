//! Recurring background jobs. Call `spawn_all` once during startup.

use crate::services::AuthService;
use std::time::Duration;

const PURGE_INTERVAL: Duration = Duration::from_secs(3600);

/// Detaches every background loop with `tokio::spawn`; does not block.
pub fn spawn_all(auth_service: AuthService) {
    // spent magic-link tokens and stale rate-limit attempts, hourly
    tokio::spawn(async move {
        loop {
            match auth_service.purge_expired().await {
                Ok(n) if n > 0 => log::info!("Purged magic link rows: {n}"),
                Ok(_) => {}
                Err(e) => log::error!("Failed to purge magic link rows: {e:?}"),
            }
            tokio::time::sleep(PURGE_INTERVAL).await;
        }
    });
}
