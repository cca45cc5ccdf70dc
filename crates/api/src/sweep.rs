//! Background overdue sweeper.
//!
//! Once a day, every open document past its due date is flagged `overdue`.
//! A failed run is logged and retried at the next tick; there is no
//! per-document retry.

use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;
use tokio::time::interval;
use tracing::{error, info};

use faktura_db::DocumentRepository;

/// Sweep cadence: daily.
const SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Spawns the daily overdue sweep task.
///
/// The first tick fires immediately, so a restart never leaves documents
/// stale for a whole day.
pub fn spawn_overdue_sweeper(db: Arc<DatabaseConnection>) {
    tokio::spawn(async move {
        let repo = DocumentRepository::new((*db).clone());
        let mut ticker = interval(SWEEP_INTERVAL);

        loop {
            ticker.tick().await;

            match repo.sweep_overdue(None).await {
                Ok(transitioned) => {
                    info!(transitioned, "Overdue sweep completed");
                }
                Err(e) => {
                    error!(error = %e, "Overdue sweep failed");
                }
            }
        }
    });
}
