//! Background scheduler — one claim attempt per tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::service::BriefService;

/// Spawn the background scheduler.
///
/// Each tick runs one claim-and-execute cycle through the service facade,
/// the same path the on-demand trigger uses. Errors in a tick are logged and
/// the loop continues; set the returned flag to stop after the current tick.
pub fn spawn_scheduler(
    service: Arc<BriefService>,
    interval: Duration,
) -> (JoinHandle<()>, Arc<AtomicBool>) {
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = Arc::clone(&shutdown);

    let handle = tokio::spawn(async move {
        info!("Scheduler started — ticking every {}s", interval.as_secs());

        let mut tick = tokio::time::interval(interval);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tick.tick().await; // Skip the immediate first tick

        loop {
            tick.tick().await;

            if shutdown.load(Ordering::Relaxed) {
                info!("Scheduler shutting down");
                return;
            }

            tick_once(&service).await;
        }
    });

    (handle, shutdown_flag)
}

/// Run a single scheduling cycle: claim one pending job and execute it.
pub async fn tick_once(service: &BriefService) {
    match service.claim_and_run().await {
        Ok(Some(id)) => info!(job_id = %id, "Scheduler processed a job"),
        Ok(None) => debug!("No pending jobs"),
        Err(e) => error!(error = %e, "Scheduler tick failed"),
    }
}
