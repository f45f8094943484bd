use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::queue::OfflineQueue;
use crate::transport::Delivery;

/// Spawn the background flush task.
///
/// Flushes once at startup if already online, then on every wake-up that
/// finds the API online. `watch` coalesces updates, so an offline blip that
/// starts and ends during a flush only shows up as one more `true`; flushing
/// on it is what picks up records saved offline during the blip. The task
/// ends when the sending side of `online` is dropped; await the returned
/// handle to observe that.
pub fn spawn_sync_worker<D>(
    queue: Arc<OfflineQueue<D>>,
    mut online: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    D: Delivery + 'static,
{
    tokio::spawn(async move {
        let mut was_online = false;

        loop {
            let is_online = *online.borrow_and_update();

            if is_online {
                match queue.flush().await {
                    Ok(report) if report.attempted > 0 => {
                        info!(
                            synced = report.synced,
                            remaining = report.remaining,
                            "Synced offline expenses"
                        );
                    }
                    Ok(_) => {}
                    Err(e) => error!(error = %e, "Failed to persist queue during flush"),
                }
            } else if was_online {
                info!("Offline; new expenses will be saved locally");
            }
            was_online = is_online;

            if online.changed().await.is_err() {
                break;
            }
        }

        info!("Sync worker stopped");
    })
}
