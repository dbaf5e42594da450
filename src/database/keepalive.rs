use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error};

use crate::database::store::Store;

/// Probe the store every `every` in the background.
///
/// A failed probe is logged and the loop carries on; it never stops the
/// process or the pool. The first probe runs one full interval after start.
pub fn spawn_keepalive(store: Arc<dyn Store>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval() yields immediately; startup already probed
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match store.ping().await {
                Ok(()) => debug!("Database keep-alive probe ok"),
                Err(e) => error!("Database keep-alive probe failed: {}", e),
            }
        }
    })
}
