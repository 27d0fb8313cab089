//! Expiry worker for finished deployment records

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info};

use crate::store::JobStore;

/// Sweeper worker options
#[derive(Debug, Clone)]
pub struct Options {
    /// Sweep interval
    pub interval: Duration,

    /// How long terminal jobs are kept after their last update
    pub retention: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            retention: Duration::from_secs(3600),
        }
    }
}

/// Run the sweeper worker
pub async fn run<S, F>(
    options: &Options,
    store: Arc<dyn JobStore>,
    sleep_fn: S,
    mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) where
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    info!("Sweeper worker starting...");

    loop {
        tokio::select! {
            _ = &mut shutdown_signal => {
                info!("Sweeper worker shutting down...");
                return;
            }
            _ = sleep_fn(options.interval) => {}
        }

        let evicted = store.evict_expired(Utc::now(), options.retention);
        debug!("Sweep removed {} records, {} remain", evicted, store.len());
    }
}
