//! Background tasks that keep a manager current
//!
//! - The sync task applies store changes made by other contexts.
//! - The check task refreshes ahead of expiry so most requests never wait on
//!   a token fetch, and retries a fetch that failed transiently.
//!
//! Both run independently of the request path. Abort the returned handles to
//! stop them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::manager::TokenManager;

/// Check credentials this often unless configured otherwise.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Spawn a task applying the store's change notifications to `manager`.
///
/// Subscribes before returning, so no change made after this call is missed.
pub fn spawn_sync_task(manager: Arc<TokenManager>) -> tokio::task::JoinHandle<()> {
    let mut events = manager.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => manager.reconcile(event).await,
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "credential notifications dropped, re-reading store");
                    manager.resync().await;
                }
                Err(RecvError::Closed) => {
                    debug!("credential store closed, sync task exiting");
                    break;
                }
            }
        }
    })
}

/// Spawn a task running [`TokenManager::check`] every `interval`.
///
/// Never checks more often than `interval`, including after failures.
pub fn spawn_check_task(
    manager: Arc<TokenManager>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // Skip the immediate first tick, the credential was just loaded
        ticker.tick().await;

        loop {
            ticker.tick().await;
            manager.check().await;
        }
    })
}
