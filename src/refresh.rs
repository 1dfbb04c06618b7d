//! Background refresh of the top stories
//!
//! Re-runs the aggregation on a fixed interval in a tokio task and reports
//! each result over a channel, so a long-running front end (watch mode) can
//! redraw without blocking on the feed. Each cycle also purges expired cache
//! entries so the stores do not grow without bound.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::aggregate::TopStories;
use crate::data::Item;

/// Messages sent from background refresh to the front end
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshMessage {
    /// Refresh started
    RefreshStarted,
    /// Fresh top stories, best effort (may be empty)
    StoriesUpdated(Vec<Item>),
    /// Refresh completed
    RefreshCompleted,
}

/// Configuration for the refresh loop
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Time between refresh cycles
    pub interval: Duration,
    /// Whether auto-refresh is enabled
    pub enabled: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60), // matches the id list TTL
            enabled: true,
        }
    }
}

/// Handle for controlling the background refresh system
pub struct RefreshHandle {
    /// Channel for receiving refresh messages
    pub receiver: mpsc::Receiver<RefreshMessage>,
    /// Flag to signal shutdown
    shutdown_tx: mpsc::Sender<()>,
    /// The refresh task, if one was started
    task: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    /// Creates a new RefreshHandle and spawns the background refresh task
    ///
    /// The first cycle runs immediately; later ones follow `config.interval`.
    ///
    /// # Arguments
    /// * `stories` - The aggregator to poll
    /// * `config` - Configuration for the refresh interval
    pub fn spawn(stories: Arc<TopStories>, config: RefreshConfig) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel(32);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let task = config.enabled.then(|| {
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(config.interval);
                interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            if msg_tx.send(RefreshMessage::RefreshStarted).await.is_err() {
                                break;
                            }

                            let items = stories.top_items().await;
                            let purged = stories.purge_expired();
                            debug!(items = items.len(), purged, "refresh cycle finished");

                            if msg_tx.send(RefreshMessage::StoriesUpdated(items)).await.is_err()
                                || msg_tx.send(RefreshMessage::RefreshCompleted).await.is_err()
                            {
                                break;
                            }
                        }
                        _ = shutdown_rx.recv() => {
                            break;
                        }
                    }
                }
            })
        });

        Self {
            receiver: msg_rx,
            shutdown_tx,
            task,
        }
    }

    /// Waits for the next message; `None` once the refresh task has stopped
    pub async fn recv(&mut self) -> Option<RefreshMessage> {
        self.receiver.recv().await
    }

    /// Shuts down the background refresh task and waits for it to exit
    ///
    /// A cycle already in progress runs to completion first.
    pub async fn shutdown(self) {
        let RefreshHandle {
            receiver,
            shutdown_tx,
            task,
        } = self;

        // Unblocks a task waiting on a full channel
        drop(receiver);
        let _ = shutdown_tx.send(()).await;

        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "refresh task ended abnormally");
            }
        }
    }
}

/// Checks for pending refresh messages without blocking
///
/// # Returns
/// * `Some(RefreshMessage)` if a message was available
/// * `None` if no messages are pending
pub fn try_recv(handle: &mut RefreshHandle) -> Option<RefreshMessage> {
    handle.receiver.try_recv().ok()
}
