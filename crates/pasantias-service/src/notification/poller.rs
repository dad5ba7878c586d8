//! Background poller keeping the notification store current.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use pasantias_core::events::LifecycleEvent;

use super::store::NotificationStore;

/// Polls the unread count on a fixed interval and forwards lifecycle
/// events to the store. Runs until its token is cancelled.
#[derive(Debug)]
pub struct NotificationPoller {
    store: Arc<NotificationStore>,
    interval: Duration,
    events: Option<broadcast::Receiver<LifecycleEvent>>,
    cancel: CancellationToken,
}

impl NotificationPoller {
    /// Create a poller. `cancel` is usually a child of the session token.
    pub fn new(store: Arc<NotificationStore>, interval: Duration, cancel: CancellationToken) -> Self {
        Self {
            store,
            interval,
            events: None,
            cancel,
        }
    }

    /// Also react to lifecycle events from the orchestrators.
    pub fn with_events(mut self, events: broadcast::Receiver<LifecycleEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Run the poller on the current runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Main loop. Returns once the token is cancelled or the session is
    /// no longer authenticated.
    pub async fn run(mut self) {
        info!(interval_secs = self.interval.as_secs(), "Notification poller started");

        if let Err(e) = self.store.refresh().await {
            if e.is_auth() {
                warn!(error = %e, "Notification poller stopping: not authenticated");
                return;
            }
            warn!(error = %e, "Initial notification refresh failed");
        }

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {
                    match self.store.sync_unread_count().await {
                        Ok(refreshed) => debug!(refreshed, "Unread count polled"),
                        Err(e) if e.is_auth() => {
                            warn!(error = %e, "Notification poller stopping: not authenticated");
                            break;
                        }
                        Err(e) => warn!(error = %e, "Unread count poll failed"),
                    }
                }
                received = next_event(&mut self.events) => match received {
                    Ok(event) => {
                        if let Err(e) = self.store.handle_event(&event).await {
                            warn!(error = %e, "Failed to sync notifications after lifecycle event");
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Lifecycle events lagged, refreshing feed");
                        if let Err(e) = self.store.refresh().await {
                            warn!(error = %e, "Notification refresh failed");
                        }
                    }
                    Err(RecvError::Closed) => {
                        debug!("Lifecycle event channel closed");
                        self.events = None;
                    }
                },
            }
        }

        info!("Notification poller stopped");
    }
}

/// Next lifecycle event, or never when no receiver is attached.
async fn next_event(
    events: &mut Option<broadcast::Receiver<LifecycleEvent>>,
) -> Result<LifecycleEvent, RecvError> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
