//! Page URL change detection.
//!
//! Two sources report possible URL changes: a fixed-interval poll of the page
//! location (catches single-page-application navigations that fire no event)
//! and explicit navigation notifications (history and hash events). Both feed
//! one debounced handler, which emits the new URL only when it actually
//! differs from the last one emitted.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

use crate::host::PageHandle;

#[derive(Debug, Clone, Copy)]
pub struct UrlWatcherConfig {
    pub poll_interval: Duration,
    pub debounce: Duration,
}

impl Default for UrlWatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
            debounce: Duration::from_millis(100),
        }
    }
}

/// Handle to the running watcher tasks. Stopping is idempotent; dropping the
/// handle stops the tasks.
pub struct UrlWatcher {
    signal_tx: mpsc::UnboundedSender<()>,
    poller: Option<JoinHandle<()>>,
    debouncer: Option<JoinHandle<()>>,
}

impl UrlWatcher {
    /// Starts watching `page`. Changed URLs arrive on the returned receiver,
    /// which closes once the watcher stops.
    pub fn spawn(
        page: Arc<dyn PageHandle>,
        config: UrlWatcherConfig,
    ) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let (url_tx, url_rx) = mpsc::unbounded_channel();
        let initial = page.current_url();

        let poller = tokio::spawn(poll_location(
            page.clone(),
            initial.clone(),
            config.poll_interval,
            signal_tx.clone(),
        ));
        let debouncer = tokio::spawn(debounce_changes(
            page,
            initial,
            config.debounce,
            signal_rx,
            url_tx,
        ));

        (
            Self {
                signal_tx,
                poller: Some(poller),
                debouncer: Some(debouncer),
            },
            url_rx,
        )
    }

    /// Reports a navigation event (history pop, hash change).
    pub fn notify_navigation(&self) {
        let _ = self.signal_tx.send(());
    }

    pub fn is_running(&self) -> bool {
        self.debouncer.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.poller.take() {
            handle.abort();
        }
        if let Some(handle) = self.debouncer.take() {
            handle.abort();
            debug!("URL watcher stopped");
        }
    }
}

impl Drop for UrlWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_location(
    page: Arc<dyn PageHandle>,
    mut last: String,
    period: Duration,
    signal_tx: mpsc::UnboundedSender<()>,
) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        let current = page.current_url();
        if current != last {
            last = current;
            if signal_tx.send(()).is_err() {
                break;
            }
        }
    }
}

async fn debounce_changes(
    page: Arc<dyn PageHandle>,
    mut last_emitted: String,
    quiet: Duration,
    mut signal_rx: mpsc::UnboundedReceiver<()>,
    url_tx: mpsc::UnboundedSender<String>,
) {
    while signal_rx.recv().await.is_some() {
        // Wait until no further signal arrives for `quiet`.
        loop {
            match time::timeout(quiet, signal_rx.recv()).await {
                Ok(Some(())) => continue,
                Ok(None) => return,
                Err(_) => break,
            }
        }
        let current = page.current_url();
        if current != last_emitted {
            last_emitted = current.clone();
            if url_tx.send(current).is_err() {
                return;
            }
        }
    }
}
