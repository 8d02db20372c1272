//! Best-effort delivery of coordinator messages to page overlays.
//!
//! Every send produces an explicit [`Delivery`]; callers decide what to do
//! with failures. Nothing is retried.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::host::HostPlatform;
use crate::types::errors::HostError;
use crate::types::message::Message;
use crate::types::tab::TabId;

/// Outcome of one send to one tab.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Delivered(Value),
    Failed(HostError),
    TimedOut,
}

impl Delivery {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Delivery::Delivered(_))
    }
}

/// Sends `message` to the overlay in `tab_id`, giving up after `timeout`.
pub async fn deliver(
    host: &dyn HostPlatform,
    tab_id: TabId,
    message: &Message,
    timeout: Duration,
) -> Delivery {
    match tokio::time::timeout(timeout, host.send_to_tab(tab_id, message)).await {
        Ok(Ok(reply)) => Delivery::Delivered(reply),
        Ok(Err(e)) => {
            debug!(tab_id, kind = message.kind(), error = %e, "Message not delivered");
            Delivery::Failed(e)
        }
        Err(_) => {
            debug!(tab_id, kind = message.kind(), "Message delivery timed out");
            Delivery::TimedOut
        }
    }
}
