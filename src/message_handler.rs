//! Bus message handler for the Coordinator.
//!
//! The `handle_message` function dispatches requests coming from overlays and
//! settings panels to the Coordinator and builds the JSON reply.

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::coordinator::Coordinator;
use crate::types::errors::MessageError;
use crate::types::message::{Ack, Message, MessageSender, TabStateReply};

/// Dispatch a bus message to the Coordinator.
///
/// Returns the reply value, or an error for message kinds the Coordinator
/// does not handle and for failed settings writes.
pub async fn handle_message(
    coordinator: &Coordinator,
    message: &Message,
    sender: &MessageSender,
) -> Result<Value, MessageError> {
    let sender_tab_id = sender.tab.as_ref().and_then(|t| t.id);
    match message {
        Message::GetSettings => Ok(json!(coordinator.get_settings())),
        Message::SaveSettings { settings } => {
            let saved = coordinator.save_settings(settings)?;
            let deliveries = coordinator.broadcast_settings(&saved).await;
            debug!(
                tabs = deliveries.len(),
                delivered = deliveries.iter().filter(|(_, d)| d.is_delivered()).count(),
                "Settings broadcast"
            );
            Ok(json!(Ack::OK))
        }
        Message::ToggleAllTabs => {
            coordinator.toggle_all_tabs().await;
            Ok(json!(Ack::OK))
        }
        Message::OpenInOtherTab { url } => {
            match sender_tab_id {
                Some(tab_id) if !url.is_empty() => {
                    coordinator.open_in_other_tab(tab_id, url).await;
                }
                Some(_) => debug!("Ignoring open-in-other-tab without URL"),
                None => debug!("Ignoring open-in-other-tab without sender tab"),
            }
            Ok(json!(Ack::OK))
        }
        Message::CheckTabState => {
            let enabled = sender_tab_id
                .map(|id| coordinator.is_tab_enabled(id))
                .unwrap_or(false);
            Ok(json!(TabStateReply { enabled }))
        }
        other => Err(MessageError::Unhandled(other.kind())),
    }
}

/// Parses a raw bus message and dispatches it.
pub async fn handle_raw(
    coordinator: &Coordinator,
    raw: &Value,
    sender: &MessageSender,
) -> Result<Value, MessageError> {
    let message: Message = serde_json::from_value(raw.clone()).map_err(|e| {
        warn!(error = %e, "Rejected bus message");
        MessageError::InvalidPayload(e.to_string())
    })?;
    handle_message(coordinator, &message, sender).await
}
