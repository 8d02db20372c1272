//! Bus that routes page and panel requests straight into a Coordinator
//! running in the same process.

use async_trait::async_trait;
use serde_json::Value;

use super::RuntimeBus;
use crate::coordinator::Coordinator;
use crate::message_handler::handle_message;
use crate::types::errors::{HostError, MessageError};
use crate::types::message::{Message, MessageSender};

pub struct InProcessBus {
    coordinator: Coordinator,
    sender: MessageSender,
}

impl InProcessBus {
    /// `sender` identifies the requesting page; use [`MessageSender::panel`]
    /// for settings panels.
    pub fn new(coordinator: Coordinator, sender: MessageSender) -> Self {
        Self {
            coordinator,
            sender,
        }
    }
}

#[async_trait]
impl RuntimeBus for InProcessBus {
    async fn send(&self, message: Message) -> Result<Value, HostError> {
        handle_message(&self.coordinator, &message, &self.sender)
            .await
            .map_err(|e| match e {
                MessageError::Host(host) => host,
                other => HostError::Other(other.to_string()),
            })
    }
}
