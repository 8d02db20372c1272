use thiserror::Error;

use super::tab::TabId;

/// Text the host attaches to failures once the extension was reloaded
/// underneath a still-injected page.
pub const CONTEXT_INVALIDATED_SIGNATURE: &str = "Extension context invalidated";

// === HostError ===

/// Failures reported by the host platform's tab, messaging and menu APIs.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HostError {
    /// Tab with the given ID does not exist (anymore).
    #[error("Tab not found: {0}")]
    TabNotFound(TabId),
    /// The tab could not be resolved to a window.
    #[error("Tab has no window: {0}")]
    NoWindow(TabId),
    /// The host refused the operation.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    /// No listener on the receiving end (page not loaded, restricted page).
    #[error("Receiving end does not exist: tab {0}")]
    NoReceiver(TabId),
    /// The messaging channel closed before a reply arrived.
    #[error("Channel closed: {0}")]
    ChannelClosed(String),
    /// The extension was reloaded or updated while a page still runs old code.
    #[error("Extension context invalidated")]
    ContextInvalidated,
    /// A host call did not answer in time.
    #[error("Host call timed out: {0}")]
    Timeout(String),
    #[error("Host error: {0}")]
    Other(String),
}

impl HostError {
    /// Builds a host error from free-form text, recognizing the
    /// context-invalidated signature.
    pub fn from_message(msg: &str) -> Self {
        if msg.contains(CONTEXT_INVALIDATED_SIGNATURE) {
            HostError::ContextInvalidated
        } else {
            HostError::Other(msg.to_string())
        }
    }

    pub fn is_context_invalidated(&self) -> bool {
        match self {
            HostError::ContextInvalidated => true,
            HostError::Other(msg) | HostError::ChannelClosed(msg) => {
                msg.contains(CONTEXT_INVALIDATED_SIGNATURE)
            }
            _ => false,
        }
    }
}

// === StorageError ===

/// Errors from the persistent or volatile key-value stores.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred while reading or writing the backing file.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The stored document could not be (de)serialized.
    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The backing store is unavailable (lock poisoned, host storage gone).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    Serialization(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

// === MessageError ===

/// Errors produced while handling a bus message.
#[derive(Debug, Error)]
pub enum MessageError {
    /// The receiver does not handle this message kind.
    #[error("Unhandled message: {0}")]
    Unhandled(&'static str),
    /// The message could not be parsed.
    #[error("Invalid message payload: {0}")]
    InvalidPayload(String),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Host(#[from] HostError),
}
