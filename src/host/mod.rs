//! Host platform seam.
//!
//! Everything the browser provides (tab enumeration and mutation, messaging
//! between pages and the coordinator, context menus, storage) is reached only
//! through the traits in this module.

use async_trait::async_trait;
use serde_json::Value;

use crate::types::context_menu::MenuEntry;
use crate::types::errors::{HostError, StorageError};
use crate::types::message::Message;
use crate::types::tab::{HostTab, TabId, WindowId};

pub mod bus;
pub mod file_store;
pub mod memory;
pub mod stdio;

/// Tab, messaging and menu operations of the host platform.
#[async_trait]
pub trait HostPlatform: Send + Sync {
    async fn get_tab(&self, tab_id: TabId) -> Result<HostTab, HostError>;
    /// All tabs of one window, in host order.
    async fn query_window(&self, window_id: WindowId) -> Result<Vec<HostTab>, HostError>;
    /// All tabs of all windows.
    async fn query_all(&self) -> Result<Vec<HostTab>, HostError>;
    /// The active tab of the focused window, if any.
    async fn active_tab(&self) -> Result<Option<HostTab>, HostError>;
    /// Replaces the tab's location. Destructive; no new tab is created.
    async fn update_tab_url(&self, tab_id: TabId, url: &str) -> Result<(), HostError>;
    /// Delivers a message to the overlay injected in the tab.
    async fn send_to_tab(&self, tab_id: TabId, message: &Message) -> Result<Value, HostError>;
    /// Replaces all context-menu entries owned by the extension.
    async fn register_menus(&self, entries: &[MenuEntry]) -> Result<(), HostError>;
    async fn open_options_page(&self) -> Result<(), HostError>;
}

/// Key-value storage. One instance persists across restarts, another lives
/// only for the browser session.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;
    fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Channel from an overlay or settings panel to the coordinator.
#[async_trait]
pub trait RuntimeBus: Send + Sync {
    async fn send(&self, message: Message) -> Result<Value, HostError>;
}

/// Size of the browser window relative to the page viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub outer_width: f64,
    pub inner_width: f64,
}

/// The page an overlay is injected into.
pub trait PageHandle: Send + Sync {
    fn current_url(&self) -> String;
    fn navigate(&self, url: &str) -> Result<(), HostError>;
    fn history_back(&self);
    fn history_forward(&self);
    fn reload(&self);
    fn viewport(&self) -> Viewport;
}
