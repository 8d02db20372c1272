//! In-process host implementations.
//!
//! `MemoryHost` keeps a tab layout in memory and records every mutation and
//! delivered message, which makes coordinator behavior observable without a
//! browser. `MemoryStore` is the volatile session store. `MemoryPage` stands in
//! for the page an overlay is injected into.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{HostPlatform, KeyValueStore, PageHandle, Viewport};
use crate::types::context_menu::MenuEntry;
use crate::types::errors::{HostError, StorageError};
use crate::types::message::Message;
use crate::types::tab::{HostTab, TabId, WindowId};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ─── MemoryHost ───

#[derive(Default)]
struct HostState {
    tabs: Vec<HostTab>,
    next_id: TabId,
    focused_window: Option<WindowId>,
    unreachable: HashSet<TabId>,
    locked: HashSet<TabId>,
    updates: Vec<(TabId, String)>,
    sent: Vec<(TabId, Message)>,
    menus: Vec<MenuEntry>,
    options_opened: usize,
}

/// Host platform simulated in memory.
#[derive(Default)]
pub struct MemoryHost {
    state: Mutex<HostState>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tab at `index` in `window_id` and returns its id.
    pub fn add_tab(&self, window_id: WindowId, index: i64, url: &str) -> TabId {
        let mut state = lock(&self.state);
        state.next_id += 1;
        let id = state.next_id;
        state.tabs.push(HostTab {
            id: Some(id),
            window_id: Some(window_id),
            index,
            url: Some(url.to_string()),
            active: false,
        });
        if state.focused_window.is_none() {
            state.focused_window = Some(window_id);
        }
        id
    }

    /// Marks a tab active and focuses its window.
    pub fn activate(&self, tab_id: TabId) {
        let mut state = lock(&self.state);
        let window = state
            .tabs
            .iter()
            .find(|t| t.id == Some(tab_id))
            .and_then(|t| t.window_id);
        for tab in state.tabs.iter_mut() {
            if tab.window_id == window {
                tab.active = tab.id == Some(tab_id);
            }
        }
        state.focused_window = window;
    }

    pub fn close_tab(&self, tab_id: TabId) {
        lock(&self.state).tabs.retain(|t| t.id != Some(tab_id));
    }

    /// Messages sent to this tab fail as if no overlay were listening.
    pub fn make_unreachable(&self, tab_id: TabId) {
        lock(&self.state).unreachable.insert(tab_id);
    }

    /// Location updates on this tab fail with a permission error.
    pub fn lock_tab(&self, tab_id: TabId) {
        lock(&self.state).locked.insert(tab_id);
    }

    pub fn tab(&self, tab_id: TabId) -> Option<HostTab> {
        lock(&self.state)
            .tabs
            .iter()
            .find(|t| t.id == Some(tab_id))
            .cloned()
    }

    /// Successful location replacements, in order.
    pub fn updates(&self) -> Vec<(TabId, String)> {
        lock(&self.state).updates.clone()
    }

    /// Successfully delivered messages, in order.
    pub fn sent_messages(&self) -> Vec<(TabId, Message)> {
        lock(&self.state).sent.clone()
    }

    pub fn clear_sent_messages(&self) {
        lock(&self.state).sent.clear();
    }

    pub fn menus(&self) -> Vec<MenuEntry> {
        lock(&self.state).menus.clone()
    }

    pub fn options_opened(&self) -> usize {
        lock(&self.state).options_opened
    }
}

#[async_trait]
impl HostPlatform for MemoryHost {
    async fn get_tab(&self, tab_id: TabId) -> Result<HostTab, HostError> {
        self.tab(tab_id).ok_or(HostError::TabNotFound(tab_id))
    }

    async fn query_window(&self, window_id: WindowId) -> Result<Vec<HostTab>, HostError> {
        Ok(lock(&self.state)
            .tabs
            .iter()
            .filter(|t| t.window_id == Some(window_id))
            .cloned()
            .collect())
    }

    async fn query_all(&self) -> Result<Vec<HostTab>, HostError> {
        Ok(lock(&self.state).tabs.clone())
    }

    async fn active_tab(&self) -> Result<Option<HostTab>, HostError> {
        let state = lock(&self.state);
        Ok(state
            .tabs
            .iter()
            .find(|t| t.active && t.window_id == state.focused_window)
            .cloned())
    }

    async fn update_tab_url(&self, tab_id: TabId, url: &str) -> Result<(), HostError> {
        let mut state = lock(&self.state);
        if state.locked.contains(&tab_id) {
            return Err(HostError::PermissionDenied(format!("tab {} is locked", tab_id)));
        }
        let tab = state
            .tabs
            .iter_mut()
            .find(|t| t.id == Some(tab_id))
            .ok_or(HostError::TabNotFound(tab_id))?;
        tab.url = Some(url.to_string());
        state.updates.push((tab_id, url.to_string()));
        Ok(())
    }

    async fn send_to_tab(&self, tab_id: TabId, message: &Message) -> Result<Value, HostError> {
        let mut state = lock(&self.state);
        if !state.tabs.iter().any(|t| t.id == Some(tab_id)) {
            return Err(HostError::TabNotFound(tab_id));
        }
        if state.unreachable.contains(&tab_id) {
            return Err(HostError::NoReceiver(tab_id));
        }
        state.sent.push((tab_id, message.clone()));
        Ok(json!({"success": true}))
    }

    async fn register_menus(&self, entries: &[MenuEntry]) -> Result<(), HostError> {
        lock(&self.state).menus = entries.to_vec();
        Ok(())
    }

    async fn open_options_page(&self) -> Result<(), HostError> {
        lock(&self.state).options_opened += 1;
        Ok(())
    }
}

// ─── MemoryStore ───

/// Volatile key-value store; contents vanish with the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops everything, as the host does when a browsing session ends.
    pub fn clear(&self) {
        lock(&self.entries).clear();
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        lock(&self.entries).insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

// ─── MemoryPage ───

/// A page whose location and history calls are recorded in memory.
pub struct MemoryPage {
    url: Mutex<String>,
    viewport: Mutex<Viewport>,
    navigations: Mutex<Vec<String>>,
    history_calls: Mutex<Vec<&'static str>>,
}

impl MemoryPage {
    pub fn new(url: &str) -> Self {
        Self {
            url: Mutex::new(url.to_string()),
            viewport: Mutex::new(Viewport {
                outer_width: 1280.0,
                inner_width: 1280.0,
            }),
            navigations: Mutex::new(Vec::new()),
            history_calls: Mutex::new(Vec::new()),
        }
    }

    /// Changes the location without a navigation request, as a single-page
    /// application does through the history API.
    pub fn set_url(&self, url: &str) {
        *lock(&self.url) = url.to_string();
    }

    pub fn set_viewport(&self, outer_width: f64, inner_width: f64) {
        *lock(&self.viewport) = Viewport {
            outer_width,
            inner_width,
        };
    }

    pub fn navigations(&self) -> Vec<String> {
        lock(&self.navigations).clone()
    }

    pub fn history_calls(&self) -> Vec<&'static str> {
        lock(&self.history_calls).clone()
    }
}

impl PageHandle for MemoryPage {
    fn current_url(&self) -> String {
        lock(&self.url).clone()
    }

    fn navigate(&self, url: &str) -> Result<(), HostError> {
        lock(&self.navigations).push(url.to_string());
        *lock(&self.url) = url.to_string();
        Ok(())
    }

    fn history_back(&self) {
        lock(&self.history_calls).push("back");
    }

    fn history_forward(&self) {
        lock(&self.history_calls).push("forward");
    }

    fn reload(&self) {
        lock(&self.history_calls).push("reload");
    }

    fn viewport(&self) -> Viewport {
        *lock(&self.viewport)
    }
}
