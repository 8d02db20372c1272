//! Host platform reached over newline-delimited JSON.
//!
//! Each host operation is written as a `host-call` line carrying a numeric
//! `callId`; the browser-side shim answers with a `host-result` line for the
//! same id. Calls that receive no answer within the configured timeout fail
//! with `HostError::Timeout`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::HostPlatform;
use crate::types::context_menu::MenuEntry;
use crate::types::errors::HostError;
use crate::types::message::Message;
use crate::types::tab::{HostTab, TabId, WindowId};

type PendingReply = oneshot::Sender<Result<Value, String>>;

pub struct StdioHost {
    outbound: mpsc::UnboundedSender<String>,
    pending: Mutex<HashMap<u64, PendingReply>>,
    next_call_id: AtomicU64,
    call_timeout: Duration,
}

impl StdioHost {
    /// `outbound` receives complete JSON lines; the caller owns writing them.
    pub fn new(outbound: mpsc::UnboundedSender<String>, call_timeout: Duration) -> Self {
        Self {
            outbound,
            pending: Mutex::new(HashMap::new()),
            next_call_id: AtomicU64::new(1),
            call_timeout,
        }
    }

    /// Completes a pending call. Returns false for unknown or expired ids.
    pub fn resolve(&self, call_id: u64, result: Result<Value, String>) -> bool {
        let reply = match self.pending.lock() {
            Ok(mut pending) => pending.remove(&call_id),
            Err(_) => None,
        };
        match reply {
            Some(tx) => tx.send(result).is_ok(),
            None => {
                debug!(call_id, "Host result for unknown call");
                false
            }
        }
    }

    /// Number of calls still waiting for a result.
    pub fn pending_calls(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }

    fn forget(&self, call_id: u64) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.remove(&call_id);
        }
    }

    async fn call(&self, method: &'static str, params: Value) -> Result<Value, HostError> {
        let call_id = self.next_call_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .map_err(|e| HostError::Other(e.to_string()))?
            .insert(call_id, tx);
        // Clears the slot however this future ends, including when a caller's
        // own timeout drops it first.
        let _slot = PendingSlot {
            host: self,
            call_id,
        };

        let line = json!({
            "type": "host-call",
            "callId": call_id,
            "method": method,
            "params": params,
        })
        .to_string();
        if self.outbound.send(line).is_err() {
            return Err(HostError::ChannelClosed("bridge output closed".to_string()));
        }

        match tokio::time::timeout(self.call_timeout, rx).await {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(msg))) => Err(HostError::from_message(&msg)),
            Ok(Err(_)) => Err(HostError::ChannelClosed(format!("{} dropped", method))),
            Err(_) => Err(HostError::Timeout(method.to_string())),
        }
    }
}

struct PendingSlot<'a> {
    host: &'a StdioHost,
    call_id: u64,
}

impl Drop for PendingSlot<'_> {
    fn drop(&mut self) {
        self.host.forget(self.call_id);
    }
}

fn parse_tab(value: Value) -> Result<HostTab, HostError> {
    serde_json::from_value(value).map_err(|e| HostError::Other(format!("bad tab payload: {}", e)))
}

fn parse_tabs(value: Value) -> Result<Vec<HostTab>, HostError> {
    serde_json::from_value(value).map_err(|e| HostError::Other(format!("bad tab list: {}", e)))
}

#[async_trait]
impl HostPlatform for StdioHost {
    async fn get_tab(&self, tab_id: TabId) -> Result<HostTab, HostError> {
        let value = self.call("tabs.get", json!({ "tabId": tab_id })).await?;
        if value.is_null() {
            return Err(HostError::TabNotFound(tab_id));
        }
        parse_tab(value)
    }

    async fn query_window(&self, window_id: WindowId) -> Result<Vec<HostTab>, HostError> {
        parse_tabs(self.call("tabs.query", json!({ "windowId": window_id })).await?)
    }

    async fn query_all(&self) -> Result<Vec<HostTab>, HostError> {
        parse_tabs(self.call("tabs.query", json!({})).await?)
    }

    async fn active_tab(&self) -> Result<Option<HostTab>, HostError> {
        let tabs = parse_tabs(
            self.call("tabs.query", json!({ "active": true, "currentWindow": true }))
                .await?,
        )?;
        Ok(tabs.into_iter().next())
    }

    async fn update_tab_url(&self, tab_id: TabId, url: &str) -> Result<(), HostError> {
        self.call("tabs.update", json!({ "tabId": tab_id, "url": url }))
            .await
            .map(|_| ())
    }

    async fn send_to_tab(&self, tab_id: TabId, message: &Message) -> Result<Value, HostError> {
        self.call(
            "tabs.sendMessage",
            json!({ "tabId": tab_id, "message": message }),
        )
        .await
    }

    async fn register_menus(&self, entries: &[MenuEntry]) -> Result<(), HostError> {
        self.call("contextMenus.reset", json!({ "entries": entries }))
            .await
            .map(|_| ())
    }

    async fn open_options_page(&self) -> Result<(), HostError> {
        self.call("runtime.openOptionsPage", json!({})).await.map(|_| ())
    }
}
