//! Coordinator: the long-lived background component.
//!
//! Owns the shared settings and the tab enablement set, reacts to host
//! events (install, icon click, tab close, shortcut, context menu) and relays
//! messages to page overlays. All state lives in one explicit
//! [`CoordinatorState`] behind a mutex that is never held across an await.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::host::{HostPlatform, KeyValueStore};
use crate::managers::sibling_selector::select_sibling;
use crate::managers::tab_state_manager::{TabStateManager, TabStateManagerTrait};
use crate::services::messaging::{deliver, Delivery};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::command::HostCommand;
use crate::types::context_menu::{default_menu_entries, MenuClickInfo, MenuItemId};
use crate::types::errors::{HostError, SettingsError};
use crate::types::message::Message;
use crate::types::settings::OverlaySettings;
use crate::types::tab::{HostTab, TabId};

/// Why the host reported an install event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallReason {
    Install,
    Update,
    #[serde(other)]
    Other,
}

/// Result of a window-level bulk toggle.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkToggleOutcome {
    /// State every candidate tab was moved to.
    pub enabled: bool,
    pub tab_ids: Vec<TabId>,
    pub deliveries: Vec<(TabId, Delivery)>,
}

/// Mutable state of the coordinator, created at startup and dropped with it.
pub struct CoordinatorState {
    pub settings: SettingsEngine,
    pub tab_states: TabStateManager,
}

#[derive(Clone)]
pub struct Coordinator {
    host: Arc<dyn HostPlatform>,
    state: Arc<Mutex<CoordinatorState>>,
    send_timeout: Duration,
}

impl Coordinator {
    /// `persistent` keeps settings across restarts; `session` holds the
    /// enablement set and is expected to be cleared with the session.
    pub fn new(
        host: Arc<dyn HostPlatform>,
        persistent: Arc<dyn KeyValueStore>,
        session: Arc<dyn KeyValueStore>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            host,
            state: Arc::new(Mutex::new(CoordinatorState {
                settings: SettingsEngine::new(persistent),
                tab_states: TabStateManager::new(session),
            })),
            send_timeout,
        }
    }

    fn state(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn host(&self) -> &Arc<dyn HostPlatform> {
        &self.host
    }

    pub fn send_timeout(&self) -> Duration {
        self.send_timeout
    }

    /// Loads the stored settings into memory.
    pub fn startup(&self) -> OverlaySettings {
        let mut state = self.state();
        match state.settings.load() {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "Failed to load settings, using defaults");
                OverlaySettings::default()
            }
        }
    }

    // ─── Settings ───

    /// Current stored settings; defaults when absent or unreadable.
    pub fn get_settings(&self) -> OverlaySettings {
        let mut state = self.state();
        match state.settings.load() {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "Stored settings unreadable, serving defaults");
                OverlaySettings::default()
            }
        }
    }

    /// Merges `patch` into the stored settings and persists the result.
    pub fn save_settings(&self, patch: &Value) -> Result<OverlaySettings, SettingsError> {
        let mut state = self.state();
        if let Err(e) = state.settings.load() {
            warn!(error = %e, "Stored settings unreadable, merging over last known");
        }
        state.settings.merge(patch)
    }

    // ─── Enablement set ───

    pub fn is_tab_enabled(&self, tab_id: TabId) -> bool {
        self.state().tab_states.is_enabled(tab_id)
    }

    pub fn enabled_tabs(&self) -> HashSet<TabId> {
        self.state().tab_states.enabled_tabs()
    }

    // ─── Host events ───

    pub async fn on_installed(&self, reason: InstallReason) {
        match reason {
            InstallReason::Install => {
                let result = self.state().settings.install_defaults();
                match result {
                    Ok(()) => info!("Split Tab Plus installed, default settings written"),
                    Err(e) => warn!(error = %e, "Failed to write default settings"),
                }
            }
            InstallReason::Update => {
                info!(version = env!("CARGO_PKG_VERSION"), "Split Tab Plus updated");
            }
            InstallReason::Other => {}
        }
        match self.host.register_menus(&default_menu_entries()).await {
            Ok(()) => debug!("Context menus registered"),
            Err(e) => warn!(error = %e, "Failed to register context menus"),
        }
    }

    pub fn on_tab_removed(&self, tab_id: TabId) {
        self.state().tab_states.remove_tab(tab_id);
    }

    /// Bulk toggle for the window of the clicked icon.
    ///
    /// Returns `None` when nothing was toggled (no window, no candidate tabs,
    /// or a host or store failure).
    pub async fn on_action_clicked(&self, tab: &HostTab) -> Option<BulkToggleOutcome> {
        let window_id = tab.window_id?;
        let tabs = match self.host.query_window(window_id).await {
            Ok(tabs) => tabs,
            Err(e) => {
                warn!(window_id, error = %e, "Failed to query window tabs");
                return None;
            }
        };
        let tab_ids: Vec<TabId> = tabs
            .iter()
            .filter(|t| t.accepts_overlay())
            .filter_map(|t| t.id)
            .collect();

        let toggled = self.state().tab_states.toggle(&tab_ids);
        let enabled = match toggled {
            Ok(Some(enabled)) => enabled,
            Ok(None) => return None,
            Err(e) => {
                warn!(window_id, error = %e, "Failed to store tab states");
                return None;
            }
        };
        info!(
            window_id,
            count = tab_ids.len(),
            enabled,
            "Toggled address bar for window"
        );

        let message = if enabled {
            Message::ShowAddressbar
        } else {
            Message::HideAddressbar
        };
        let mut deliveries = Vec::with_capacity(tab_ids.len());
        for id in &tab_ids {
            let delivery = deliver(self.host.as_ref(), *id, &message, self.send_timeout).await;
            deliveries.push((*id, delivery));
        }

        Some(BulkToggleOutcome {
            enabled,
            tab_ids,
            deliveries,
        })
    }

    /// Keyboard shortcut. Returns the delivery to the active tab, if any.
    pub async fn on_command(&self, name: &str) -> Option<Delivery> {
        match HostCommand::parse(name)? {
            HostCommand::ToggleAddressbar => {
                let tab_id = self.active_tab_id().await?;
                let delivery = deliver(
                    self.host.as_ref(),
                    tab_id,
                    &Message::ToggleAddressbar,
                    self.send_timeout,
                )
                .await;
                if !delivery.is_delivered() {
                    debug!(tab_id, "Cannot toggle address bar on this page");
                }
                Some(delivery)
            }
        }
    }

    /// Context-menu click. Returns the tab whose location was replaced.
    pub async fn on_context_menu_clicked(
        &self,
        info: &MenuClickInfo,
        tab: Option<&HostTab>,
    ) -> Option<TabId> {
        debug!(item = ?info.menu_item_id, "Context menu clicked");
        match info.menu_item_id {
            MenuItemId::OpenInOtherTab => {
                let Some(url) = info.link_url.as_deref().filter(|u| !u.is_empty()) else {
                    warn!("No link URL in context menu click");
                    return None;
                };
                let source_id = match tab.and_then(|t| t.id) {
                    Some(id) => id,
                    None => {
                        debug!("No tab in context menu click, using active tab");
                        let Some(id) = self.active_tab_id().await else {
                            warn!("Could not resolve active tab");
                            return None;
                        };
                        id
                    }
                };
                self.open_in_other_tab(source_id, url).await
            }
            MenuItemId::OpenPageInOtherTab => {
                let Some((source_id, tab)) = tab.and_then(|t| t.id.map(|id| (id, t))) else {
                    warn!("No tab for page context menu");
                    return None;
                };
                let url = tab
                    .url
                    .as_deref()
                    .or(info.page_url.as_deref())
                    .filter(|u| !u.is_empty());
                let Some(url) = url else {
                    warn!(tab_id = source_id, "No page URL in context menu click");
                    return None;
                };
                self.open_in_other_tab(source_id, url).await
            }
            MenuItemId::OpenOptions => {
                if let Err(e) = self.host.open_options_page().await {
                    warn!(error = %e, "Failed to open options page");
                }
                None
            }
        }
    }

    /// Replaces the location of the sibling of `source_id` with `url`.
    ///
    /// Returns the updated tab, or `None` when the source is gone, no other
    /// tab exists, or the update failed.
    pub async fn open_in_other_tab(&self, source_id: TabId, url: &str) -> Option<TabId> {
        let source = match self.host.get_tab(source_id).await {
            Ok(tab) => tab,
            Err(e) => {
                warn!(tab_id = source_id, error = %e, "Source tab unavailable");
                return None;
            }
        };
        let Some(window_id) = source.window_id else {
            warn!(error = %HostError::NoWindow(source_id), "Source tab has no window");
            return None;
        };
        let tabs = match self.host.query_window(window_id).await {
            Ok(tabs) => tabs,
            Err(e) => {
                warn!(window_id, error = %e, "Failed to query window tabs");
                return None;
            }
        };

        let Some(sibling) = select_sibling(&source, &tabs) else {
            info!(tab_id = source_id, "No other tabs in this window");
            return None;
        };
        let target_id = sibling.tab.id?;
        debug!(
            source = source_id,
            target = target_id,
            reason = ?sibling.reason,
            "Sibling tab selected"
        );

        match self.host.update_tab_url(target_id, url).await {
            Ok(()) => {
                info!(tab_id = target_id, url = %url, "Opened URL in sibling tab");
                Some(target_id)
            }
            Err(e) => {
                warn!(tab_id = target_id, error = %e, "Failed to update sibling tab");
                None
            }
        }
    }

    /// Sends `toggle-addressbar` to every tab that can carry an overlay. The
    /// enablement set is left as it is.
    pub async fn toggle_all_tabs(&self) -> Vec<(TabId, Delivery)> {
        self.send_to_overlay_tabs(&Message::ToggleAddressbar).await
    }

    /// Pushes `settings` to every overlay.
    pub async fn broadcast_settings(&self, settings: &OverlaySettings) -> Vec<(TabId, Delivery)> {
        self.send_to_overlay_tabs(&Message::UpdateSettings {
            settings: settings.clone(),
        })
        .await
    }

    async fn send_to_overlay_tabs(&self, message: &Message) -> Vec<(TabId, Delivery)> {
        let tabs = match self.host.query_all().await {
            Ok(tabs) => tabs,
            Err(e) => {
                warn!(kind = message.kind(), error = %e, "Failed to query tabs");
                return Vec::new();
            }
        };
        let mut deliveries = Vec::new();
        for id in tabs.iter().filter(|t| t.accepts_overlay()).filter_map(|t| t.id) {
            let delivery = deliver(self.host.as_ref(), id, message, self.send_timeout).await;
            deliveries.push((id, delivery));
        }
        deliveries
    }

    async fn active_tab_id(&self) -> Option<TabId> {
        match self.host.active_tab().await {
            Ok(tab) => tab.and_then(|t| t.id),
            Err(e) => {
                debug!(error = %e, "Failed to query active tab");
                None
            }
        }
    }
}
