//! Floating address-bar controller, one per page.
//!
//! Holds only what the bar needs to render: the settings last received, and
//! whether the bar exists, is visible, or is collapsed. The state of record
//! lives in the coordinator; the overlay pulls its enablement on init and
//! otherwise reacts to pushed messages.
//!
//! Once the extension context is invalidated the overlay tears itself down
//! for good: the URL watcher stops and every later message is refused.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::host::{PageHandle, RuntimeBus};
use crate::services::overlay_layout::{metrics_for, page_margin, page_zoom, zoom_transform};
use crate::services::url_normalizer::{describe_address, normalize_input};
use crate::services::url_watcher::{UrlWatcher, UrlWatcherConfig};
use crate::types::errors::{HostError, MessageError};
use crate::types::message::{Ack, Message, OverlayStatus, TabStateReply};
use crate::types::overlay::{AddressDisplay, BarView, InitOutcome};
use crate::types::settings::OverlaySettings;
use crate::types::tab::is_restricted_page;

#[derive(Debug, Clone)]
struct BarState {
    visible: bool,
    collapsed: bool,
    /// Text in the URL input; diverges from the page URL while the user edits.
    input_text: String,
    address: AddressDisplay,
}

pub struct Overlay {
    instance_id: Uuid,
    bus: Arc<dyn RuntimeBus>,
    page: Arc<dyn PageHandle>,
    settings: OverlaySettings,
    bar: Option<BarState>,
    watcher: Option<UrlWatcher>,
    context_valid: bool,
}

impl Overlay {
    pub fn new(bus: Arc<dyn RuntimeBus>, page: Arc<dyn PageHandle>) -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            bus,
            page,
            settings: OverlaySettings::default(),
            bar: None,
            watcher: None,
            context_valid: true,
        }
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn settings(&self) -> &OverlaySettings {
        &self.settings
    }

    pub fn is_context_valid(&self) -> bool {
        self.context_valid
    }

    pub fn bar_exists(&self) -> bool {
        self.bar.is_some()
    }

    /// Text currently in the URL input, if the bar exists.
    pub fn input_text(&self) -> Option<&str> {
        self.bar.as_ref().map(|b| b.input_text.as_str())
    }

    /// Initializes the overlay on its page.
    ///
    /// Restricted pages are skipped. Otherwise settings are fetched (defaults
    /// on failure) and the coordinator is asked whether this tab is enabled;
    /// the bar is created only if it is.
    pub async fn init(&mut self) -> InitOutcome {
        let url = self.page.current_url();
        if is_restricted_page(&url) {
            debug!(url = %url, "Restricted page, overlay not initialized");
            return InitOutcome::Skipped;
        }

        match self.bus.send(Message::GetSettings).await {
            Ok(reply) => match serde_json::from_value::<OverlaySettings>(reply) {
                Ok(settings) => self.settings = settings.normalized(),
                Err(e) => debug!(error = %e, "Unreadable settings reply, using defaults"),
            },
            Err(e) if e.is_context_invalidated() => {
                self.teardown();
                return InitOutcome::Invalidated;
            }
            Err(e) => debug!(error = %e, "Settings unavailable, using defaults"),
        }

        match self.bus.send(Message::CheckTabState).await {
            Ok(reply) => {
                let enabled = serde_json::from_value::<TabStateReply>(reply)
                    .map(|r| r.enabled)
                    .unwrap_or(false);
                if enabled {
                    info!(instance = %self.instance_id, "Tab enabled, showing address bar");
                    self.create_bar();
                    InitOutcome::Shown
                } else {
                    InitOutcome::Dormant
                }
            }
            Err(e) if e.is_context_invalidated() => {
                self.teardown();
                InitOutcome::Invalidated
            }
            Err(e) => {
                debug!(error = %e, "Could not check tab state");
                InitOutcome::Dormant
            }
        }
    }

    /// Handles a message pushed by the coordinator.
    pub fn handle_message(&mut self, message: &Message) -> Result<Value, MessageError> {
        if !self.context_valid {
            return Err(HostError::ContextInvalidated.into());
        }
        if !message.is_overlay_bound() {
            debug!(kind = message.kind(), "Coordinator request sent to overlay");
            return Err(MessageError::Unhandled(message.kind()));
        }
        match message {
            Message::ToggleAddressbar => {
                match self.bar.as_mut() {
                    None => self.create_bar(),
                    Some(bar) => bar.visible = !bar.visible,
                }
                Ok(ack())
            }
            Message::ShowAddressbar => {
                match self.bar.as_mut() {
                    None => self.create_bar(),
                    Some(bar) => bar.visible = true,
                }
                Ok(ack())
            }
            Message::HideAddressbar => {
                if let Some(bar) = self.bar.as_mut() {
                    bar.visible = false;
                }
                Ok(ack())
            }
            Message::UpdateSettings { settings } => {
                self.settings = settings.clone().normalized();
                self.apply_settings();
                Ok(ack())
            }
            Message::GetStatus => Ok(json!(self.status())),
            other => Err(MessageError::Unhandled(other.kind())),
        }
    }

    pub fn status(&self) -> OverlayStatus {
        match &self.bar {
            Some(bar) => OverlayStatus {
                visible: bar.visible,
                collapsed: bar.collapsed,
                exists: true,
            },
            None => OverlayStatus::default(),
        }
    }

    fn create_bar(&mut self) {
        let url = self.page.current_url();
        self.bar = Some(BarState {
            visible: true,
            collapsed: false,
            input_text: url.clone(),
            address: describe_address(&url),
        });
        self.apply_settings();
    }

    fn apply_settings(&mut self) {
        let Some(bar) = self.bar.as_mut() else {
            return;
        };
        bar.visible = self.settings.enabled;
        if self.settings.collapsed {
            bar.collapsed = true;
        }
    }

    /// Collapses or expands the bar and persists the choice.
    pub async fn set_collapsed(&mut self, collapsed: bool) {
        let Some(bar) = self.bar.as_mut() else {
            return;
        };
        bar.collapsed = collapsed;
        self.settings.collapsed = collapsed;
        self.request(Message::SaveSettings {
            settings: json!({ "collapsed": collapsed }),
        })
        .await;
    }

    /// Replaces the input text, as the user typing does.
    pub fn set_input(&mut self, text: &str) {
        if let Some(bar) = self.bar.as_mut() {
            bar.input_text = text.to_string();
        }
    }

    /// Navigates to the current input text. See [`Overlay::navigate`].
    pub fn submit(&mut self) -> Option<String> {
        let input = self.bar.as_ref()?.input_text.clone();
        self.navigate(&input)
    }

    /// Navigates the page to the normalized form of `input`.
    ///
    /// Blank input is ignored. Returns the navigation target.
    pub fn navigate(&mut self, input: &str) -> Option<String> {
        if !self.context_valid {
            return None;
        }
        let target = normalize_input(input)?;
        info!(url = %target, "Navigating");
        if let Err(e) = self.page.navigate(&target) {
            warn!(url = %target, error = %e, "Navigation failed");
        }
        Some(target)
    }

    /// Discards edits and restores the page URL in the input.
    pub fn escape(&mut self) {
        let url = self.page.current_url();
        if let Some(bar) = self.bar.as_mut() {
            bar.input_text = url;
        }
    }

    pub fn back(&self) {
        self.page.history_back();
    }

    pub fn forward(&self) {
        self.page.history_forward();
    }

    pub fn reload(&self) {
        self.page.reload();
    }

    /// Shift-click on a link: asks the coordinator to open it in the sibling
    /// tab. Returns whether the request was acknowledged.
    pub async fn open_link_in_other_tab(&mut self, href: &str) -> bool {
        if href.is_empty() {
            return false;
        }
        debug!(url = %href, "Opening link in sibling tab");
        self.request(Message::OpenInOtherTab {
            url: href.to_string(),
        })
        .await
        .and_then(|v| serde_json::from_value::<Ack>(v).ok())
        .is_some_and(|a| a.success)
    }

    /// Refreshes the displayed address after the page URL changed.
    pub fn on_url_changed(&mut self, url: &str) {
        if !self.context_valid {
            return;
        }
        if let Some(bar) = self.bar.as_mut() {
            bar.input_text = url.to_string();
            bar.address = describe_address(url);
        }
    }

    /// Starts watching the page URL. Changed URLs should be fed back through
    /// [`Overlay::on_url_changed`].
    pub fn attach_watcher(
        &mut self,
        config: UrlWatcherConfig,
    ) -> Option<mpsc::UnboundedReceiver<String>> {
        if !self.context_valid {
            return None;
        }
        let (watcher, changes) = UrlWatcher::spawn(self.page.clone(), config);
        self.watcher = Some(watcher);
        Some(changes)
    }

    /// Forwards a history or hash navigation event to the watcher.
    pub fn notify_navigation(&self) {
        if let Some(watcher) = &self.watcher {
            watcher.notify_navigation();
        }
    }

    pub fn watcher_running(&self) -> bool {
        self.watcher.as_ref().is_some_and(|w| w.is_running())
    }

    /// Render description of the bar, or `None` when it was never created.
    pub fn view(&self) -> Option<BarView> {
        let bar = self.bar.as_ref()?;
        let metrics = metrics_for(self.settings.font_size);
        let viewport = self.page.viewport();
        let zoom = page_zoom(viewport.outer_width, viewport.inner_width);
        Some(BarView {
            position: self.settings.position,
            visible: bar.visible,
            collapsed: bar.collapsed,
            metrics,
            zoom: zoom_transform(zoom, self.settings.position),
            page_margin: page_margin(
                bar.visible,
                self.settings.enabled,
                bar.collapsed,
                &metrics,
                zoom,
                self.settings.position,
            ),
            address: bar.address.clone(),
        })
    }

    /// Permanently stops the overlay. Only the first call has an effect.
    pub fn teardown(&mut self) {
        if !self.context_valid {
            return;
        }
        self.context_valid = false;
        if let Some(mut watcher) = self.watcher.take() {
            watcher.stop();
        }
        info!(instance = %self.instance_id, "Extension context invalidated, overlay stopped");
    }

    async fn request(&mut self, message: Message) -> Option<Value> {
        if !self.context_valid {
            return None;
        }
        let kind = message.kind();
        match self.bus.send(message).await {
            Ok(reply) => Some(reply),
            Err(e) if e.is_context_invalidated() => {
                self.teardown();
                None
            }
            Err(e) => {
                debug!(kind, error = %e, "Request to coordinator failed");
                None
            }
        }
    }
}

fn ack() -> Value {
    json!(Ack::OK)
}
