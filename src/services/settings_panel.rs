//! Settings panel form state.
//!
//! The popup and the options page both mirror the shared settings in a local
//! form, load it through `get-settings` and write the whole form back through
//! `save-settings` after every change. Only the options page edits the font
//! size; the popup also offers the bulk toggle over all tabs.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::host::RuntimeBus;
use crate::types::message::{Ack, Message};
use crate::types::settings::{clamp_font_size, BarPosition, OverlaySettings};

/// Which surface hosts the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    /// Toolbar popup: enabled, position, auto-hide and the bulk toggle.
    Popup,
    /// Full options page: adds the font size.
    Options,
}

impl PanelKind {
    fn edits_font_size(self) -> bool {
        matches!(self, PanelKind::Options)
    }
}

pub struct SettingsPanel {
    kind: PanelKind,
    bus: Arc<dyn RuntimeBus>,
    form: Map<String, Value>,
}

impl SettingsPanel {
    pub fn new(kind: PanelKind, bus: Arc<dyn RuntimeBus>) -> Self {
        let mut form = match serde_json::to_value(OverlaySettings::default()) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        if !kind.edits_font_size() {
            form.remove("fontSize");
        }
        Self { kind, bus, form }
    }

    pub fn kind(&self) -> PanelKind {
        self.kind
    }

    /// Current form values. Fields the form does not hold read as defaults.
    pub fn form(&self) -> OverlaySettings {
        serde_json::from_value(Value::Object(self.form.clone())).unwrap_or_default()
    }

    /// Raw payload the next save would send.
    pub fn payload(&self) -> Value {
        Value::Object(self.form.clone())
    }

    /// Fills the form from the coordinator's settings. A failed request
    /// keeps the form as it is.
    pub async fn load(&mut self) -> OverlaySettings {
        match self.bus.send(Message::GetSettings).await {
            Ok(Value::Object(settings)) => {
                for (key, value) in settings {
                    self.form.insert(key, value);
                }
            }
            Ok(other) => debug!(reply = %other, "Unexpected settings reply"),
            Err(e) => warn!(error = %e, "Failed to load settings"),
        }
        self.form()
    }

    pub async fn set_enabled(&mut self, enabled: bool) -> bool {
        self.form.insert("enabled".to_string(), json!(enabled));
        self.save().await
    }

    pub async fn set_position(&mut self, position: BarPosition) -> bool {
        self.form.insert("position".to_string(), json!(position));
        self.save().await
    }

    pub async fn set_auto_hide(&mut self, auto_hide: bool) -> bool {
        self.form.insert("autoHide".to_string(), json!(auto_hide));
        self.save().await
    }

    /// Sets the font size, clamped to the supported range. The popup has no
    /// font size control and always returns false.
    pub async fn set_font_size(&mut self, font_size: u32) -> bool {
        if !self.kind.edits_font_size() {
            return false;
        }
        self.form
            .insert("fontSize".to_string(), json!(clamp_font_size(font_size)));
        self.save().await
    }

    /// Sends the whole form. Returns whether the coordinator acknowledged it.
    pub async fn save(&mut self) -> bool {
        let reply = self
            .bus
            .send(Message::SaveSettings {
                settings: self.payload(),
            })
            .await;
        match reply {
            Ok(value) => serde_json::from_value::<Ack>(value)
                .map(|a| a.success)
                .unwrap_or(false),
            Err(e) => {
                warn!(error = %e, "Failed to save settings");
                false
            }
        }
    }

    /// Asks the coordinator to toggle the overlay on every tab. Popup only.
    pub async fn toggle_all_tabs(&self) -> bool {
        if self.kind != PanelKind::Popup {
            return false;
        }
        match self.bus.send(Message::ToggleAllTabs).await {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "Toggle all tabs failed");
                false
            }
        }
    }
}
