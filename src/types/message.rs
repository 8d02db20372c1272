use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::settings::OverlaySettings;
use super::tab::HostTab;

/// Messages exchanged between the Coordinator, Overlays and the Settings Panel.
///
/// On the wire every message is a JSON object tagged by `action`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Message {
    // Coordinator-bound
    GetSettings,
    /// Carries a full or partial settings object; fields present are merged.
    SaveSettings { settings: Value },
    ToggleAllTabs,
    OpenInOtherTab { url: String },
    CheckTabState,

    // Overlay-bound
    ToggleAddressbar,
    ShowAddressbar,
    HideAddressbar,
    UpdateSettings { settings: OverlaySettings },
    GetStatus,
}

impl Message {
    /// Wire name of the message kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::GetSettings => "get-settings",
            Message::SaveSettings { .. } => "save-settings",
            Message::ToggleAllTabs => "toggle-all-tabs",
            Message::OpenInOtherTab { .. } => "open-in-other-tab",
            Message::CheckTabState => "check-tab-state",
            Message::ToggleAddressbar => "toggle-addressbar",
            Message::ShowAddressbar => "show-addressbar",
            Message::HideAddressbar => "hide-addressbar",
            Message::UpdateSettings { .. } => "update-settings",
            Message::GetStatus => "get-status",
        }
    }

    /// True for kinds an Overlay handles; false for Coordinator requests.
    pub fn is_overlay_bound(&self) -> bool {
        matches!(
            self,
            Message::ToggleAddressbar
                | Message::ShowAddressbar
                | Message::HideAddressbar
                | Message::UpdateSettings { .. }
                | Message::GetStatus
        )
    }
}

/// Who sent a message over the bus. Panels have no tab.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MessageSender {
    #[serde(default)]
    pub tab: Option<HostTab>,
}

impl MessageSender {
    pub fn from_tab(tab: HostTab) -> Self {
        Self { tab: Some(tab) }
    }

    pub fn panel() -> Self {
        Self::default()
    }
}

/// Generic acknowledgement reply.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub const OK: Ack = Ack { success: true };
}

/// Reply to `check-tab-state`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TabStateReply {
    pub enabled: bool,
}

/// Reply to `get-status`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct OverlayStatus {
    pub visible: bool,
    pub collapsed: bool,
    pub exists: bool,
}
