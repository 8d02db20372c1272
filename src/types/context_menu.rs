use serde::{Deserialize, Serialize};

/// Identifiers of the extension's context-menu entries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum MenuItemId {
    /// "Open link in the other pane", shown on links.
    OpenInOtherTab,
    /// "Open this page in the other pane", shown on pages.
    OpenPageInOtherTab,
    /// "Open settings", shown on the extension icon.
    OpenOptions,
}

/// Where a context-menu entry appears.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MenuContext {
    Link,
    Page,
    Action,
}

/// A context-menu entry as registered with the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuEntry {
    pub id: MenuItemId,
    pub title: String,
    pub contexts: Vec<MenuContext>,
}

/// The fixed set of entries registered on install and update.
pub fn default_menu_entries() -> Vec<MenuEntry> {
    vec![
        MenuEntry {
            id: MenuItemId::OpenInOtherTab,
            title: "Open link in the other pane".to_string(),
            contexts: vec![MenuContext::Link],
        },
        MenuEntry {
            id: MenuItemId::OpenPageInOtherTab,
            title: "Open this page in the other pane".to_string(),
            contexts: vec![MenuContext::Page],
        },
        MenuEntry {
            id: MenuItemId::OpenOptions,
            title: "Open settings".to_string(),
            contexts: vec![MenuContext::Action],
        },
    ]
}

/// Click details the host reports for a context-menu entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MenuClickInfo {
    pub menu_item_id: MenuItemId,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub page_url: Option<String>,
}
