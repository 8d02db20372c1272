use serde::{Deserialize, Serialize};

/// Host-assigned tab identifier.
pub type TabId = i64;

/// Host-assigned window identifier.
pub type WindowId = i64;

/// URL prefixes of host-internal pages that never receive the overlay.
const INTERNAL_URL_PREFIXES: &[&str] = &["chrome://", "chrome-extension://"];

/// Page schemes on which the overlay refuses to initialize.
const RESTRICTED_PAGE_SCHEMES: &[&str] = &["chrome:", "chrome-extension:", "about:", "edge:"];

/// Snapshot of a browser tab as reported by the host platform.
///
/// Snapshots are fetched on demand and never cached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HostTab {
    pub id: Option<TabId>,
    pub window_id: Option<WindowId>,
    pub index: i64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub active: bool,
}

impl HostTab {
    /// Whether this tab can carry an overlay: it has an id, a URL, and the URL
    /// is not a host-internal page.
    pub fn accepts_overlay(&self) -> bool {
        match (&self.id, &self.url) {
            (Some(_), Some(url)) => !is_internal_url(url),
            _ => false,
        }
    }
}

/// Returns true for host-internal pages such as `chrome://settings`.
pub fn is_internal_url(url: &str) -> bool {
    INTERNAL_URL_PREFIXES.iter().any(|p| url.starts_with(p))
}

/// Returns true when the page URL uses a scheme the overlay must not touch.
pub fn is_restricted_page(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    RESTRICTED_PAGE_SCHEMES.iter().any(|s| lower.starts_with(s))
}
