//! Address-bar input handling.
//!
//! Turns what the user typed into a navigation target, and describes the
//! current page URL for display in the bar.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::overlay::{AddressDisplay, ProtocolBadge};

/// Search engine query URL used for input that is not an address.
pub const SEARCH_URL_PREFIX: &str = "https://www.google.com/search?q=";

/// Longest URL prefix shown in the collapsed bar when the page has no host.
const COLLAPSED_LABEL_MAX_CHARS: usize = 50;

static EXPLICIT_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(https?|file)://").expect("valid scheme regex"));

// Dot-separated labels at the start of the input; the tail is not anchored.
static DOMAIN_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+(\.[A-Za-z0-9_.-]+)+").expect("valid domain regex"));

/// Normalizes address-bar input into a navigation target.
///
/// Returns `None` for blank input; nothing should be navigated.
///
/// # Examples
/// - `"example.com"` → `"https://example.com"`
/// - `"a/b"` → `"https://a/b"`
/// - `"http://x"` → unchanged
/// - `"hello world"` → search query with `hello%20world`
pub fn normalize_input(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if EXPLICIT_SCHEME.is_match(trimmed) {
        return Some(trimmed.to_string());
    }
    if DOMAIN_LIKE.is_match(trimmed) || trimmed.contains('/') {
        return Some(format!("https://{}", trimmed));
    }
    Some(format!(
        "{}{}",
        SEARCH_URL_PREFIX,
        urlencoding::encode(trimmed)
    ))
}

/// Describes a page URL for the bar: input text, protocol badge and the
/// label shown while collapsed.
pub fn describe_address(href: &str) -> AddressDisplay {
    let badge = if href.starts_with("https://") {
        ProtocolBadge::Secure
    } else if href.starts_with("http://") {
        ProtocolBadge::Insecure
    } else {
        ProtocolBadge::Neutral
    };

    let host = url::Url::parse(href)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .filter(|h| !h.is_empty());
    let collapsed_label =
        host.unwrap_or_else(|| href.chars().take(COLLAPSED_LABEL_MAX_CHARS).collect());

    AddressDisplay {
        input_text: href.to_string(),
        badge,
        collapsed_label,
    }
}
