use serde::{Deserialize, Serialize};

use super::settings::BarPosition;

/// Security indicator shown left of the URL input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolBadge {
    Secure,
    Insecure,
    Neutral,
}

/// What the bar displays for the current page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddressDisplay {
    /// Full URL placed in the input field.
    pub input_text: String,
    pub badge: ProtocolBadge,
    /// Host name, or a URL prefix when the page has none.
    pub collapsed_label: String,
}

/// Pixel dimensions of the bar for a given font size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BarMetrics {
    pub font_size: u32,
    pub scale: f64,
    pub bar_height: u32,
    pub collapsed_height: u32,
    pub button_size: u32,
    pub button_padding: u32,
    pub icon_size: u32,
    pub gap: u32,
    pub padding: u32,
    pub radius: u32,
    pub url_height: u32,
}

/// Margin reserved on the page body so the bar does not cover content.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PageMargin {
    pub edge: BarPosition,
    pub pixels: u32,
}

/// Inverse scaling applied to the bar so it keeps its size under page zoom.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ZoomTransform {
    pub scale: f64,
    pub origin: &'static str,
    pub width_percent: f64,
}

/// Everything a renderer needs to draw the bar in its current state.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BarView {
    pub position: BarPosition,
    pub visible: bool,
    pub collapsed: bool,
    pub metrics: BarMetrics,
    pub zoom: ZoomTransform,
    pub page_margin: Option<PageMargin>,
    pub address: AddressDisplay,
}

/// Result of overlay initialization on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// Restricted page; nothing was set up.
    Skipped,
    /// Tab is enabled; the bar was created.
    Shown,
    /// Listeners are installed but the bar stays absent until requested.
    Dormant,
    /// The extension context was gone; the overlay tore itself down.
    Invalidated,
}
