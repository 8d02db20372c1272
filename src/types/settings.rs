use serde::{Deserialize, Serialize};

/// Smallest font size the overlay accepts.
pub const MIN_FONT_SIZE: u32 = 20;
/// Largest font size the overlay accepts.
pub const MAX_FONT_SIZE: u32 = 50;
/// Font size all overlay dimensions are scaled from.
pub const BASE_FONT_SIZE: u32 = 26;

/// Shared overlay settings, persisted across restarts.
///
/// Missing fields deserialize to their defaults, so partially written
/// objects from older versions still load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlaySettings {
    pub enabled: bool,
    pub position: BarPosition,
    /// Stored and exposed in the settings panel; nothing reads it yet.
    pub auto_hide: bool,
    pub collapsed: bool,
    pub font_size: u32,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            position: BarPosition::Top,
            auto_hide: false,
            collapsed: false,
            font_size: BASE_FONT_SIZE,
        }
    }
}

impl OverlaySettings {
    /// Returns a copy with `font_size` clamped into the supported range.
    pub fn normalized(mut self) -> Self {
        self.font_size = clamp_font_size(self.font_size);
        self
    }
}

/// Clamps a font size into `[MIN_FONT_SIZE, MAX_FONT_SIZE]`.
pub fn clamp_font_size(size: u32) -> u32 {
    size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

/// Edge of the viewport the overlay is anchored to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BarPosition {
    #[default]
    Top,
    Bottom,
}
