// Split Tab Plus Overlay Layout
// Pixel metrics of the bar, scaled from the font size, plus page-zoom compensation.

use crate::types::overlay::{BarMetrics, PageMargin, ZoomTransform};
use crate::types::settings::{BarPosition, BASE_FONT_SIZE};

/// Dimensions at the base font size.
struct BaseDimensions;
impl BaseDimensions {
    const BAR_HEIGHT: f64 = 84.0;
    const COLLAPSED_HEIGHT: f64 = 48.0;
    const BUTTON_SIZE: f64 = 60.0;
    const BUTTON_PADDING: f64 = 12.0;
    const ICON_SIZE: f64 = 32.0;
    const GAP: f64 = 16.0;
    const PADDING: f64 = 24.0;
    const RADIUS: f64 = 12.0;
    const URL_HEIGHT: f64 = 60.0;
}

const MIN_ZOOM: f64 = 0.25;
const MAX_ZOOM: f64 = 5.0;

fn scaled(base: f64, scale: f64) -> u32 {
    (base * scale).round() as u32
}

/// Computes bar metrics for a font size. Zero falls back to the base size.
pub fn metrics_for(font_size: u32) -> BarMetrics {
    let font_size = if font_size == 0 { BASE_FONT_SIZE } else { font_size };
    let scale = f64::from(font_size) / f64::from(BASE_FONT_SIZE);
    BarMetrics {
        font_size,
        scale,
        bar_height: scaled(BaseDimensions::BAR_HEIGHT, scale),
        collapsed_height: scaled(BaseDimensions::COLLAPSED_HEIGHT, scale),
        button_size: scaled(BaseDimensions::BUTTON_SIZE, scale),
        button_padding: scaled(BaseDimensions::BUTTON_PADDING, scale),
        icon_size: scaled(BaseDimensions::ICON_SIZE, scale),
        gap: scaled(BaseDimensions::GAP, scale),
        padding: scaled(BaseDimensions::PADDING, scale),
        radius: scaled(BaseDimensions::RADIUS, scale),
        url_height: scaled(BaseDimensions::URL_HEIGHT, scale),
    }
}

/// CSS custom properties a renderer sets on the overlay host element.
pub fn css_variables(metrics: &BarMetrics) -> Vec<(String, String)> {
    let px = |v: u32| format!("{}px", v);
    vec![
        ("--stp-font-size".to_string(), px(metrics.font_size)),
        ("--stp-scale".to_string(), metrics.scale.to_string()),
        ("--stp-bar-height".to_string(), px(metrics.bar_height)),
        ("--stp-collapsed-height".to_string(), px(metrics.collapsed_height)),
        ("--stp-btn-size".to_string(), px(metrics.button_size)),
        ("--stp-btn-padding".to_string(), px(metrics.button_padding)),
        ("--stp-icon-size".to_string(), px(metrics.icon_size)),
        ("--stp-gap".to_string(), px(metrics.gap)),
        ("--stp-padding".to_string(), px(metrics.padding)),
        ("--stp-radius".to_string(), px(metrics.radius)),
        ("--stp-url-height".to_string(), px(metrics.url_height)),
    ]
}

/// Estimates page zoom from the window/viewport width ratio.
///
/// Rounded to two decimals and clamped to `[0.25, 5]`. A degenerate
/// viewport reads as no zoom.
pub fn page_zoom(outer_width: f64, inner_width: f64) -> f64 {
    if inner_width <= 0.0 || !outer_width.is_finite() || !inner_width.is_finite() {
        return 1.0;
    }
    let zoom = (outer_width / inner_width * 100.0).round() / 100.0;
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Inverse transform that keeps the bar at a fixed visual size.
pub fn zoom_transform(zoom: f64, position: BarPosition) -> ZoomTransform {
    ZoomTransform {
        scale: 1.0 / zoom,
        origin: match position {
            BarPosition::Top => "top left",
            BarPosition::Bottom => "bottom left",
        },
        width_percent: zoom * 100.0,
    }
}

/// Margin the page body needs so the bar does not cover content.
///
/// `None` when the bar is hidden or overlays are disabled.
pub fn page_margin(
    shown: bool,
    enabled: bool,
    collapsed: bool,
    metrics: &BarMetrics,
    zoom: f64,
    position: BarPosition,
) -> Option<PageMargin> {
    if !shown || !enabled {
        return None;
    }
    let height = if collapsed {
        metrics.collapsed_height
    } else {
        metrics.bar_height
    };
    if height == 0 {
        return None;
    }
    Some(PageMargin {
        edge: position,
        pixels: (f64::from(height) / zoom).round() as u32,
    })
}
