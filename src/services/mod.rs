// Split Tab Plus services
// Services provide the behavior around the coordinator: settings, delivery, URL handling, the page overlay and the settings panel.

pub mod messaging;
pub mod overlay;
pub mod overlay_layout;
pub mod settings_engine;
pub mod settings_panel;
pub mod url_normalizer;
pub mod url_watcher;
