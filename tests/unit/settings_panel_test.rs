//! Settings panels saving through a Coordinator in the same process.

use std::sync::Arc;
use std::time::Duration;

use split_tab_plus::coordinator::Coordinator;
use split_tab_plus::host::bus::InProcessBus;
use split_tab_plus::host::memory::{MemoryHost, MemoryStore};
use split_tab_plus::services::settings_panel::{PanelKind, SettingsPanel};
use split_tab_plus::types::message::{Message, MessageSender};
use split_tab_plus::types::settings::{BarPosition, MAX_FONT_SIZE, MIN_FONT_SIZE};

fn setup() -> (Coordinator, Arc<MemoryHost>) {
    let host = Arc::new(MemoryHost::new());
    let coordinator = Coordinator::new(
        host.clone(),
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStore::new()),
        Duration::from_secs(1),
    );
    (coordinator, host)
}

fn panel(kind: PanelKind, coordinator: &Coordinator) -> SettingsPanel {
    SettingsPanel::new(
        kind,
        Arc::new(InProcessBus::new(coordinator.clone(), MessageSender::panel())),
    )
}

#[tokio::test]
async fn test_popup_change_is_saved_and_broadcast() {
    let (coordinator, host) = setup();
    let a = host.add_tab(1, 0, "https://a.com/");
    let b = host.add_tab(2, 0, "https://b.com/");
    host.add_tab(2, 1, "chrome://extensions");

    let mut popup = panel(PanelKind::Popup, &coordinator);
    popup.load().await;
    assert!(popup.set_position(BarPosition::Bottom).await);

    assert_eq!(coordinator.get_settings().position, BarPosition::Bottom);
    let pushed: Vec<_> = host
        .sent_messages()
        .into_iter()
        .filter_map(|(id, m)| match m {
            Message::UpdateSettings { settings } => Some((id, settings.position)),
            _ => None,
        })
        .collect();
    assert_eq!(pushed, vec![(a, BarPosition::Bottom), (b, BarPosition::Bottom)]);
}

#[tokio::test]
async fn test_popup_keeps_font_size_from_options() {
    let (coordinator, _host) = setup();
    let mut options = panel(PanelKind::Options, &coordinator);
    options.load().await;
    assert!(options.set_font_size(40).await);

    let mut popup = panel(PanelKind::Popup, &coordinator);
    popup.load().await;
    assert!(!popup.set_font_size(30).await);
    assert!(popup.set_enabled(false).await);

    let settings = coordinator.get_settings();
    assert_eq!(settings.font_size, 40);
    assert!(!settings.enabled);
}

#[tokio::test]
async fn test_options_font_size_is_clamped() {
    let (coordinator, _host) = setup();
    let mut options = panel(PanelKind::Options, &coordinator);
    options.load().await;

    options.set_font_size(500).await;
    assert_eq!(coordinator.get_settings().font_size, MAX_FONT_SIZE);
    options.set_font_size(1).await;
    assert_eq!(coordinator.get_settings().font_size, MIN_FONT_SIZE);
}

#[tokio::test]
async fn test_fresh_popup_form_has_no_font_size() {
    let (coordinator, _host) = setup();
    let popup = panel(PanelKind::Popup, &coordinator);
    assert!(popup.payload().get("fontSize").is_none());
    let options = panel(PanelKind::Options, &coordinator);
    assert!(options.payload().get("fontSize").is_some());
}

#[tokio::test]
async fn test_popup_toggle_all_reaches_every_page() {
    let (coordinator, host) = setup();
    let a = host.add_tab(1, 0, "https://a.com/");
    let b = host.add_tab(1, 1, "https://b.com/");

    let popup = panel(PanelKind::Popup, &coordinator);
    assert!(popup.toggle_all_tabs().await);
    assert_eq!(
        host.sent_messages(),
        vec![(a, Message::ToggleAddressbar), (b, Message::ToggleAddressbar)]
    );
    assert!(coordinator.enabled_tabs().is_empty());

    let options = panel(PanelKind::Options, &coordinator);
    assert!(!options.toggle_all_tabs().await);
}

#[tokio::test]
async fn test_load_reflects_stored_settings() {
    let (coordinator, _host) = setup();
    coordinator
        .save_settings(&serde_json::json!({"autoHide": true, "position": "bottom"}))
        .unwrap();
    let mut options = panel(PanelKind::Options, &coordinator);
    let form = options.load().await;
    assert!(form.auto_hide);
    assert_eq!(form.position, BarPosition::Bottom);
}
