//! Integration tests for the Coordinator against the in-memory host.
//!
//! These drive host events (install, icon click, tab close, shortcut, context
//! menu) and check tab mutations, delivered messages and stored state.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use split_tab_plus::coordinator::{Coordinator, InstallReason};
use split_tab_plus::host::memory::{MemoryHost, MemoryStore};
use split_tab_plus::host::KeyValueStore;
use split_tab_plus::services::messaging::Delivery;
use split_tab_plus::services::settings_engine::SETTINGS_KEY;
use split_tab_plus::types::context_menu::{MenuClickInfo, MenuItemId};
use split_tab_plus::types::errors::HostError;
use split_tab_plus::types::message::Message;
use split_tab_plus::types::settings::{BarPosition, OverlaySettings};

struct Fixture {
    coordinator: Coordinator,
    host: Arc<MemoryHost>,
    persistent: Arc<MemoryStore>,
    session: Arc<MemoryStore>,
}

fn fixture() -> Fixture {
    let host = Arc::new(MemoryHost::new());
    let persistent = Arc::new(MemoryStore::new());
    let session = Arc::new(MemoryStore::new());
    let coordinator = Coordinator::new(
        host.clone(),
        persistent.clone(),
        session.clone(),
        Duration::from_secs(1),
    );
    Fixture {
        coordinator,
        host,
        persistent,
        session,
    }
}

fn click(item: MenuItemId, link: Option<&str>, page: Option<&str>) -> MenuClickInfo {
    MenuClickInfo {
        menu_item_id: item,
        link_url: link.map(str::to_string),
        page_url: page.map(str::to_string),
    }
}

// ─── Install ───

#[tokio::test]
async fn test_install_writes_defaults_and_menus() {
    let f = fixture();
    f.coordinator.on_installed(InstallReason::Install).await;

    assert_eq!(
        f.persistent.get(SETTINGS_KEY).unwrap(),
        Some(serde_json::to_value(OverlaySettings::default()).unwrap())
    );
    let ids: Vec<MenuItemId> = f.host.menus().iter().map(|m| m.id).collect();
    assert_eq!(
        ids,
        vec![
            MenuItemId::OpenInOtherTab,
            MenuItemId::OpenPageInOtherTab,
            MenuItemId::OpenOptions
        ]
    );
}

#[tokio::test]
async fn test_update_keeps_settings() {
    let f = fixture();
    f.persistent
        .set(SETTINGS_KEY, json!({"position": "bottom"}))
        .unwrap();
    f.coordinator.on_installed(InstallReason::Update).await;

    assert_eq!(f.coordinator.get_settings().position, BarPosition::Bottom);
    assert_eq!(f.host.menus().len(), 3);
}

// ─── Icon click ───

#[tokio::test]
async fn test_icon_click_toggles_window_and_notifies() {
    let f = fixture();
    let a = f.host.add_tab(1, 0, "https://a.com");
    let b = f.host.add_tab(1, 1, "https://b.com");
    let internal = f.host.add_tab(1, 2, "chrome://settings");
    let elsewhere = f.host.add_tab(2, 0, "https://c.com");

    let outcome = f
        .coordinator
        .on_action_clicked(&f.host.tab(a).unwrap())
        .await
        .unwrap();
    assert!(outcome.enabled);
    assert_eq!(outcome.tab_ids, vec![a, b]);
    assert!(outcome.deliveries.iter().all(|(_, d)| d.is_delivered()));
    assert!(f.coordinator.is_tab_enabled(a));
    assert!(f.coordinator.is_tab_enabled(b));
    assert!(!f.coordinator.is_tab_enabled(internal));
    assert!(!f.coordinator.is_tab_enabled(elsewhere));
    assert_eq!(
        f.host.sent_messages(),
        vec![(a, Message::ShowAddressbar), (b, Message::ShowAddressbar)]
    );

    f.host.clear_sent_messages();
    let outcome = f
        .coordinator
        .on_action_clicked(&f.host.tab(b).unwrap())
        .await
        .unwrap();
    assert!(!outcome.enabled);
    assert!(f.coordinator.enabled_tabs().is_empty());
    assert_eq!(
        f.host.sent_messages(),
        vec![(a, Message::HideAddressbar), (b, Message::HideAddressbar)]
    );
}

#[tokio::test]
async fn test_icon_click_partial_enables_rest() {
    let f = fixture();
    let a = f.host.add_tab(1, 0, "https://a.com");
    let b = f.host.add_tab(1, 1, "https://b.com");
    let c = f.host.add_tab(1, 2, "https://c.com");
    f.coordinator.on_action_clicked(&f.host.tab(a).unwrap()).await;
    f.coordinator.on_tab_removed(c);
    let c2 = f.host.add_tab(1, 3, "https://d.com");
    f.host.close_tab(c);

    let outcome = f
        .coordinator
        .on_action_clicked(&f.host.tab(a).unwrap())
        .await
        .unwrap();
    assert!(outcome.enabled);
    assert_eq!(f.coordinator.enabled_tabs(), HashSet::from([a, b, c2]));
}

#[tokio::test]
async fn test_icon_click_unreachable_overlay_still_toggles() {
    let f = fixture();
    let a = f.host.add_tab(1, 0, "https://a.com");
    let b = f.host.add_tab(1, 1, "https://b.com");
    f.host.make_unreachable(b);

    let outcome = f
        .coordinator
        .on_action_clicked(&f.host.tab(a).unwrap())
        .await
        .unwrap();
    assert!(f.coordinator.is_tab_enabled(b));
    assert_eq!(
        outcome.deliveries[1],
        (b, Delivery::Failed(HostError::NoReceiver(b)))
    );
}

#[tokio::test]
async fn test_icon_click_only_internal_pages_is_noop() {
    let f = fixture();
    let a = f.host.add_tab(1, 0, "chrome://newtab");
    f.host.add_tab(1, 1, "chrome-extension://abc/options.html");
    assert!(f
        .coordinator
        .on_action_clicked(&f.host.tab(a).unwrap())
        .await
        .is_none());
    assert!(f.host.sent_messages().is_empty());
}

// ─── Tab close and session ───

#[tokio::test]
async fn test_tab_close_removes_state() {
    let f = fixture();
    let a = f.host.add_tab(1, 0, "https://a.com");
    f.coordinator.on_action_clicked(&f.host.tab(a).unwrap()).await;
    assert!(f.coordinator.is_tab_enabled(a));

    f.coordinator.on_tab_removed(a);
    f.coordinator.on_tab_removed(a);
    assert!(!f.coordinator.is_tab_enabled(a));
}

#[tokio::test]
async fn test_session_end_forgets_enablement_not_settings() {
    let f = fixture();
    let a = f.host.add_tab(1, 0, "https://a.com");
    f.coordinator.save_settings(&json!({"fontSize": 36})).unwrap();
    f.coordinator.on_action_clicked(&f.host.tab(a).unwrap()).await;

    f.session.clear();
    assert!(!f.coordinator.is_tab_enabled(a));
    assert_eq!(f.coordinator.get_settings().font_size, 36);
}

// ─── Open in other tab ───

#[tokio::test]
async fn test_open_in_other_tab_prefers_right_neighbor() {
    let f = fixture();
    let t0 = f.host.add_tab(1, 0, "https://0.com");
    let t1 = f.host.add_tab(1, 1, "https://1.com");
    let t2 = f.host.add_tab(1, 2, "https://2.com");
    f.host.add_tab(1, 3, "https://3.com");

    assert_eq!(
        f.coordinator.open_in_other_tab(t1, "https://x.dev").await,
        Some(t2)
    );
    assert_eq!(f.host.updates(), vec![(t2, "https://x.dev".to_string())]);
    assert_eq!(f.host.tab(t0).unwrap().url.as_deref(), Some("https://0.com"));
}

#[tokio::test]
async fn test_open_in_other_tab_falls_back_left() {
    let f = fixture();
    let t0 = f.host.add_tab(1, 0, "https://0.com");
    let t1 = f.host.add_tab(1, 1, "https://1.com");
    f.host.add_tab(1, 3, "https://3.com");

    assert_eq!(f.coordinator.open_in_other_tab(t1, "https://x.dev").await, Some(t0));
}

#[tokio::test]
async fn test_open_in_other_tab_alone_is_noop() {
    let f = fixture();
    let t0 = f.host.add_tab(1, 0, "https://0.com");
    f.host.add_tab(2, 0, "https://other-window.com");

    assert_eq!(f.coordinator.open_in_other_tab(t0, "https://x.dev").await, None);
    assert!(f.host.updates().is_empty());
}

#[tokio::test]
async fn test_open_in_other_tab_missing_source_is_noop() {
    let f = fixture();
    f.host.add_tab(1, 0, "https://0.com");
    assert_eq!(f.coordinator.open_in_other_tab(99, "https://x.dev").await, None);
    assert!(f.host.updates().is_empty());
}

#[tokio::test]
async fn test_open_in_other_tab_update_failure_is_swallowed() {
    let f = fixture();
    let t0 = f.host.add_tab(1, 0, "https://0.com");
    let t1 = f.host.add_tab(1, 1, "https://1.com");
    f.host.lock_tab(t1);

    assert_eq!(f.coordinator.open_in_other_tab(t0, "https://x.dev").await, None);
    assert!(f.host.updates().is_empty());
}

// ─── Context menu ───

#[tokio::test]
async fn test_menu_link_uses_clicked_tab() {
    let f = fixture();
    let t0 = f.host.add_tab(1, 0, "https://0.com");
    let t1 = f.host.add_tab(1, 1, "https://1.com");
    let info = click(MenuItemId::OpenInOtherTab, Some("https://link.dev"), None);

    let target = f
        .coordinator
        .on_context_menu_clicked(&info, f.host.tab(t0).as_ref())
        .await;
    assert_eq!(target, Some(t1));
    assert_eq!(f.host.tab(t1).unwrap().url.as_deref(), Some("https://link.dev"));
}

#[tokio::test]
async fn test_menu_link_without_tab_uses_active_tab() {
    let f = fixture();
    let t0 = f.host.add_tab(1, 0, "https://0.com");
    let t1 = f.host.add_tab(1, 1, "https://1.com");
    f.host.activate(t1);
    let info = click(MenuItemId::OpenInOtherTab, Some("https://link.dev"), None);

    assert_eq!(f.coordinator.on_context_menu_clicked(&info, None).await, Some(t0));
}

#[tokio::test]
async fn test_menu_link_without_url_is_noop() {
    let f = fixture();
    let t0 = f.host.add_tab(1, 0, "https://0.com");
    f.host.add_tab(1, 1, "https://1.com");
    let info = click(MenuItemId::OpenInOtherTab, None, Some("https://page.dev"));

    assert_eq!(
        f.coordinator
            .on_context_menu_clicked(&info, f.host.tab(t0).as_ref())
            .await,
        None
    );
    assert!(f.host.updates().is_empty());
}

#[tokio::test]
async fn test_menu_page_prefers_tab_url() {
    let f = fixture();
    let t0 = f.host.add_tab(1, 0, "https://tab-url.dev");
    let t1 = f.host.add_tab(1, 1, "https://1.com");
    let info = click(MenuItemId::OpenPageInOtherTab, None, Some("https://page-url.dev"));

    f.coordinator
        .on_context_menu_clicked(&info, f.host.tab(t0).as_ref())
        .await;
    assert_eq!(f.host.updates(), vec![(t1, "https://tab-url.dev".to_string())]);
}

#[tokio::test]
async fn test_menu_page_falls_back_to_page_url() {
    let f = fixture();
    let t0 = f.host.add_tab(1, 0, "https://0.com");
    let t1 = f.host.add_tab(1, 1, "https://1.com");
    let mut tab = f.host.tab(t0).unwrap();
    tab.url = None;
    let info = click(MenuItemId::OpenPageInOtherTab, None, Some("https://page-url.dev"));

    f.coordinator.on_context_menu_clicked(&info, Some(&tab)).await;
    assert_eq!(f.host.updates(), vec![(t1, "https://page-url.dev".to_string())]);
}

#[tokio::test]
async fn test_menu_page_without_tab_is_noop() {
    let f = fixture();
    let t0 = f.host.add_tab(1, 0, "https://0.com");
    f.host.add_tab(1, 1, "https://1.com");
    f.host.activate(t0);
    let info = click(MenuItemId::OpenPageInOtherTab, None, Some("https://page-url.dev"));

    assert_eq!(f.coordinator.on_context_menu_clicked(&info, None).await, None);
    assert!(f.host.updates().is_empty());
}

#[tokio::test]
async fn test_menu_options_opens_settings() {
    let f = fixture();
    let info = click(MenuItemId::OpenOptions, None, None);
    f.coordinator.on_context_menu_clicked(&info, None).await;
    assert_eq!(f.host.options_opened(), 1);
}

// ─── Shortcut, toggle-all, broadcast ───

#[tokio::test]
async fn test_shortcut_toggles_active_tab() {
    let f = fixture();
    f.host.add_tab(1, 0, "https://0.com");
    let t1 = f.host.add_tab(1, 1, "https://1.com");
    f.host.activate(t1);

    let delivery = f.coordinator.on_command("toggle-addressbar").await.unwrap();
    assert!(delivery.is_delivered());
    assert_eq!(f.host.sent_messages(), vec![(t1, Message::ToggleAddressbar)]);
    // The shortcut does not touch the enablement set.
    assert!(!f.coordinator.is_tab_enabled(t1));
}

#[tokio::test]
async fn test_shortcut_without_active_tab() {
    let f = fixture();
    assert!(f.coordinator.on_command("toggle-addressbar").await.is_none());
}

#[tokio::test]
async fn test_toggle_all_skips_internal_pages() {
    let f = fixture();
    let a = f.host.add_tab(1, 0, "https://a.com");
    f.host.add_tab(1, 1, "chrome://extensions");
    let c = f.host.add_tab(2, 0, "https://c.com");

    let deliveries = f.coordinator.toggle_all_tabs().await;
    assert_eq!(deliveries.len(), 2);
    assert_eq!(
        f.host.sent_messages(),
        vec![(a, Message::ToggleAddressbar), (c, Message::ToggleAddressbar)]
    );
    assert!(f.coordinator.enabled_tabs().is_empty());
}

#[tokio::test]
async fn test_broadcast_sends_full_settings() {
    let f = fixture();
    let a = f.host.add_tab(1, 0, "https://a.com");
    let settings = OverlaySettings {
        font_size: 44,
        ..OverlaySettings::default()
    };
    f.coordinator.broadcast_settings(&settings).await;
    assert_eq!(
        f.host.sent_messages(),
        vec![(a, Message::UpdateSettings { settings })]
    );
}
