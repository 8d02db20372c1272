//! Integration-level tests for the SettingsEngine on a file-backed store.
//!
//! These exercise loading defaults, merging partial updates, persistence
//! across engine instances, and recovery from a corrupt settings file.

use std::sync::Arc;

use serde_json::json;
use split_tab_plus::host::file_store::JsonFileStore;
use split_tab_plus::services::settings_engine::{SettingsEngine, SettingsEngineTrait, SETTINGS_KEY};
use split_tab_plus::types::settings::{BarPosition, OverlaySettings};
use tempfile::TempDir;

/// Helper: engine over `settings.json` inside a temp directory held by the caller.
fn engine_in_temp(dir: &TempDir) -> SettingsEngine {
    let store = JsonFileStore::new(Some(dir.path().join("settings.json")));
    SettingsEngine::new(Arc::new(store))
}

/// Without a settings file the engine serves defaults.
#[test]
fn test_load_defaults_when_no_file_exists() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    assert_eq!(engine.load().unwrap(), OverlaySettings::default());
    assert!(!dir.path().join("settings.json").exists());
}

/// A merge is visible to a fresh engine reading the same file.
#[test]
fn test_merge_persists_across_instances() {
    let dir = TempDir::new().unwrap();
    {
        let mut engine = engine_in_temp(&dir);
        engine.load().unwrap();
        engine
            .merge(&json!({"position": "bottom", "fontSize": 44}))
            .unwrap();
    }

    let mut engine = engine_in_temp(&dir);
    let loaded = engine.load().unwrap();
    assert_eq!(loaded.position, BarPosition::Bottom);
    assert_eq!(loaded.font_size, 44);
    assert!(loaded.enabled);
}

/// The file holds the settings under their storage key in camelCase.
#[test]
fn test_file_layout() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.install_defaults().unwrap();

    let raw = std::fs::read_to_string(dir.path().join("settings.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        doc[SETTINGS_KEY],
        json!({
            "enabled": true,
            "position": "top",
            "autoHide": false,
            "collapsed": false,
            "fontSize": 26
        })
    );
}

/// A corrupt file is a load error, and a later merge rewrites it.
#[test]
fn test_corrupt_file_reported_then_overwritten() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("settings.json"), "{not json").unwrap();

    let mut engine = engine_in_temp(&dir);
    assert!(engine.load().is_err());
    assert!(engine.merge(&json!({"enabled": false})).is_err());

    std::fs::remove_file(dir.path().join("settings.json")).unwrap();
    let merged = engine.merge(&json!({"enabled": false})).unwrap();
    assert!(!merged.enabled);
    assert!(!engine_in_temp(&dir).load().unwrap().enabled);
}

/// Nested parent directories are created on first save.
#[test]
fn test_save_creates_parent_dirs() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a").join("b").join("settings.json");
    let mut engine = SettingsEngine::new(Arc::new(JsonFileStore::new(Some(path.clone()))));
    engine.set_value("collapsed", json!(true)).unwrap();
    assert!(path.exists());
}
