// Split Tab Plus Settings Engine
// Loads, merges and persists the shared overlay settings.
// Settings are stored as one JSON object under a fixed key of the persistent store.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::host::KeyValueStore;
use crate::types::errors::SettingsError;
use crate::types::settings::OverlaySettings;

/// Persistent-store key holding the settings object.
pub const SETTINGS_KEY: &str = "splitTabPlusSettings";

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<OverlaySettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &OverlaySettings;
    fn merge(&mut self, patch: &Value) -> Result<OverlaySettings, SettingsError>;
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn install_defaults(&mut self) -> Result<(), SettingsError>;
}

/// Settings engine backed by a key-value store.
pub struct SettingsEngine {
    store: Arc<dyn KeyValueStore>,
    settings: OverlaySettings,
}

impl SettingsEngine {
    /// Creates an engine holding default settings until `load` is called.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            settings: OverlaySettings::default(),
        }
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the store.
    ///
    /// An absent entry yields defaults. Missing fields are filled with their
    /// defaults. A malformed entry is a serialization error and leaves the
    /// in-memory settings unchanged.
    fn load(&mut self) -> Result<OverlaySettings, SettingsError> {
        let stored = self.store.get(SETTINGS_KEY)?;
        let settings = match stored {
            None => OverlaySettings::default(),
            Some(value) => serde_json::from_value::<OverlaySettings>(value)
                .map_err(|e| {
                    SettingsError::Serialization(format!("Failed to parse stored settings: {}", e))
                })?
                .normalized(),
        };
        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Writes the in-memory settings to the store.
    fn save(&self) -> Result<(), SettingsError> {
        let value = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::Serialization(format!("Failed to serialize settings: {}", e))
        })?;
        self.store.set(SETTINGS_KEY, value)?;
        Ok(())
    }

    fn get_settings(&self) -> &OverlaySettings {
        &self.settings
    }

    /// Merges the fields of `patch` over the current settings and persists.
    ///
    /// `patch` must be a JSON object. Unknown fields are ignored; a known field
    /// with a value of the wrong type rejects the whole patch.
    ///
    /// # Examples
    /// - `{"fontSize": 40}` → only `font_size` changes
    /// - `{"position": "bottom", "autoHide": true}` → two fields change
    fn merge(&mut self, patch: &Value) -> Result<OverlaySettings, SettingsError> {
        let fields = patch.as_object().ok_or_else(|| {
            SettingsError::InvalidValue("settings patch must be an object".to_string())
        })?;

        let mut current = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::Serialization(format!("Failed to serialize settings: {}", e))
        })?;
        let target = current.as_object_mut().ok_or_else(|| {
            SettingsError::Serialization("settings did not serialize to an object".to_string())
        })?;

        for (key, value) in fields {
            if target.contains_key(key) {
                target.insert(key.clone(), value.clone());
            } else {
                debug!(key = %key, "Ignoring unknown settings field");
            }
        }

        let merged: OverlaySettings = serde_json::from_value(current)
            .map_err(|e| SettingsError::InvalidValue(format!("Invalid settings patch: {}", e)))?;

        self.settings = merged.normalized();
        self.save()?;
        Ok(self.settings.clone())
    }

    /// Sets a single field by its wire name (e.g. `"fontSize"`).
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }
        let known = serde_json::to_value(&self.settings)
            .ok()
            .and_then(|v| v.get(key).map(|_| ()))
            .is_some();
        if !known {
            return Err(SettingsError::InvalidKey(format!("Unknown setting: {}", key)));
        }
        let mut patch = serde_json::Map::new();
        patch.insert(key.to_string(), value);
        self.merge(&Value::Object(patch)).map(|_| ())
    }

    /// Resets to defaults and persists.
    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = OverlaySettings::default();
        self.save()
    }

    /// Writes factory defaults, as done on first install.
    fn install_defaults(&mut self) -> Result<(), SettingsError> {
        debug!("Installing default settings");
        self.reset()
    }
}
