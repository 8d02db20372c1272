//! Tab Enablement Set.
//!
//! Tracks which tabs currently show the overlay. Presence in the set means
//! enabled; absence (including tabs never seen) means disabled. The set lives
//! in the volatile session store and is discarded when the session ends.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::host::KeyValueStore;
use crate::types::errors::StorageError;
use crate::types::tab::TabId;

/// Session-store key holding the enablement set.
pub const TAB_STATE_KEY: &str = "splitTabPlusTabStates";

/// Trait defining the enablement-set interface.
pub trait TabStateManagerTrait {
    fn enabled_tabs(&self) -> HashSet<TabId>;
    fn is_enabled(&self, tab_id: TabId) -> bool;
    fn set_tabs_enabled(&self, tab_ids: &[TabId], enabled: bool) -> Result<(), StorageError>;
    fn remove_tab(&self, tab_id: TabId);
    fn toggle(&self, candidates: &[TabId]) -> Result<Option<bool>, StorageError>;
}

/// Enablement set stored as `{"<tabId>": true, ...}` in a key-value store.
pub struct TabStateManager {
    store: Arc<dyn KeyValueStore>,
}

impl TabStateManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn read(&self) -> Result<BTreeMap<String, Value>, StorageError> {
        match self.store.get(TAB_STATE_KEY)? {
            Some(Value::Object(map)) => Ok(map.into_iter().collect()),
            Some(_) | None => Ok(BTreeMap::new()),
        }
    }

    fn write(&self, map: BTreeMap<String, Value>) -> Result<(), StorageError> {
        self.store
            .set(TAB_STATE_KEY, Value::Object(map.into_iter().collect()))
    }
}

/// State a bulk toggle moves every candidate to.
///
/// Enable unless every candidate is already enabled, so partial coverage
/// always resolves to enabling the rest.
pub fn next_bulk_state(enabled: &HashSet<TabId>, candidates: &[TabId]) -> bool {
    !candidates.iter().all(|id| enabled.contains(id))
}

impl TabStateManagerTrait for TabStateManager {
    /// Returns the enabled tab ids. A store failure reads as "none enabled".
    fn enabled_tabs(&self) -> HashSet<TabId> {
        match self.read() {
            Ok(map) => map
                .into_iter()
                .filter(|(_, v)| v.as_bool() == Some(true))
                .filter_map(|(k, _)| k.parse::<TabId>().ok())
                .collect(),
            Err(e) => {
                warn!(error = %e, "Failed to read tab states, treating all tabs as disabled");
                HashSet::new()
            }
        }
    }

    fn is_enabled(&self, tab_id: TabId) -> bool {
        self.enabled_tabs().contains(&tab_id)
    }

    fn set_tabs_enabled(&self, tab_ids: &[TabId], enabled: bool) -> Result<(), StorageError> {
        let mut map = self.read()?;
        for id in tab_ids {
            if enabled {
                map.insert(id.to_string(), Value::Bool(true));
            } else {
                map.remove(&id.to_string());
            }
        }
        self.write(map)
    }

    /// Drops a closed tab from the set. Failures are logged and ignored.
    fn remove_tab(&self, tab_id: TabId) {
        if let Err(e) = self.set_tabs_enabled(&[tab_id], false) {
            debug!(tab_id, error = %e, "Failed to clear state of closed tab");
        }
    }

    /// Bulk toggle over `candidates`. Returns the new state, or `None` when
    /// there is nothing to toggle.
    fn toggle(&self, candidates: &[TabId]) -> Result<Option<bool>, StorageError> {
        if candidates.is_empty() {
            return Ok(None);
        }
        let new_state = next_bulk_state(&self.enabled_tabs(), candidates);
        self.set_tabs_enabled(candidates, new_state)?;
        Ok(Some(new_state))
    }
}
