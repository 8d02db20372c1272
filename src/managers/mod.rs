// Split Tab Plus state managers
// Managers hold the decision logic of the coordinator: per-tab enablement and sibling selection.

pub mod sibling_selector;
pub mod tab_state_manager;
