// Split Tab Plus shared type definitions
// Each submodule defines types used across the coordinator, overlay and settings panel.

pub mod command;
pub mod context_menu;
pub mod errors;
pub mod message;
pub mod overlay;
pub mod settings;
pub mod tab;
