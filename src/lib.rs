//! Split Tab Plus: a floating address bar for split-screen browser tabs.
//!
//! This library crate exposes the coordinator, the page overlay controller and
//! the settings panel for use by the stdio bridge binary and integration tests.

pub mod bridge;
pub mod config;
pub mod coordinator;
pub mod host;
pub mod managers;
pub mod message_handler;
pub mod platform;
pub mod services;
pub mod types;
