// Split Tab Plus platform abstraction
// Resolves the per-OS directory holding the persistent settings file.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Directory name used on case-sensitive platforms.
pub const APP_DIR_NAME: &str = "split-tab-plus";

/// Returns the platform-specific configuration directory.
///
/// - **Linux**: `~/.config/split-tab-plus` (or `$XDG_CONFIG_HOME/split-tab-plus`)
/// - **macOS**: `~/Library/Application Support/Split-Tab-Plus`
/// - **Windows**: `%APPDATA%/Split-Tab-Plus`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}
