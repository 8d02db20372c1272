// Split Tab Plus platform paths for Linux
// Config: $XDG_CONFIG_HOME/split-tab-plus, else ~/.config/split-tab-plus

use std::env;
use std::path::PathBuf;

use super::APP_DIR_NAME;

pub fn get_config_dir() -> PathBuf {
    config_dir_from(env::var("XDG_CONFIG_HOME").ok(), env::var("HOME").ok())
}

fn config_dir_from(xdg_config_home: Option<String>, home: Option<String>) -> PathBuf {
    match xdg_config_home.filter(|v| !v.is_empty()) {
        Some(xdg) => PathBuf::from(xdg).join(APP_DIR_NAME),
        None => PathBuf::from(home.unwrap_or_else(|| String::from("/tmp")))
            .join(".config")
            .join(APP_DIR_NAME),
    }
}
