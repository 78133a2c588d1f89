//! Configuration management for linkshelf.
//!
//! Configuration is read from `~/.config/linkshelf/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod colors;
pub mod keybindings;

pub use colors::ColorConfig;
pub use keybindings::KeybindingConfig;

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::{SortOrder, ViewKind};
use crate::sync::{ViewSettings, DEFAULT_PAGE_SIZE};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub view: ViewConfig,
    pub colors: ColorConfig,
    pub keybindings: KeybindingConfig,
}

/// Remote service endpoint and credentials.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub consumer_key: String,
    pub access_token: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://getpocket.com".to_string(),
            consumer_key: String::new(),
            access_token: String::new(),
            timeout_secs: 10,
        }
    }
}

/// How views are presented and kept fresh.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub page_size: usize,
    pub default_view: ViewKind,
    pub order: SortOrder,
    pub archive_after_open: bool,
    /// `"30m"`, `"1h"`, `"90s"` or `"off"`.
    pub update_interval: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            default_view: ViewKind::List,
            order: SortOrder::Asc,
            archive_after_open: false,
            update_interval: "30m".to_string(),
        }
    }
}

impl ViewConfig {
    pub fn settings(&self) -> ViewSettings {
        ViewSettings {
            page_size: self.page_size,
            order: self.order,
            archive_after_open: self.archive_after_open,
            default_view: self.default_view,
        }
    }

    /// Period of the background refresh, `None` when disabled.
    pub fn update_interval(&self) -> Result<Option<Duration>, ConfigError> {
        parse_interval(&self.update_interval).map_err(|message| ConfigError::Invalid {
            field: "view.update_interval",
            message,
        })
    }
}

/// Parse `<number><s|m|h>`; `off`, `never` and `0` disable.
pub fn parse_interval(s: &str) -> Result<Option<Duration>, String> {
    let s = s.trim().to_lowercase();
    if matches!(s.as_str(), "off" | "never" | "0" | "") {
        return Ok(None);
    }

    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| format!("Missing unit in interval: {}", s))?;
    let (value, unit) = s.split_at(split);
    let value: u64 = value
        .parse()
        .map_err(|_| format!("Invalid interval: {}", s))?;

    let scale = match unit {
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => return Err(format!("Unknown interval unit: {}", unit)),
    };
    let secs = value
        .checked_mul(scale)
        .ok_or_else(|| format!("Interval too large: {}", s))?;

    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            Self::create_default_config(config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
            path: config_path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        config.view.update_interval()?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/linkshelf/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("linkshelf").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        tracing::info!("Wrote default configuration to {}", path.display());
        Ok(())
    }

    fn default_config_content() -> &'static str {
        r##"# linkshelf configuration
#
# Colors can be specified as:
# - Named colors: Black, Red, Green, Yellow, Blue, Magenta, Cyan, Gray,
#   DarkGray, LightRed, LightGreen, LightYellow, LightBlue, LightMagenta,
#   LightCyan, White, Reset
# - Hex colors: "#RRGGBB" or "#RGB"
#
# Keybindings can be specified as:
# - Single characters: "a", "A", "1"
# - Special keys: Enter, Tab, BackTab, Backspace, Delete, Home, End,
#   PageUp, PageDown, Up, Down, Left, Right, Esc, Space, F1-F12
# - With modifiers: "Ctrl+c", "Shift+Tab", "Alt+Enter"

[api]
base_url = "https://getpocket.com"
# Both are required to talk to the service
consumer_key = ""
access_token = ""
timeout_secs = 10

[view]
# Items rendered per slice
page_size = 18
# "list" or "archive"
default_view = "list"
# "asc" keeps the service order, "desc" reverses it
order = "asc"
# Archive an item from My List when it is opened
archive_after_open = false
# Background refresh of the active view in the terminal UI: "30m", "1h", "off"
update_interval = "30m"

[colors]
active_border = "Cyan"
inactive_border = "DarkGray"
selection_bg = "Cyan"
selection_fg = "Black"
title = "White"
domain = "DarkGray"
favorite = "Yellow"
tags = "Magenta"
date = "Yellow"
link = "Blue"
status_fg = "White"
status_bg = "DarkGray"
error = "Red"

[keybindings]
quit = ["q", "Ctrl+c"]
move_up = ["k", "Up"]
move_down = ["j", "Down"]
switch_view = ["Tab"]
toggle_read = ["r"]
toggle_favorite = ["s"]
delete = ["d", "Delete"]
edit_tags = ["t"]
add_item = ["a"]
open_in_browser = ["o"]
refresh = ["R"]
toggle_maximize = ["m"]
"##
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}
