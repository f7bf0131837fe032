//! Configuration file support for vibe-piano
//!
//! Configuration is stored in TOML format at:
//! - Linux: `~/.config/vibe-piano/config.toml`
//! - macOS: `~/Library/Application Support/vibe-piano/config.toml`
//! - Windows: `%APPDATA%\vibe-piano\config.toml`

use crate::error::{Error, Result};
use crate::style::PianoStyle;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "vibe-piano";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Piano style handed to the view at startup
    pub piano: PianoStyle,
    /// Terminal host settings
    pub terminal: TerminalSettings,
}

impl Config {
    /// Load configuration from the default config file location
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Err(Error::Config(format!("Config file not found at {:?}", path)))
        }
    }

    /// Load configuration or return default if not found
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Using default configuration: {}", e);
                Self::default()
            }
        }
    }

    /// Load and validate configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.piano.validate()?;
        Ok(config)
    }

    /// Save configuration to the default config file location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Create a default config file with comments
    pub fn create_default_config_file() -> Result<PathBuf> {
        let path = Self::config_path()?;
        Self::write_default_config_file(&path)?;
        Ok(path)
    }

    fn write_default_config_file(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = r##"# vibe-piano configuration file
# https://github.com/trusch/vibelang

[piano]
# Number of keys (1-88)
number_of_keys = 24

# Black key size relative to white key width / view height (0.05-1.0)
black_key_width_scale = 0.6
black_key_height_scale = 0.6

# Colors: a name ("white", "black", "cyan", ...), "#RRGGBB" or "#AARRGGBB"
white_key_color = "white"
black_key_color = "black"
pressed_key_color = "#4FC3F7"
key_stroke_color = "black"

# Key border width and corner radius in pixels
key_stroke_width = 4
key_corner_radius = 8

# When touches highlight keys: "on_down", "on_click" or "off"
show_press_mode = "on_down"

# Allow several highlighted keys at once (also enables multi-pointer input)
multi_key_highlighting = true

[terminal]
# Size of one terminal cell in piano pixels
pixels_per_column = 8
pixels_per_row = 16

# Where "s" saves and "r" restores the piano state
# (default: the vibe-piano data directory)
# state_file = "/tmp/vibe-piano-state.toml"

# Number of recent piano events listed under the keyboard
event_log_len = 8

# Show keyboard shortcuts help
show_help = true
"##;

        fs::write(path, content)?;
        Ok(())
    }

    /// File used to save and restore the piano state
    pub fn state_file(&self) -> Result<PathBuf> {
        match &self.terminal.state_file {
            Some(path) => Ok(path.clone()),
            None => project_dirs().map(|dirs| dirs.data_dir().join("state.toml")),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
}

/// Terminal host settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalSettings {
    /// Width of one terminal column in piano pixels
    pub pixels_per_column: u32,
    /// Height of one terminal row in piano pixels
    pub pixels_per_row: u32,
    /// State file override
    pub state_file: Option<PathBuf>,
    /// Number of recent events to show
    pub event_log_len: usize,
    /// Show help text
    pub show_help: bool,
}

impl Default for TerminalSettings {
    fn default() -> Self {
        Self {
            pixels_per_column: 8,
            pixels_per_row: 16,
            state_file: None,
            event_log_len: 8,
            show_help: true,
        }
    }
}
