//! Agent settings

use std::path::{Path, PathBuf};

use dock_detect::ScannerConfig;
use dock_watch::WatchConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::hooks::HookCommand;

/// Agent settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Discovery and polling timing, plus serial link parameters
    pub watch: WatchConfig,
    /// Ports whose name contains any of these are never probed
    pub skip_patterns: Vec<String>,
    /// Command run when the headphones are placed on the holder
    pub on_docked: Option<HookCommand>,
    /// Command run when the headphones are lifted
    pub on_undocked: Option<HookCommand>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            watch: WatchConfig::default(),
            skip_patterns: ScannerConfig::default_skip_patterns(),
            on_docked: None,
            on_undocked: None,
        }
    }
}

impl Settings {
    /// Get the XDG config directory for dockswitch
    /// Uses $XDG_CONFIG_HOME/dockswitch, falls back to ~/.config/dockswitch
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("dockswitch"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("dockswitch"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from disk, writing the defaults on first run
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine settings path, using defaults");
            return Self::default();
        };

        if !path.exists() {
            let settings = Self::default();
            match settings.save_to(&path) {
                Ok(()) => info!("Wrote default settings to {}", path.display()),
                Err(e) => warn!("{}", e),
            }
            return settings;
        }

        Self::load_from(&path)
    }

    /// Load settings from a file, falling back to defaults if unreadable
    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                return Self::default();
            }
        };

        serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!("Ignoring invalid settings in {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Save settings to a file
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create settings directory: {}", e))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;

        std::fs::write(path, json).map_err(|e| format!("Failed to write settings: {}", e))?;

        Ok(())
    }

    pub fn scanner_config(&self) -> ScannerConfig {
        ScannerConfig {
            skip_patterns: self.skip_patterns.clone(),
        }
    }
}
