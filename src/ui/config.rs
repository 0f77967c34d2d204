//! # Configuration Persistence
//!
//! Manages user configuration stored in `~/.config/dtsh/config.json`.
//!
//! ## Overview
//!
//! The [`Config`] struct is deserialized from a JSON file in the user's XDG
//! config directory, next to the command history:
//!
//! ```text
//! ~/.config/dtsh/
//! ├── config.json
//! └── dtsh_history
//! ```
//!
//! ```json
//! {
//!   "theme": "Nord",
//!   "sparse_prompt": true,
//!   "history_size": 500,
//!   "styles": { "dtsh.binding": "bold #88c0d0" }
//! }
//! ```
//!
//! The `directories` crate is used to resolve the platform-appropriate config
//! directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ui::theme::{parse_style, StyleSheet, Theme};

/// Name of the configuration file inside the config directory.
pub const CONFIG_FILE: &str = "config.json";

/// Persisted user configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// The name of the selected theme (must match a built-in theme name).
    #[serde(default = "default_theme_name")]
    pub theme: String,

    /// Print a blank line after each command.
    #[serde(default)]
    pub sparse_prompt: bool,

    /// Maximum number of history entries kept on disk.
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Style overrides, by style name.
    #[serde(default)]
    pub styles: BTreeMap<String, String>,
}

fn default_theme_name() -> String {
    Theme::default_theme().name.to_string()
}

fn default_history_size() -> usize {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme_name(),
            sparse_prompt: false,
            history_size: default_history_size(),
            styles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from a config directory. Falls back to
    /// `Config::default()` (with a logged warning) if the file cannot be read
    /// or parsed.
    pub fn load(config_dir: &Path) -> Self {
        let path = config_dir.join(CONFIG_FILE);
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("ignoring configuration: {:#}", err);
                Self::default()
            }
        }
    }

    /// Load configuration from a specific path. Returns `Config::default()` if
    /// the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// The configured theme, or the default theme if the name is unknown.
    pub fn theme(&self) -> &'static Theme {
        Theme::by_name(&self.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %self.theme, "unknown theme, using default");
            Theme::default_theme()
        })
    }

    /// Build the style registry: the theme's styles, then the overrides.
    ///
    /// Invalid overrides are logged and skipped.
    pub fn stylesheet(&self) -> StyleSheet {
        let mut styles = StyleSheet::from_theme(self.theme());
        for (name, spec) in &self.styles {
            match parse_style(spec) {
                Ok(style) => styles.set(name.as_str(), style),
                Err(err) => tracing::warn!(style = %name, "invalid style override: {}", err),
            }
        }
        styles
    }
}

/// Return the default configuration directory (`~/.config/dtsh` on Linux).
pub fn default_config_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "dtsh")
        .context("Could not determine config directory")?;
    Ok(dirs.config_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::STYLE_DT_BINDING;
    use ratatui::style::{Color, Modifier, Style};
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.theme, "Catppuccin Mocha");
        assert!(!config.sparse_prompt);
        assert_eq!(config.history_size, 1000);
        assert!(config.styles.is_empty());
    }

    #[test]
    fn test_deserialize_missing_fields_use_defaults() {
        let config: Config = serde_json::from_str(r#"{"sparse_prompt": true}"#).expect("deserialize");
        assert_eq!(config.theme, "Catppuccin Mocha");
        assert!(config.sparse_prompt);
        assert_eq!(config.history_size, 1000);
    }

    #[test]
    fn test_load_from_config_dir() {
        let temp_dir = TempDir::new().expect("create temp dir");
        fs::write(
            temp_dir.path().join(CONFIG_FILE),
            r#"{"theme": "Dracula", "history_size": 50, "styles": {"dtsh.binding": "bold red"}}"#,
        )
        .expect("write");

        let loaded = Config::load(temp_dir.path());
        assert_eq!(loaded.theme().name, "Dracula");
        assert_eq!(loaded.history_size, 50);
        assert!(!loaded.sparse_prompt);
        assert_eq!(
            loaded.styles.get(STYLE_DT_BINDING).map(String::as_str),
            Some("bold red")
        );
    }

    #[test]
    fn test_load_from_missing_file_returns_default() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let loaded = Config::load(temp_dir.path());
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_load_invalid_file_returns_default() {
        let temp_dir = TempDir::new().expect("create temp dir");
        fs::write(temp_dir.path().join(CONFIG_FILE), "not json").expect("write");
        assert_eq!(Config::load(temp_dir.path()), Config::default());
    }

    #[test]
    fn test_deny_unknown_fields() {
        let json = r#"{"theme": "Nord", "unknown_field": true}"#;
        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err(), "should reject unknown fields");
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let config = Config {
            theme: "Solarized Neon".to_string(),
            ..Config::default()
        };
        assert_eq!(config.theme().name, "Catppuccin Mocha");
    }

    #[test]
    fn test_stylesheet_overrides() {
        let mut config = Config::default();
        config
            .styles
            .insert(STYLE_DT_BINDING.to_string(), "bold red".to_string());
        config
            .styles
            .insert("dtsh.alias".to_string(), "no-such-color".to_string());

        let styles = config.stylesheet();
        assert_eq!(
            styles.style(STYLE_DT_BINDING),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        );
        // The invalid override keeps the theme style.
        assert_ne!(styles.style("dtsh.alias"), Style::default());
    }
}
