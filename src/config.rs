//! YAML configuration for the `ankide` binary.
//!
//! ```yaml
//! output: ~/Dropbox/words.csv
//! wiktionary:
//!   base_url: https://de.wiktionary.org/w/index.php
//!   timeout_secs: 10
//! translator:
//!   endpoint: https://api.cognitive.microsofttranslator.com
//!   key: <subscription key>
//!   region: westeurope
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_WIKTIONARY_URL: &str = "https://de.wiktionary.org/w/index.php";
pub const DEFAULT_TRANSLATOR_ENDPOINT: &str = "https://api.cognitive.microsofttranslator.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Flashcard file; `~` is expanded.
    pub output: Option<PathBuf>,
    pub wiktionary: WiktionaryConfig,
    pub translator: TranslatorConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WiktionaryConfig {
    /// `index.php` of the wiki; pages are requested with `action=raw`.
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for WiktionaryConfig {
    fn default() -> Self {
        WiktionaryConfig {
            base_url: DEFAULT_WIKTIONARY_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub endpoint: String,
    pub key: Option<String>,
    pub region: Option<String>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        TranslatorConfig {
            endpoint: DEFAULT_TRANSLATOR_ENDPOINT.to_string(),
            key: None,
            region: None,
        }
    }
}

impl Config {
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(text).context("Failed to parse configuration YAML")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        Config::from_yaml(&text).with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Load `explicit` if given (it must exist), else the default location
    /// when a file is there, else built-in defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Config::load(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Config::load(&path),
                _ => Ok(Config::default()),
            },
        }
    }

    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => expand_home(path),
            None => default_output_path(),
        }
    }
}

/// `<config_dir>/ankide/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ankide").join("config.yaml"))
}

/// `$HOME/Dropbox/words.csv`
pub fn default_output_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join("Dropbox")
        .join("words.csv")
}

/// Replace a leading `~` component with the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests for Config
// ─────────────────────────────────────────────────────────────────────────────
