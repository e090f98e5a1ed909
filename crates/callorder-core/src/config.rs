use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{CallOrderError, Result};

/// Top-level configuration for the ordering line.
///
/// Loaded from `~/.callorder/config.toml` by default. Every section has
/// defaults, so a partial or empty file is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallOrderConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub dialog: DialogConfig,
    #[serde(default)]
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl CallOrderConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CallOrderConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| CallOrderError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the order database and order files.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.callorder/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl GeneralConfig {
    /// Data directory with a leading `~` expanded to the home directory.
    pub fn resolved_data_dir(&self) -> PathBuf {
        let dir = self.data_dir.as_str();
        if let Some(rest) = dir.strip_prefix("~/").or_else(|| dir.strip_prefix("~\\")) {
            #[cfg(target_os = "windows")]
            let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
            #[cfg(not(target_os = "windows"))]
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(rest)
        } else {
            PathBuf::from(dir)
        }
    }
}

/// Turn handling settings for the dialog engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogConfig {
    /// Consecutive empty turns before the call is ended.
    pub max_silence_turns: u32,
    /// Keypad digits collected while the caller is naming a dish.
    pub ordering_digits: u8,
    /// Keypad digits collected for option choices and yes/no answers.
    pub selection_digits: u8,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            max_silence_turns: 3,
            ordering_digits: 2,
            selection_digits: 1,
        }
    }
}

/// AI-assisted item matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Whether the AI fallback is consulted at all.
    pub enabled: bool,
    /// Chat model name.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Chat completions endpoint.
    pub base_url: String,
    /// Hard budget for one matching request, in milliseconds.
    pub timeout_ms: u64,
    /// Candidates at or below this confidence are rejected.
    pub confidence_threshold: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: "gpt-4o".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com/v1/chat/completions".to_string(),
            timeout_ms: 3000,
            confidence_threshold: 0.6,
        }
    }
}

/// Order persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend: "sqlite" or "json".
    pub backend: String,
    /// SQLite file name inside the data directory.
    pub db_file: String,
    /// Directory for one-JSON-file-per-order output, relative to the data directory.
    pub orders_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            db_file: "orders.db".to_string(),
            orders_dir: "orders".to_string(),
        }
    }
}

/// Catalog source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path to the catalog directory TOML file.
    pub path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: "catalogs.toml".to_string(),
        }
    }
}
