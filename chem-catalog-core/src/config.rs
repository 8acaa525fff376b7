use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::Result;

pub const CONFIG_FILE_NAME: &str = "chem-catalog.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Where the bearer token is persisted. `None` means the per-user config dir.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub window_width: f32,
    pub window_height: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub ui: UiConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            window_width: 1200.0,
            window_height: 800.0,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl CatalogConfig {
    /// Load configuration from file with environment variable overrides.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load() -> Result<Self> {
        let path = env::var("CHEM_CATALOG_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE_NAME));

        let mut config = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            debug!("{} not found, using defaults", path.display());
            CatalogConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: CatalogConfig = toml::from_str(content)?;
        config.api.base_url = normalize_base_url(&config.api.base_url);
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("CHEM_CATALOG_API_URL") {
            self.api.base_url = normalize_base_url(&url);
        }
        if let Ok(timeout) = env::var("CHEM_CATALOG_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => warn!("ignoring CHEM_CATALOG_TIMEOUT_SECS={timeout}: not a number"),
            }
        }
        if let Ok(path) = env::var("CHEM_CATALOG_SESSION") {
            self.session.path = Some(PathBuf::from(path));
        }
    }

    /// Session file location, falling back to `<config dir>/chem-catalog/session.json`.
    pub fn session_path(&self) -> PathBuf {
        self.session.path.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("chem-catalog")
                .join("session.json")
        })
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_localhost() {
        let config = CatalogConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert!(config.session.path.is_none());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config = CatalogConfig::from_toml(
            r#"
            [api]
            base_url = "https://catalog.example.com/"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://catalog.example.com");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.ui, UiConfig::default());
    }

    #[test]
    fn session_path_override_is_used() {
        let config = CatalogConfig::from_toml(
            r#"
            [session]
            path = "/tmp/catalog-session.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.session_path(), PathBuf::from("/tmp/catalog-session.json"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(CatalogConfig::from_toml("[api\nbase_url = 3").is_err());
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let api = ApiConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(api.timeout(), Duration::from_secs(1));
    }
}
