//! TOML configuration for the whole pipeline.
//!
//! Every section is optional; anything left out falls back to the defaults
//! below, so an absent config file is equivalent to an empty one.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

pub const DEFAULT_CONFIG_FILE: &str = "newsdesk.toml";

/// Headline provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsApiConfig {
    pub base_url: String,
    /// Name of the environment variable holding the key
    pub api_key_env: String,
    /// Inline key, takes precedence over the environment
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org/v2".to_string(),
            api_key_env: "NEWSAPI_KEY".to_string(),
            api_key: None,
            timeout_seconds: 30,
        }
    }
}

impl NewsApiConfig {
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.clone());
        }
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "no news API key: set {} or news_api.api_key",
                    self.api_key_env
                ))
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub countries: Vec<String>,
    pub page_size: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            countries: ["us", "gb", "in", "au", "ca", "de", "fr"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            page_size: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub raw_path: PathBuf,
    pub enriched_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            raw_path: PathBuf::from("news_data.json"),
            enriched_path: PathBuf::from("categorized_news.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub category_path: PathBuf,
    pub sentiment_path: PathBuf,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            category_path: PathBuf::from("best_category_model.json"),
            sentiment_path: PathBuf::from("best_sentiment_model.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Run the pipeline once before serving the dashboard
    pub refresh_on_start: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8501".to_string(),
            refresh_on_start: true,
        }
    }
}

/// Top-level configuration (deserialized from newsdesk.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub news_api: NewsApiConfig,
    pub pipeline: PipelineConfig,
    pub storage: StorageConfig,
    pub models: ModelsConfig,
    pub server: ServerConfig,
}

impl Config {
    pub fn from_toml_str(data: &str) -> Result<Self> {
        toml::from_str(data).map_err(|e| Error::Config(format!("invalid TOML: {}", e)))
    }

    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&data)
    }

    /// Load an explicit file, or the default file when it exists, or defaults.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path).await,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default).await
                } else {
                    tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.pipeline.countries.len(), 7);
        assert_eq!(config.pipeline.page_size, 50);
        assert_eq!(config.storage.raw_path, PathBuf::from("news_data.json"));
        assert_eq!(config.storage.enriched_path, PathBuf::from("categorized_news.json"));
        assert_eq!(config.news_api.base_url, "https://newsapi.org/v2");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [pipeline]
            countries = ["us"]

            [server]
            bind = "0.0.0.0:9000"
            "#,
        )
        .unwrap();
        assert_eq!(config.pipeline.countries, vec!["us".to_string()]);
        assert_eq!(config.pipeline.page_size, 50);
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert!(config.server.refresh_on_start);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml_str("pipeline = [").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_inline_api_key_wins() {
        let config = NewsApiConfig {
            api_key: Some("inline".to_string()),
            api_key_env: "ND_TEST_UNSET_VARIABLE".to_string(),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key().unwrap(), "inline");
    }

    #[test]
    fn test_missing_api_key() {
        let config = NewsApiConfig {
            api_key_env: "ND_TEST_DEFINITELY_UNSET".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.resolve_api_key(), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[models]\ncategory_path = \"models/cat.json\"").unwrap();
        let config = Config::load(Some(file.path())).await.unwrap();
        assert_eq!(config.models.category_path, PathBuf::from("models/cat.json"));
        assert_eq!(config.models.sentiment_path, PathBuf::from("best_sentiment_model.json"));
    }
}
