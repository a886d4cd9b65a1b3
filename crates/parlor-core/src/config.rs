use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Context, Result, anyhow};

use crate::provider::Provider;
use crate::typing::DEFAULT_CHAR_DELAY;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub provider: Option<String>,
    pub endpoint_url: Option<String>,
    pub model: Option<String>,
    pub typing_delay_ms: Option<u64>,
    pub openai_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub huggingface_api_key: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            provider: Some(Provider::Proxy.as_str().to_string()),
            ..Self::default()
        }
    }

    /// Load from the default location, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("Invalid config {:?}", path))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Configured provider; unknown names are an error rather than a silent default
    pub fn provider(&self) -> Result<Provider> {
        match self.provider.as_deref() {
            None => Ok(Provider::Proxy),
            Some(name) => Provider::from_str(name)
                .ok_or_else(|| anyhow!("Unknown provider '{}'", name)),
        }
    }

    pub fn endpoint_url(&self, provider: Provider) -> String {
        self.endpoint_url
            .clone()
            .unwrap_or_else(|| provider.default_endpoint().to_string())
    }

    pub fn model(&self, provider: Provider) -> Option<String> {
        self.model
            .clone()
            .or_else(|| provider.default_model().map(str::to_string))
    }

    pub fn typing_delay(&self) -> Duration {
        self.typing_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_CHAR_DELAY)
    }

    /// API key for `provider`: environment first, then config
    pub fn api_key(&self, provider: Provider) -> Option<String> {
        let from_env = provider
            .api_key_env()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.is_empty());

        from_env.or_else(|| match provider {
            Provider::Proxy => None,
            Provider::OpenAI => self.openai_api_key.clone(),
            Provider::Groq => self.groq_api_key.clone(),
            Provider::HuggingFace => self.huggingface_api_key.clone(),
        })
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("parlor").join("config.json"))
    }
}

/// Directory for chat history and logs
pub fn data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| anyhow!("Could not determine data directory"))?;

    Ok(data_dir.join("parlor"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.provider().unwrap(), Provider::Proxy);
        assert_eq!(config.endpoint_url(Provider::Proxy), "http://localhost:3000");
        assert_eq!(config.typing_delay(), DEFAULT_CHAR_DELAY);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub").join("config.json");
        let config = Config {
            provider: Some("groq".to_string()),
            model: Some("mixtral".to_string()),
            typing_delay_ms: Some(5),
            ..Config::new()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.provider().unwrap(), Provider::Groq);
        assert_eq!(loaded.model(Provider::Groq).as_deref(), Some("mixtral"));
        assert_eq!(loaded.typing_delay(), Duration::from_millis(5));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"provider":"openai"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.provider().unwrap(), Provider::OpenAI);
        assert_eq!(config.model(Provider::OpenAI).as_deref(), Some("gpt-3.5-turbo"));
        assert_eq!(config.endpoint_url(Provider::OpenAI), "https://api.openai.com/v1");
    }

    #[test]
    fn test_unknown_provider_is_error() {
        let config = Config {
            provider: Some("carrier-pigeon".to_string()),
            ..Config::default()
        };
        assert!(config.provider().is_err());
    }
}
