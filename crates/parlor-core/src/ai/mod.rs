pub mod openai;
pub mod proxy;
pub mod reply;

pub use openai::OpenAIClient;
pub use proxy::ProxyClient;
pub use reply::{Reply, FALLBACK_REPLY};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::ChatError;
use crate::provider::Provider;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// A remote service that answers a single chat message
#[async_trait]
pub trait ChatEndpoint: Send + Sync {
    /// Short label for logs and the UI title
    fn name(&self) -> &str;

    async fn send(&self, message: &str) -> Result<Reply, ChatError>;
}

fn http_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default HTTP client");
            Client::new()
        })
}

/// Build the endpoint selected by `config`
pub fn build_endpoint(config: &Config) -> Result<Arc<dyn ChatEndpoint>> {
    let provider = config.provider()?;
    let base_url = config.endpoint_url(provider);

    if provider == Provider::Proxy {
        return Ok(Arc::new(ProxyClient::new(&base_url)));
    }

    let api_key = config.api_key(provider).ok_or_else(|| {
        anyhow!(
            "{} API key not configured. Set {} or add it to {}",
            provider.display_name(),
            provider.api_key_env().unwrap_or("the API key"),
            Config::get_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "the config file".to_string()),
        )
    })?;
    let model = config
        .model(provider)
        .ok_or_else(|| anyhow!("No model configured for {}", provider.display_name()))?;

    Ok(Arc::new(OpenAIClient::new(
        provider.as_str(),
        &base_url,
        &api_key,
        &model,
    )))
}
