use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{http_client, ChatEndpoint, Reply};
use crate::error::ChatError;

#[derive(Serialize)]
struct ProxyRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ProxyError {
    error: String,
}

/// Client for a chat proxy exposing `POST /api/chat`
#[derive(Clone)]
pub struct ProxyClient {
    client: Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

#[async_trait]
impl ChatEndpoint for ProxyClient {
    fn name(&self) -> &str {
        "proxy"
    }

    async fn send(&self, message: &str) -> Result<Reply, ChatError> {
        let url = self.url();

        let response = self
            .client
            .post(&url)
            .json(&ProxyRequest { message })
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ProxyError>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
            return Err(ChatError::remote(url, status.as_u16(), message));
        }

        Ok(Reply::from_body(&body))
    }
}
