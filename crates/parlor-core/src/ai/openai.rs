use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{http_client, ChatEndpoint, Reply};
use crate::error::ChatError;

pub const DEFAULT_MAX_TOKENS: u32 = 150;

#[derive(Serialize)]
struct OpenAIMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

/// Client for any OpenAI-compatible chat completions API (OpenAI, Groq,
/// Hugging Face router)
#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    name: String,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAIClient {
    pub fn new(name: &str, base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client: http_client(),
            name: name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl ChatEndpoint for OpenAIClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, message: &str) -> Result<Reply, ChatError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = OpenAIRequest {
            model: &self.model,
            messages: vec![OpenAIMessage {
                role: "user",
                content: message,
            }],
            max_tokens: DEFAULT_MAX_TOKENS,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ChatError::remote(&self.name, status.as_u16(), text));
        }

        let body = response.bytes().await?;
        let content = match serde_json::from_slice::<OpenAIResponse>(&body) {
            Ok(parsed) => parsed
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content),
            Err(e) => {
                tracing::debug!(provider = %self.name, error = %e, "unrecognized completion body");
                None
            }
        };

        Ok(Reply::from(content))
    }
}
