use serde::Deserialize;

/// Shown when an endpoint answers without usable reply text
pub const FALLBACK_REPLY: &str = "Sorry, I could not generate a response.";

/// Reply text as resolved at the network boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `{"reply": {"content": "..."}}`
    Content(String),
    /// `{"reply": "..."}`
    Text(String),
    /// No reply, or a body we could not read
    Missing,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReplyField {
    Message { content: String },
    Text(String),
}

#[derive(Deserialize)]
struct ReplyEnvelope {
    reply: Option<ReplyField>,
}

impl Reply {
    /// Resolve a proxy response body. Never fails: unknown shapes are `Missing`.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<ReplyEnvelope>(body) {
            Ok(ReplyEnvelope {
                reply: Some(ReplyField::Message { content }),
            }) => Reply::Content(content),
            Ok(ReplyEnvelope {
                reply: Some(ReplyField::Text(text)),
            }) => Reply::Text(text),
            Ok(ReplyEnvelope { reply: None }) => Reply::Missing,
            Err(e) => {
                tracing::debug!(error = %e, "unrecognized reply body");
                Reply::Missing
            }
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Reply::Content(text) | Reply::Text(text) => text,
            Reply::Missing => FALLBACK_REPLY.to_string(),
        }
    }
}

impl From<Option<String>> for Reply {
    fn from(content: Option<String>) -> Self {
        content.map_or(Reply::Missing, Reply::Content)
    }
}
