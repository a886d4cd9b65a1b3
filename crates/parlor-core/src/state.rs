//! UI-agnostic conversation types
//!
//! These are the records persisted by the conversation store and shared with
//! any front end that renders a conversation.

use serde::{Deserialize, Serialize};

/// A single chat message in the conversation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn test_reads_browser_style_history() {
        let raw = r#"[{"role":"user","content":"hello"},{"role":"assistant","content":"hey"}]"#;
        let log: Vec<ChatMessage> = serde_json::from_str(raw).unwrap();
        assert_eq!(log, vec![ChatMessage::user("hello"), ChatMessage::assistant("hey")]);
    }
}
