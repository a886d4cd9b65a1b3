//! Conversation log mirrored to a storage slot
//!
//! The whole log is rewritten on every mutation. Storage failures never reach
//! the caller: a broken slot reads as an empty conversation and failed writes
//! are logged and skipped.

use crate::state::ChatMessage;
use crate::storage::Storage;

/// Storage key holding the JSON-serialized conversation
pub const HISTORY_KEY: &str = "ai_chat_history";

pub struct ConversationStore {
    messages: Vec<ChatMessage>,
    storage: Box<dyn Storage>,
}

impl ConversationStore {
    /// Restore the conversation from `storage`, starting empty if the slot is
    /// missing, unreadable, or not a valid message list.
    pub fn load(storage: Box<dyn Storage>) -> Self {
        let messages = match storage.get(HISTORY_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<ChatMessage>>(&raw) {
                Ok(messages) => messages,
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring unparseable chat history");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read chat history");
                Vec::new()
            }
        };

        tracing::debug!(count = messages.len(), "loaded chat history");
        Self { messages, storage }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.persist();
    }

    /// Empty the log and erase the persisted copy.
    pub fn clear(&mut self) {
        self.messages.clear();
        if let Err(e) = self.storage.remove(HISTORY_KEY) {
            tracing::warn!(error = %e, "could not erase chat history");
        }
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    fn persist(&mut self) {
        let serialized = match serde_json::to_string(&self.messages) {
            Ok(serialized) => serialized,
            Err(e) => {
                tracing::warn!(error = %e, "could not serialize chat history");
                return;
            }
        };
        if let Err(e) = self.storage.set(HISTORY_KEY, &serialized) {
            tracing::warn!(error = %e, "could not save chat history");
        }
    }
}

impl std::fmt::Debug for ConversationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationStore")
            .field("messages", &self.messages)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, MemoryStorage};
    use anyhow::{anyhow, Result};
    use tempfile::TempDir;

    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(anyhow!("disk on fire"))
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(anyhow!("disk on fire"))
        }
        fn remove(&mut self, _key: &str) -> Result<()> {
            Err(anyhow!("disk on fire"))
        }
    }

    #[test]
    fn test_append_persists_whole_log() {
        let mut store = ConversationStore::load(Box::new(MemoryStorage::new()));
        store.append(ChatMessage::user("hi"));
        store.append(ChatMessage::assistant("hello"));

        let raw = store.storage().get(HISTORY_KEY).unwrap().unwrap();
        let persisted: Vec<ChatMessage> = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted, store.messages());
    }

    #[test]
    fn test_restores_existing_history() {
        let raw = r#"[{"role":"user","content":"q"},{"role":"assistant","content":"a"}]"#;
        let store = ConversationStore::load(Box::new(MemoryStorage::with_value(HISTORY_KEY, raw)));
        assert_eq!(store.len(), 2);
        assert_eq!(store.messages().last(), Some(&ChatMessage::assistant("a")));
    }

    #[test]
    fn test_corrupt_history_loads_empty() {
        for raw in ["not json", r#"{"role":"user"}"#, r#"[{"role":"robot","content":"x"}]"#] {
            let store =
                ConversationStore::load(Box::new(MemoryStorage::with_value(HISTORY_KEY, raw)));
            assert!(store.is_empty(), "{raw} should load as empty");
        }
    }

    #[test]
    fn test_broken_storage_is_not_fatal() {
        let mut store = ConversationStore::load(Box::new(BrokenStorage));
        store.append(ChatMessage::user("still works"));
        assert_eq!(store.len(), 1);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear_then_reload_is_empty() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());

        let mut store = ConversationStore::load(Box::new(storage.clone()));
        store.append(ChatMessage::user("one"));
        store.append(ChatMessage::assistant("two"));
        assert_eq!(ConversationStore::load(Box::new(storage.clone())).len(), 2);

        store.clear();
        assert_eq!(storage.get(HISTORY_KEY).unwrap(), None);
        assert!(ConversationStore::load(Box::new(storage)).is_empty());
    }
}
