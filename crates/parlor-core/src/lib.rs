pub mod ai;
pub mod chat;
pub mod config;
pub mod error;
pub mod provider;
pub mod richtext;
pub mod state;
pub mod storage;
pub mod store;
pub mod typing;

// Re-export main types for convenience
pub use ai::{build_endpoint, ChatEndpoint, OpenAIClient, ProxyClient, Reply};
pub use chat::{ChatController, PendingRequest, ERROR_REPLY};
pub use config::Config;
pub use error::ChatError;
pub use provider::Provider;
pub use richtext::{Block, Inline};
pub use state::{ChatMessage, ChatRole};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::ConversationStore;
pub use typing::{Typewriter, TypingStep};
