pub mod api;
pub mod config;
pub mod content;
pub mod controller;
pub mod error;
pub mod identity;
pub mod request;
pub mod state;
pub mod store;

// Re-export main types for convenience
pub use api::{AskResponse, Assistant, AssistantClient, DEFAULT_BASE_URL};
pub use config::Config;
pub use content::{parse, Segment};
pub use controller::{ChatController, ChatState};
pub use error::ChatError;
pub use identity::IdentitySelector;
pub use request::{AskRequest, HistoryEntry};
pub use state::{Author, Identity, ImageRef, Message};
pub use store::ConversationStore;
