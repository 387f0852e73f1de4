//! Conversation sessions.

pub mod conversation;

pub use conversation::ConversationSession;
