//! Type definitions module
//!
//! Chat message and conversation types shared by every component.

pub mod messages;

// Re-export commonly used types
pub use messages::{Conversation, Message, Role};
