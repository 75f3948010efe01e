//! Context sizing module
//!
//! Token estimation for persona conversations.

pub mod counter;

// Re-export commonly used types
pub use counter::TokenCounter;
