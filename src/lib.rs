//! memoduet - Idea exploration through a two-persona dialogue
//!
//! Alfred (constructive critic) and Bernard (curious optimist) discuss an
//! idea in alternating turns through a chat completion service. The
//! dialogue is bounded by a token budget, an iteration cap and a stop
//! marker, then summarized and titled into a memo.
//!
//! # Architecture
//!
//! - **Core**: token estimation, conversation store, turn scheduler,
//!   stop detection, summary finalization
//! - **Edges**: completion client, idea intake, memo delivery, CLI

pub mod errors;
pub mod types;
pub mod context;
pub mod budget;
pub mod completion;
pub mod dialogue;

// Re-export commonly used types
pub use errors::{DialogueError, Result};

pub mod intake;
pub mod delivery;
pub mod execution;
pub mod cli;
pub mod telemetry;
