//! Completion service interface
//!
//! The dialogue core talks to a language model only through
//! [`CompletionService`]; the HTTP client in [`openai`] is one implementation.

pub mod openai;

pub use openai::OpenAiClient;

use crate::errors::Result;
use crate::types::Conversation;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Quality/cost level requested from the completion service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Higher-capability model, used for the opening turns
    Standard,

    /// Cheaper model for the rest of the dialogue and finalization
    Economy,
}

impl ModelTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTier::Standard => "standard",
            ModelTier::Economy => "economy",
        }
    }
}

/// Chat completion backend
///
/// Failures surface as a single error; no partial output is assumed and
/// implementations must not retry on the caller's behalf unless configured to.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Generate the next reply for `messages`, bounded by `max_tokens`
    async fn complete(
        &self,
        messages: &Conversation,
        tier: ModelTier,
        max_tokens: usize,
    ) -> Result<String>;
}

#[async_trait]
impl<T: CompletionService + ?Sized> CompletionService for Arc<T> {
    async fn complete(
        &self,
        messages: &Conversation,
        tier: ModelTier,
        max_tokens: usize,
    ) -> Result<String> {
        (**self).complete(messages, tier, max_tokens).await
    }
}
