//! Summary finalization
//!
//! Once the turn loop stops, Alfred is asked to summarize the discussion and
//! the summary is turned into a title. Both calls use the economy tier and
//! run strictly one after the other. Any failure here is fatal to the
//! request and reported with the stage that broke.

use crate::completion::{CompletionService, ModelTier};
use crate::dialogue::personas::{SUMMARY_REQUEST, TITLE_SYSTEM_PROMPT};
use crate::errors::{DialogueError, FinalizationStage, Result};
use crate::types::{Conversation, Message};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Default reply ceiling for the summary call
pub const DEFAULT_SUMMARY_MAX_TOKENS: usize = 1024;

/// Default reply ceiling for the title call
pub const DEFAULT_TITLE_MAX_TOKENS: usize = 60;

/// Closing artifact of a dialogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalTranscript {
    pub title: String,
    pub summary: String,
    pub conversation: Conversation,
}

/// Finalizer configuration
#[derive(Debug, Clone)]
pub struct FinalizerConfig {
    pub summary_max_tokens: usize,
    pub title_max_tokens: usize,
}

impl Default for FinalizerConfig {
    fn default() -> Self {
        Self {
            summary_max_tokens: DEFAULT_SUMMARY_MAX_TOKENS,
            title_max_tokens: DEFAULT_TITLE_MAX_TOKENS,
        }
    }
}

pub struct SummaryFinalizer {
    completion: Arc<dyn CompletionService>,
    config: FinalizerConfig,
}

impl SummaryFinalizer {
    pub fn new(completion: Arc<dyn CompletionService>, config: FinalizerConfig) -> Self {
        Self { completion, config }
    }

    /// Summarize and title Alfred's conversation
    pub async fn finalize(&self, conversation: Conversation) -> Result<FinalTranscript> {
        self.finalize_until_cancelled(conversation, &CancellationToken::new())
            .await
    }

    /// Like [`finalize`](Self::finalize), honoring cancellation between the two calls
    pub async fn finalize_until_cancelled(
        &self,
        conversation: Conversation,
        cancel: &CancellationToken,
    ) -> Result<FinalTranscript> {
        let summary = self.summarize(&conversation).await?;

        if cancel.is_cancelled() {
            tracing::warn!("finalization cancelled after summary");
            return Err(DialogueError::Cancelled);
        }

        let title = self.title(&summary).await?;

        tracing::info!(title = %title, summary_chars = summary.len(), "dialogue finalized");

        Ok(FinalTranscript {
            title,
            summary,
            conversation,
        })
    }

    async fn summarize(&self, conversation: &Conversation) -> Result<String> {
        let request = conversation.extended(Message::user(SUMMARY_REQUEST));

        self.completion
            .complete(&request, ModelTier::Economy, self.config.summary_max_tokens)
            .await
            .map_err(|e| stage_error(FinalizationStage::Summary, e))
    }

    async fn title(&self, summary: &str) -> Result<String> {
        let request = Conversation::from(vec![
            Message::system(TITLE_SYSTEM_PROMPT),
            Message::user(summary),
        ]);

        let raw = self
            .completion
            .complete(&request, ModelTier::Economy, self.config.title_max_tokens)
            .await
            .map_err(|e| stage_error(FinalizationStage::Title, e))?;

        Ok(clean_title(&raw))
    }
}

fn stage_error(stage: FinalizationStage, err: DialogueError) -> DialogueError {
    tracing::error!(stage = %stage, error = %err, "finalization failed");
    DialogueError::Finalization {
        stage,
        message: err.to_string(),
    }
}

/// Strip whitespace, a `Title:` prefix and wrapping quotes
fn clean_title(raw: &str) -> String {
    let mut title = raw.trim();

    if let Some(rest) = title.strip_prefix("Title:") {
        title = rest.trim();
    }

    title
        .trim_matches(|c| c == '"' || c == '\'' || c == '“' || c == '”')
        .trim()
        .to_string()
}
