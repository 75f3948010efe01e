//! Idea intake
//!
//! Turns free-form text (a transcript or a typed message) into a
//! [`DialogueBrief`]. The facilitator asks the completion service to wrap
//! the idea and any instructions in markers, then the markers are parsed.

use crate::completion::{CompletionService, ModelTier};
use crate::dialogue::personas::DialogueBrief;
use crate::errors::{DialogueError, Result};
use crate::types::{Conversation, Message};
use regex::Regex;
use std::sync::{Arc, LazyLock};

/// System prompt for the facilitator call
pub const FACILITATOR_PROMPT: &str = "Your role is to be an idea facilitator and exploration coordinator. Collect ideas from the user and any optional instructions on how the idea should be explored, the amount of exploration, or specific aspects to consider. Then, provide the idea and any instructions in two separate formats that can be easily extracted later. Start the idea with 'BEGIN_IDEA' and end with 'END_IDEA.' Start the instructions with 'BEGIN_INSTRUCTIONS' and end with 'END_INSTRUCTIONS' for clarity. Only use the instructions part if the user has provided instructions as stated earlier.";

/// Reply ceiling for the facilitator call
pub const FACILITATOR_MAX_TOKENS: usize = 500;

static IDEA_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)BEGIN_IDEA(.+?)END_IDEA").expect("invalid idea pattern"));

static INSTRUCTIONS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)BEGIN_INSTRUCTIONS(.*?)END_INSTRUCTIONS").expect("invalid instructions pattern")
});

/// Strip the punctuation models tend to glue onto the markers
fn clean_section(raw: &str) -> &str {
    raw.trim().trim_start_matches(':').trim_end_matches('.').trim()
}

/// Extract a brief from marker-delimited text
pub fn parse_brief(text: &str) -> Result<DialogueBrief> {
    let idea = IDEA_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| clean_section(m.as_str()))
        .filter(|idea| !idea.is_empty())
        .ok_or_else(|| DialogueError::Intake("No BEGIN_IDEA ... END_IDEA section found".to_string()))?;

    let brief = DialogueBrief::new(idea);

    let instructions = INSTRUCTIONS_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| clean_section(m.as_str()));

    Ok(match instructions {
        Some(instructions) => brief.with_instructions(instructions),
        None => brief,
    })
}

/// Asks the completion service to restate a message as a brief
pub struct IdeaFacilitator {
    completion: Arc<dyn CompletionService>,
}

impl IdeaFacilitator {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self { completion }
    }

    pub async fn facilitate(&self, message: &str) -> Result<DialogueBrief> {
        if message.trim().is_empty() {
            return Err(DialogueError::Intake("Message is empty".to_string()));
        }

        let request = Conversation::from(vec![
            Message::system(FACILITATOR_PROMPT),
            Message::user(message),
        ]);

        let reply = self
            .completion
            .complete(&request, ModelTier::Standard, FACILITATOR_MAX_TOKENS)
            .await?;

        tracing::debug!(reply_chars = reply.len(), "facilitator replied");

        parse_brief(&reply)
    }
}
