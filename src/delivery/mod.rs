//! Memo assembly and delivery
//!
//! A [`Memo`] bundles the brief, the finalized transcript and how the
//! dialogue ended. Delivery is a seam: the binary prints to stdout or
//! writes a file, other sinks implement [`MemoDelivery`].

use crate::dialogue::finalizer::FinalTranscript;
use crate::dialogue::personas::{DialogueBrief, Persona};
use crate::dialogue::state::DialogueState;
use crate::errors::Result;
use crate::types::{Conversation, Role};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Finished memo for one explored idea
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Memo {
    pub title: String,
    pub idea: String,
    pub instructions: Option<String>,
    pub summary: String,
    pub conversation: Conversation,
    pub stop_state: DialogueState,
    pub created_at: DateTime<Utc>,
}

impl Memo {
    pub fn new(brief: DialogueBrief, transcript: FinalTranscript, stop_state: DialogueState) -> Self {
        Self {
            title: transcript.title,
            idea: brief.idea,
            instructions: brief.instructions,
            summary: transcript.summary,
            conversation: transcript.conversation,
            stop_state,
            created_at: Utc::now(),
        }
    }

    /// Number of dialogue turns in the memo
    pub fn turn_count(&self) -> usize {
        self.conversation
            .iter()
            .filter(|m| m.role != Role::System)
            .count()
    }
}

/// Output format for a memo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemoFormat {
    #[default]
    Text,
    Json,
}

impl MemoFormat {
    pub fn render(&self, memo: &Memo) -> Result<String> {
        match self {
            MemoFormat::Text => Ok(format_memo(memo)),
            MemoFormat::Json => Ok(serde_json::to_string_pretty(memo)?),
        }
    }
}

/// Plain-text memo body
///
/// The conversation is shown from Alfred's side: his own replies are
/// `assistant` messages, Bernard's arrive as `user` messages.
pub fn format_memo(memo: &Memo) -> String {
    let mut text = format!(
        "Idea:\n{}\n\nThe idea has been further explored by {} and {}. Here is a summary of the exploration:\n\nSummary:\n{}\n\nConversation:\n",
        memo.idea,
        Persona::Alfred,
        Persona::Bernard,
        memo.summary,
    );

    for message in memo.conversation.iter().skip(1) {
        let speaker = match message.role {
            Role::Assistant => Persona::Alfred,
            _ => Persona::Bernard,
        };
        // Writing into a String cannot fail
        let _ = writeln!(text, "{}: {}", speaker, message.content);
    }

    text
}

/// Destination for finished memos
#[async_trait]
pub trait MemoDelivery: Send + Sync {
    async fn deliver(&self, memo: &Memo) -> Result<()>;
}

/// Prints memos to stdout
#[derive(Debug, Clone, Default)]
pub struct StdoutDelivery {
    pub format: MemoFormat,
}

#[async_trait]
impl MemoDelivery for StdoutDelivery {
    async fn deliver(&self, memo: &Memo) -> Result<()> {
        let body = self.format.render(memo)?;
        println!("{}", body);
        Ok(())
    }
}

/// Writes memos to a file, creating parent directories as needed
#[derive(Debug, Clone)]
pub struct FileDelivery {
    pub path: PathBuf,
    pub format: MemoFormat,
}

impl FileDelivery {
    pub fn new(path: impl Into<PathBuf>, format: MemoFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }
}

#[async_trait]
impl MemoDelivery for FileDelivery {
    async fn deliver(&self, memo: &Memo) -> Result<()> {
        let body = self.format.render(memo)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, body).await?;

        tracing::info!(path = %self.path.display(), "memo written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    fn memo() -> Memo {
        let mut conversation = Conversation::seeded("You are Alfred.");
        conversation.push(Message::assistant("It may be costly."));
        conversation.push(Message::user("Grants could help!"));

        Memo::new(
            DialogueBrief::new("Solar charging stations"),
            FinalTranscript {
                title: "Solar Stations".to_string(),
                summary: "Costly but promising.".to_string(),
                conversation,
            },
            DialogueState::StoppedBySignal,
        )
    }

    #[test]
    fn test_format_memo() {
        let text = format_memo(&memo());

        assert!(text.starts_with("Idea:\nSolar charging stations\n\n"));
        assert!(text.contains("Summary:\nCostly but promising.\n\nConversation:\n"));
        assert!(text.ends_with("Alfred: It may be costly.\nBernard: Grants could help!\n"));
        assert!(!text.contains("You are Alfred."));
    }

    #[test]
    fn test_turn_count_skips_system() {
        assert_eq!(memo().turn_count(), 2);
    }

    #[test]
    fn test_json_render() {
        let json = MemoFormat::Json.render(&memo()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["title"], "Solar Stations");
        assert_eq!(value["stop_state"], "stopped_by_signal");
        assert_eq!(value["conversation"][1]["role"], "assistant");
    }

    #[tokio::test]
    async fn test_file_delivery() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memos").join("solar.txt");
        let delivery = FileDelivery::new(&path, MemoFormat::Text);

        delivery.deliver(&memo()).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, format_memo(&memo()));
    }
}
