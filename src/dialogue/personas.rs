//! Persona prompt templates
//!
//! Alfred plays the constructive critic, Bernard the curious optimist. Both
//! are told about the stop word so either can end the discussion.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closing request appended to Alfred's conversation
pub const SUMMARY_REQUEST: &str =
    "Alfred, please summarize the main points of our discussion so far.";

/// System prompt for title generation
pub const TITLE_SYSTEM_PROMPT: &str = "You are a helpful assistant that generates a title for a memo from a given summary. Try your best to create an appropriate and concise title based on the content.";

/// One of the two discussion participants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    Alfred,
    Bernard,
}

impl Persona {
    /// The other participant
    pub fn other(&self) -> Persona {
        match self {
            Persona::Alfred => Persona::Bernard,
            Persona::Bernard => Persona::Alfred,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Persona::Alfred => "Alfred",
            Persona::Bernard => "Bernard",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Idea under discussion plus optional steering instructions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueBrief {
    pub idea: String,
    #[serde(default)]
    pub instructions: Option<String>,
}

impl DialogueBrief {
    pub fn new(idea: impl Into<String>) -> Self {
        Self {
            idea: idea.into(),
            instructions: None,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        let instructions = instructions.into();
        self.instructions = if instructions.trim().is_empty() {
            None
        } else {
            Some(instructions)
        };
        self
    }

    fn instructions_text(&self) -> &str {
        self.instructions.as_deref().unwrap_or("none")
    }
}

/// System prompt for a persona, naming `stop_marker` as the stop word
pub fn system_prompt(persona: Persona, brief: &DialogueBrief, stop_marker: &str) -> String {
    match persona {
        Persona::Alfred => alfred_prompt(brief, stop_marker),
        Persona::Bernard => bernard_prompt(brief, stop_marker),
    }
}

pub fn alfred_prompt(brief: &DialogueBrief, stop_marker: &str) -> String {
    format!(
        "Alfred, you are an AI chatbot and your role is to be a constructive critic and analytical thinker. \
You will be discussing ideas with Bernard, another AI chatbot. \
Explore the idea: '{idea}'. Follow any specific instructions: '{instructions}'. \
Analyze and evaluate the idea critically, focusing on feasibility, practicality, and potential challenges. \
Offer constructive feedback and data-driven insights, considering different perspectives and risks. \
Provide extensive and well-thought-out answers. \
Be concise and prioritize the content of your critiques rather than the formalities of dialogue. \
If you feel the conversation has reached a natural conclusion or has become repetitive, use the stop word '{marker}'.",
        idea = brief.idea,
        instructions = brief.instructions_text(),
        marker = stop_marker,
    )
}

pub fn bernard_prompt(brief: &DialogueBrief, stop_marker: &str) -> String {
    format!(
        "Bernard, you are an AI chatbot and your role is to be a curious optimist and idea generator. \
You will be discussing ideas with Alfred, another AI chatbot. \
Explore the idea: '{idea}'. Follow any specific instructions: '{instructions}'. \
Encourage creative thinking, curiosity, and optimism while discussing the idea. \
Actively listen, ask clarifying questions, and build upon the idea. \
Provide extensive and well-thought-out answers. \
Be concise and prioritize the content of your contributions rather than the formalities of dialogue. \
If you feel the conversation has reached a natural conclusion or has become repetitive, use the stop word '{marker}'.",
        idea = brief.idea,
        instructions = brief.instructions_text(),
        marker = stop_marker,
    )
}
