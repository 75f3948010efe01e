//! Conversation store for the two personas
//!
//! Each persona owns a private history opened by its own system prompt.
//! Every reply is mirrored: the speaker records it as `assistant`, the
//! listener as `user`. [`ConversationStore::append_turn`] is the only
//! mutation, so the two histories stay mirror images at every index past
//! the system message.

use crate::dialogue::personas::Persona;
use crate::types::{Conversation, Message, Role};
use serde::Serialize;

/// One persona and its view of the dialogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonaState {
    pub persona: Persona,
    conversation: Conversation,
}

impl PersonaState {
    fn new(persona: Persona, system_prompt: String) -> Self {
        Self {
            persona,
            conversation: Conversation::seeded(system_prompt),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }
}

/// Both persona histories for one dialogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationStore {
    alfred: PersonaState,
    bernard: PersonaState,
}

impl ConversationStore {
    /// Seed both histories with their system prompts
    pub fn new(alfred_system_prompt: impl Into<String>, bernard_system_prompt: impl Into<String>) -> Self {
        Self {
            alfred: PersonaState::new(Persona::Alfred, alfred_system_prompt.into()),
            bernard: PersonaState::new(Persona::Bernard, bernard_system_prompt.into()),
        }
    }

    /// Record one reply in both histories
    pub fn append_turn(&mut self, speaker: Persona, reply: &str) {
        let (speaker_state, listener_state) = match speaker {
            Persona::Alfred => (&mut self.alfred, &mut self.bernard),
            Persona::Bernard => (&mut self.bernard, &mut self.alfred),
        };

        speaker_state.conversation.push(Message::assistant(reply));
        listener_state.conversation.push(Message::user(reply));
    }

    /// Read-only view of a persona's history
    pub fn snapshot(&self, persona: Persona) -> &Conversation {
        self.persona(persona).conversation()
    }

    pub fn persona(&self, persona: Persona) -> &PersonaState {
        match persona {
            Persona::Alfred => &self.alfred,
            Persona::Bernard => &self.bernard,
        }
    }

    /// Take ownership of one persona's history
    pub fn into_conversation(self, persona: Persona) -> Conversation {
        match persona {
            Persona::Alfred => self.alfred.conversation,
            Persona::Bernard => self.bernard.conversation,
        }
    }

    /// Number of turns recorded so far
    pub fn turn_count(&self) -> usize {
        self.alfred.conversation.len().saturating_sub(1)
    }

    /// Check the mirror invariant
    ///
    /// Both histories start with a system message, have equal length, and
    /// at every later index carry the same content with roles flipped.
    pub fn is_mirrored(&self) -> bool {
        let alfred = self.alfred.conversation.messages();
        let bernard = self.bernard.conversation.messages();

        let seeded = |messages: &[Message]| {
            messages.first().map(|m| m.role == Role::System).unwrap_or(false)
        };

        if !seeded(alfred) || !seeded(bernard) || alfred.len() != bernard.len() {
            return false;
        }

        alfred.iter().zip(bernard.iter()).skip(1).all(|(a, b)| {
            a.content == b.content
                && matches!(
                    (a.role, b.role),
                    (Role::Assistant, Role::User) | (Role::User, Role::Assistant)
                )
        })
    }
}
