//! Token counting for budget gating
//!
//! Provides fast token estimation using a character-based heuristic. The
//! numbers only gate the dialogue budget; they are not billing-accurate for
//! any particular vendor tokenizer.
//!
//! # Algorithm
//!
//! ```text
//! text(t)          = ⌈chars(t) / 4⌉
//! message(m)       = 4 + text(role) + text(content) [+ text(name) - 1]
//! conversation(c)  = Σ message(m) + 2
//! ```
//!
//! # Complexity
//! O(n) where n = total text length

use crate::types::{Conversation, Message};

/// Framing cost charged for every message
pub const TOKENS_PER_MESSAGE: usize = 4;

/// Adjustment applied when a message carries a name (role marker is implied)
pub const NAME_ADJUSTMENT: usize = 1;

/// Cost of priming the next assistant reply
pub const REPLY_PRIMING_TOKENS: usize = 2;

/// Token counter with heuristic-based estimation
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenCounter;

impl TokenCounter {
    /// Create new token counter
    pub fn new() -> Self {
        Self
    }

    /// Estimate token count for text
    ///
    /// # Examples
    ///
    /// ```
    /// # use memoduet::context::counter::TokenCounter;
    /// let counter = TokenCounter::new();
    ///
    /// // 25 tokens for 100 characters
    /// assert_eq!(counter.estimate(&"a".repeat(100)), 25);
    /// ```
    pub fn estimate(&self, text: &str) -> usize {
        let char_count = text.chars().count();

        // Ceiling division to avoid underestimation
        (char_count + 3) / 4
    }

    /// Estimate the framed cost of one message
    pub fn estimate_message(&self, message: &Message) -> usize {
        let mut tokens = TOKENS_PER_MESSAGE
            + self.estimate(message.role.as_str())
            + self.estimate(&message.content);

        if let Some(name) = &message.name {
            tokens += self.estimate(name);
            tokens -= NAME_ADJUSTMENT;
        }

        tokens
    }

    /// Estimate the prompt cost of a whole conversation
    ///
    /// Never decreases when a message is appended: every message adds at
    /// least `TOKENS_PER_MESSAGE - NAME_ADJUSTMENT` tokens.
    pub fn estimate_conversation(&self, conversation: &Conversation) -> usize {
        conversation
            .iter()
            .map(|message| self.estimate_message(message))
            .sum::<usize>()
            + REPLY_PRIMING_TOKENS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_estimation() {
        let counter = TokenCounter::new();
        assert_eq!(counter.estimate(&"a".repeat(100)), 25);
    }

    #[test]
    fn test_empty_string() {
        let counter = TokenCounter::new();
        assert_eq!(counter.estimate(""), 0);
    }

    #[test]
    fn test_single_character() {
        let counter = TokenCounter::new();
        // 1 char = 1 token (ceiling division)
        assert_eq!(counter.estimate("a"), 1);
    }

    #[test]
    fn test_unicode_characters() {
        let counter = TokenCounter::new();
        // 3 chars / 4 = 0.75 → 1
        assert_eq!(counter.estimate("日本語"), 1);
    }

    #[test]
    fn test_message_framing() {
        let counter = TokenCounter::new();
        // 4 framing + "user" (1) + 40 chars (10)
        let msg = Message::user("a".repeat(40));
        assert_eq!(counter.estimate_message(&msg), 15);
    }

    #[test]
    fn test_named_message_drops_role_marker() {
        let counter = TokenCounter::new();
        let plain = Message::user("a".repeat(40));
        let named = plain.clone().with_name("alfred");

        // "alfred" costs 2, minus the 1-token adjustment
        assert_eq!(counter.estimate_message(&named), counter.estimate_message(&plain) + 1);
    }

    #[test]
    fn test_empty_conversation_costs_priming_only() {
        let counter = TokenCounter::new();
        assert_eq!(counter.estimate_conversation(&Conversation::new()), REPLY_PRIMING_TOKENS);
    }

    #[test]
    fn test_conversation_sum() {
        let counter = TokenCounter::new();
        let mut conv = Conversation::seeded("a".repeat(40)); // 4 + 2 + 10
        conv.push(Message::assistant("b".repeat(80))); // 4 + 3 + 20

        assert_eq!(counter.estimate_conversation(&conv), 16 + 27 + REPLY_PRIMING_TOKENS);
    }

    #[test]
    fn test_appending_increases_estimate() {
        let counter = TokenCounter::new();
        let mut conv = Conversation::seeded("system");
        let mut previous = counter.estimate_conversation(&conv);

        for reply in ["", "short", &"long ".repeat(50)] {
            conv.push(Message::user(reply).with_name(""));
            let current = counter.estimate_conversation(&conv);
            assert!(current > previous, "{} should exceed {}", current, previous);
            previous = current;
        }
    }
}
