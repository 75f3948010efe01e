//! Token budget gate
//! Sizes the active persona's conversation and derives the next reply allowance

use crate::budget::types::{BudgetConfig, BudgetDecision, BudgetWarning};
use crate::context::TokenCounter;
use crate::types::Conversation;

/// Token budget shared by both personas of one dialogue
#[derive(Debug, Clone)]
pub struct TokenBudget {
    /// Budget configuration
    config: BudgetConfig,

    /// Estimator used to size conversations
    counter: TokenCounter,
}

impl TokenBudget {
    /// Create new budget with default configuration
    pub fn new() -> Self {
        Self::with_config(BudgetConfig::default())
    }

    /// Create budget with custom configuration
    pub fn with_config(config: BudgetConfig) -> Self {
        Self {
            config,
            counter: TokenCounter::new(),
        }
    }

    /// Decide whether another reply fits
    ///
    /// Formula: remaining = cap - used, reported as 0 past the cap
    ///
    /// Guarantees:
    /// - Proceed => max_tokens >= minimum_reply_tokens
    /// - Proceed => used + max_tokens == cap
    pub fn assess(&self, conversation: &Conversation) -> BudgetDecision {
        let used = self.counter.estimate_conversation(conversation);

        match self.config.cap_tokens.checked_sub(used) {
            Some(remaining) if remaining >= self.config.minimum_reply_tokens => BudgetDecision::Proceed {
                used,
                max_tokens: remaining,
            },
            // Over the cap counts as zero remaining
            remaining => BudgetDecision::Exhausted {
                used,
                remaining: remaining.unwrap_or(0),
            },
        }
    }

    /// Get utilization for a given usage (0.0 and up, may exceed 1.0)
    pub fn utilization(&self, used: usize) -> f64 {
        if self.config.cap_tokens == 0 {
            return 1.0;
        }
        used as f64 / self.config.cap_tokens as f64
    }

    /// Check for budget warnings
    pub fn check_warning(&self, used: usize) -> Option<BudgetWarning> {
        if self.utilization(used) >= self.config.warning_threshold {
            return Some(BudgetWarning::ApproachingLimit {
                used,
                cap: self.config.cap_tokens,
                remaining: self.config.cap_tokens.saturating_sub(used),
            });
        }
        None
    }

    /// Get token ceiling
    pub fn cap(&self) -> usize {
        self.config.cap_tokens
    }

    /// Get the reply floor
    pub fn minimum_reply_tokens(&self) -> usize {
        self.config.minimum_reply_tokens
    }
}

impl Default for TokenBudget {
    fn default() -> Self {
        Self::new()
    }
}
