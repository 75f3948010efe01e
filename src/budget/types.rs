//! Budget system type definitions

use serde::{Deserialize, Serialize};

/// Configuration for the per-persona token budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Token ceiling for a persona's accumulated conversation (default: 8192)
    pub cap_tokens: usize,

    /// Smallest reply allowance worth requesting (default: 500)
    pub minimum_reply_tokens: usize,

    /// Utilization that triggers an approaching-limit warning (default: 0.8)
    pub warning_threshold: f64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            cap_tokens: 8192,
            minimum_reply_tokens: 500,
            warning_threshold: 0.8,
        }
    }
}

/// Result of sizing a conversation against the budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetDecision {
    /// Enough room left; the reply may use up to `max_tokens`
    Proceed { used: usize, max_tokens: usize },

    /// Remaining room is below the reply floor
    Exhausted { used: usize, remaining: usize },
}

impl BudgetDecision {
    pub fn used(&self) -> usize {
        match self {
            BudgetDecision::Proceed { used, .. } | BudgetDecision::Exhausted { used, .. } => *used,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, BudgetDecision::Exhausted { .. })
    }
}

/// Budget warning types
#[derive(Debug, Clone, PartialEq)]
pub enum BudgetWarning {
    /// Approaching budget limit
    ApproachingLimit {
        used: usize,
        cap: usize,
        remaining: usize,
    },
}
