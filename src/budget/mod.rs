//! Token budget management
//! Gates each turn on the room left in the active persona's conversation

pub mod manager;
pub mod types;

pub use manager::TokenBudget;
pub use types::{BudgetConfig, BudgetDecision, BudgetWarning};
