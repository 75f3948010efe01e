//! Dialogue state machine
//!
//! Deterministic finite state machine for the turn loop:
//! - Single live state: Running
//! - Every terminal state is reachable directly from Running
//! - Terminal states accept no further events

use crate::errors::{DialogueError, Result};
use serde::{Deserialize, Serialize};

/// Dialogue loop states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueState {
    /// Turns are still being taken
    Running,

    /// A reply contained the stop marker (terminal)
    StoppedBySignal,

    /// Remaining budget fell below the reply floor (terminal)
    StoppedByBudget,

    /// Iteration cap reached (terminal)
    StoppedByIterationCap,

    /// Completion service failed mid-dialogue (terminal)
    StoppedByFailure,

    /// Cancelled between turns (terminal)
    Cancelled,
}

/// Events that trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateEvent {
    /// A reply was appended and the loop may continue
    TurnCompleted,

    /// A reply carried the stop marker
    StopSignal,

    /// Budget check failed before a call
    BudgetExhausted,

    /// Iteration counter reached the cap
    IterationCapReached,

    /// Completion service returned an error
    CompletionFailed,

    /// Cancellation observed
    CancelRequested,
}

impl DialogueState {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DialogueState::Running)
    }

    /// Attempt state transition with validation
    ///
    /// Valid transitions (6 edges):
    /// 1. Running → Running               (on: TurnCompleted)
    /// 2. Running → StoppedBySignal       (on: StopSignal)
    /// 3. Running → StoppedByBudget       (on: BudgetExhausted)
    /// 4. Running → StoppedByIterationCap (on: IterationCapReached)
    /// 5. Running → StoppedByFailure      (on: CompletionFailed)
    /// 6. Running → Cancelled             (on: CancelRequested)
    pub fn transition(&self, event: StateEvent) -> Result<DialogueState> {
        use DialogueState::*;
        use StateEvent::*;

        match (self, event) {
            (Running, TurnCompleted) => Ok(Running),
            (Running, StopSignal) => Ok(StoppedBySignal),
            (Running, BudgetExhausted) => Ok(StoppedByBudget),
            (Running, IterationCapReached) => Ok(StoppedByIterationCap),
            (Running, CompletionFailed) => Ok(StoppedByFailure),
            (Running, CancelRequested) => Ok(Cancelled),
            (from, event) => Err(DialogueError::InvalidTransition {
                from: format!("{:?}", from),
                to: format!("(via {:?})", event),
                reason: "Dialogue already finished".to_string(),
            }),
        }
    }

    /// Human-readable state name
    pub fn display_name(&self) -> &'static str {
        match self {
            DialogueState::Running => "Running",
            DialogueState::StoppedBySignal => "Stopped by stop marker",
            DialogueState::StoppedByBudget => "Stopped by token budget",
            DialogueState::StoppedByIterationCap => "Stopped at iteration cap",
            DialogueState::StoppedByFailure => "Stopped by completion failure",
            DialogueState::Cancelled => "Cancelled",
        }
    }
}
