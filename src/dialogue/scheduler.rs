//! Turn scheduler - the dialogue control loop
//!
//! Runs Alfred and Bernard against each other, one completion call per turn:
//! - Sizes the active persona's history and gates on the token budget
//! - Picks the model tier (standard for the opening turns, economy after)
//! - Mirrors each reply into both histories
//! - Stops on the stop marker, the iteration cap, budget exhaustion,
//!   a completion failure or cancellation
//!
//! Completion failures never fail the run; the dialogue is truncated and
//! whatever was said so far goes on to finalization.

use crate::budget::{BudgetConfig, BudgetDecision, BudgetWarning, TokenBudget};
use crate::completion::{CompletionService, ModelTier};
use crate::dialogue::personas::{self, DialogueBrief, Persona};
use crate::dialogue::state::{DialogueState, StateEvent};
use crate::dialogue::stop::{StopConditionDetector, STOP_MARKER};
use crate::dialogue::store::ConversationStore;
use crate::errors::Result;
use crate::types::Conversation;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

/// Default cap on turns per dialogue
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Number of opening turns served by the standard tier
pub const STANDARD_TIER_TURNS: usize = 2;

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Maximum number of turns before forcing completion
    pub max_iterations: usize,

    /// Turns (global, not per persona) that use the standard tier
    pub standard_tier_turns: usize,

    /// Token budget settings
    pub budget: BudgetConfig,

    /// Termination marker
    pub stop_marker: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            standard_tier_turns: STANDARD_TIER_TURNS,
            budget: BudgetConfig::default(),
            stop_marker: STOP_MARKER.to_string(),
        }
    }
}

/// Tier for a global iteration index
///
/// Non-increasing in quality: once a turn uses the economy tier, every
/// later turn does too.
pub fn select_tier(iteration: usize, standard_tier_turns: usize) -> ModelTier {
    if iteration < standard_tier_turns {
        ModelTier::Standard
    } else {
        ModelTier::Economy
    }
}

/// Diagnostics for one completion call made by the loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnRecord {
    pub iteration: usize,
    pub speaker: Persona,
    pub tier: ModelTier,
    pub tokens_used: usize,
    pub max_tokens: usize,
    pub completed: bool,
}

/// Mutable state of one dialogue, owned by a single scheduler run
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    pub id: Uuid,
    pub store: ConversationStore,
    pub active_speaker: Persona,
    pub iteration: usize,
    pub budget_cap_tokens: usize,
    pub state: DialogueState,
}

impl SessionState {
    /// Fresh session with persona prompts rendered from the brief
    pub fn new(brief: &DialogueBrief, stop_marker: &str, budget_cap_tokens: usize) -> Self {
        let store = ConversationStore::new(
            personas::system_prompt(Persona::Alfred, brief, stop_marker),
            personas::system_prompt(Persona::Bernard, brief, stop_marker),
        );
        Self::from_store(store, budget_cap_tokens)
    }

    /// Session over an already seeded store
    pub fn from_store(store: ConversationStore, budget_cap_tokens: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            store,
            active_speaker: Persona::Alfred,
            iteration: 0,
            budget_cap_tokens,
            state: DialogueState::Running,
        }
    }

    pub fn done(&self) -> bool {
        self.state.is_terminal()
    }

    fn apply(&mut self, event: StateEvent) -> Result<()> {
        let next = self.state.transition(event)?;
        if next != self.state {
            tracing::debug!(from = ?self.state, to = ?next, "dialogue state transition");
        }
        self.state = next;
        Ok(())
    }
}

/// Result of running the turn loop
#[derive(Debug, Clone, Serialize)]
pub struct DialogueOutcome {
    pub session: SessionState,
    pub turns: Vec<TurnRecord>,
    pub failure: Option<String>,
}

impl DialogueOutcome {
    pub fn state(&self) -> DialogueState {
        self.session.state
    }

    pub fn iterations(&self) -> usize {
        self.session.iteration
    }

    /// Alfred's view of the dialogue, the one handed to finalization
    pub fn alfred_conversation(&self) -> &Conversation {
        self.session.store.snapshot(Persona::Alfred)
    }

    pub fn into_alfred_conversation(self) -> Conversation {
        self.session.store.into_conversation(Persona::Alfred)
    }
}

/// Dialogue orchestrator
pub struct TurnScheduler {
    completion: Arc<dyn CompletionService>,
    config: SchedulerConfig,
    detector: StopConditionDetector,
}

impl TurnScheduler {
    pub fn new(completion: Arc<dyn CompletionService>, config: SchedulerConfig) -> Self {
        let detector = StopConditionDetector::with_marker(config.stop_marker.clone());

        Self {
            completion,
            config,
            detector,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Run a dialogue about `brief` to completion
    pub async fn run(&self, brief: &DialogueBrief) -> Result<DialogueOutcome> {
        self.run_until_cancelled(brief, &CancellationToken::new()).await
    }

    /// Run a dialogue, checking `cancel` before every turn
    pub async fn run_until_cancelled(
        &self,
        brief: &DialogueBrief,
        cancel: &CancellationToken,
    ) -> Result<DialogueOutcome> {
        let session = SessionState::new(brief, &self.config.stop_marker, self.config.budget.cap_tokens);
        self.run_session(session, cancel).await
    }

    /// Drive an existing session until it reaches a terminal state
    pub async fn run_session(
        &self,
        session: SessionState,
        cancel: &CancellationToken,
    ) -> Result<DialogueOutcome> {
        let span = tracing::info_span!("dialogue", session = %session.id);
        self.drive(session, cancel).instrument(span).await
    }

    async fn drive(&self, mut session: SessionState, cancel: &CancellationToken) -> Result<DialogueOutcome> {
        let budget = TokenBudget::with_config(BudgetConfig {
            cap_tokens: session.budget_cap_tokens,
            ..self.config.budget.clone()
        });
        let mut turns = Vec::new();
        let mut failure = None;

        tracing::info!(
            max_iterations = self.config.max_iterations,
            budget_cap_tokens = session.budget_cap_tokens,
            "dialogue started"
        );

        if session.iteration >= self.config.max_iterations {
            session.apply(StateEvent::IterationCapReached)?;
        }

        while !session.done() {
            if cancel.is_cancelled() {
                tracing::warn!(iteration = session.iteration, "dialogue cancelled");
                session.apply(StateEvent::CancelRequested)?;
                break;
            }

            let speaker = session.active_speaker;
            let iteration = session.iteration;

            let (used, max_tokens) = match budget.assess(session.store.snapshot(speaker)) {
                BudgetDecision::Exhausted { used, remaining } => {
                    tracing::info!(
                        speaker = %speaker,
                        used,
                        remaining,
                        floor = budget.minimum_reply_tokens(),
                        "token budget exhausted"
                    );
                    session.apply(StateEvent::BudgetExhausted)?;
                    continue;
                }
                BudgetDecision::Proceed { used, max_tokens } => (used, max_tokens),
            };

            if let Some(BudgetWarning::ApproachingLimit { used, cap, remaining }) =
                budget.check_warning(used)
            {
                tracing::warn!(speaker = %speaker, used, cap, remaining, "token budget nearly spent");
            }

            let tier = select_tier(iteration, self.config.standard_tier_turns);
            tracing::debug!(iteration, speaker = %speaker, tier = tier.as_str(), used, max_tokens, "requesting turn");

            let mut record = TurnRecord {
                iteration,
                speaker,
                tier,
                tokens_used: used,
                max_tokens,
                completed: false,
            };

            let reply = match self
                .completion
                .complete(session.store.snapshot(speaker), tier, max_tokens)
                .await
            {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::error!(iteration, speaker = %speaker, error = %e, "completion failed, ending dialogue early");
                    turns.push(record);
                    failure = Some(e.to_string());
                    session.apply(StateEvent::CompletionFailed)?;
                    continue;
                }
            };

            record.completed = true;
            turns.push(record);
            session.store.append_turn(speaker, &reply);
            session.iteration += 1;

            if self.detector.has_stop_signal(&reply) {
                tracing::info!(iteration, speaker = %speaker, "stop marker received");
                session.apply(StateEvent::StopSignal)?;
                continue;
            }

            session.active_speaker = speaker.other();

            if session.iteration >= self.config.max_iterations {
                session.apply(StateEvent::IterationCapReached)?;
            } else {
                session.apply(StateEvent::TurnCompleted)?;
            }
        }

        debug_assert!(session.store.is_mirrored());

        tracing::info!(
            state = session.state.display_name(),
            iterations = session.iteration,
            "dialogue finished"
        );

        Ok(DialogueOutcome {
            session,
            turns,
            failure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DialogueError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replies from a fixed script; errors once the script runs out
    struct Scripted {
        replies: Mutex<Vec<Result<String>>>,
        calls: Mutex<Vec<(ModelTier, usize)>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<String>>) -> Arc<Self> {
            let mut replies = replies;
            replies.reverse();
            Arc::new(Self {
                replies: Mutex::new(replies),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(ModelTier, usize)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionService for Scripted {
        async fn complete(&self, _: &Conversation, tier: ModelTier, max_tokens: usize) -> Result<String> {
            self.calls.lock().unwrap().push((tier, max_tokens));
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(DialogueError::Completion("script exhausted".to_string())))
        }
    }

    fn config(max_iterations: usize, cap_tokens: usize) -> SchedulerConfig {
        SchedulerConfig {
            max_iterations,
            budget: BudgetConfig {
                cap_tokens,
                ..BudgetConfig::default()
            },
            ..SchedulerConfig::default()
        }
    }

    fn ok(text: &str) -> Result<String> {
        Ok(text.to_string())
    }

    #[test]
    fn test_tier_selection() {
        assert_eq!(select_tier(0, 2), ModelTier::Standard);
        assert_eq!(select_tier(1, 2), ModelTier::Standard);
        assert_eq!(select_tier(2, 2), ModelTier::Economy);
        assert_eq!(select_tier(50, 2), ModelTier::Economy);
        assert_eq!(select_tier(0, 0), ModelTier::Economy);
    }

    #[tokio::test]
    async fn test_speakers_alternate_starting_with_alfred() {
        let service = Scripted::new(vec![ok("a"), ok("b"), ok("c")]);
        let scheduler = TurnScheduler::new(service.clone(), config(3, 8192));

        let outcome = scheduler.run(&DialogueBrief::new("idea")).await.unwrap();

        let speakers: Vec<Persona> = outcome.turns.iter().map(|t| t.speaker).collect();
        assert_eq!(speakers, vec![Persona::Alfred, Persona::Bernard, Persona::Alfred]);
        assert_eq!(outcome.state(), DialogueState::StoppedByIterationCap);
        assert_eq!(outcome.session.active_speaker, Persona::Bernard);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_skips_call() {
        let service = Scripted::new(vec![ok("never used")]);
        // Cap sits below the reply floor
        let scheduler = TurnScheduler::new(service.clone(), config(5, 400));

        let outcome = scheduler.run(&DialogueBrief::new("idea")).await.unwrap();

        assert_eq!(outcome.state(), DialogueState::StoppedByBudget);
        assert!(service.calls().is_empty());
        assert!(outcome.turns.is_empty());
        assert_eq!(outcome.alfred_conversation().len(), 1);
    }

    #[tokio::test]
    async fn test_max_tokens_is_remaining_budget() {
        let service = Scripted::new(vec![ok("x")]);
        let scheduler = TurnScheduler::new(service.clone(), config(1, 5000));

        let outcome = scheduler.run(&DialogueBrief::new("idea")).await.unwrap();

        let first = &outcome.turns[0];
        assert_eq!(first.tokens_used + first.max_tokens, 5000);
        assert_eq!(service.calls()[0].1, first.max_tokens);
    }

    #[tokio::test]
    async fn test_failure_truncates_without_error() {
        let service = Scripted::new(vec![ok("first"), Err(DialogueError::Completion("boom".to_string()))]);
        let scheduler = TurnScheduler::new(service.clone(), config(8, 8192));

        let outcome = scheduler.run(&DialogueBrief::new("idea")).await.unwrap();

        assert_eq!(outcome.state(), DialogueState::StoppedByFailure);
        assert_eq!(outcome.iterations(), 1);
        assert_eq!(outcome.turns.len(), 2);
        assert!(!outcome.turns[1].completed);
        assert!(outcome.failure.as_deref().unwrap().contains("boom"));
        assert_eq!(service.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_first_turn() {
        let service = Scripted::new(vec![ok("unused")]);
        let scheduler = TurnScheduler::new(service.clone(), config(8, 8192));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = scheduler
            .run_until_cancelled(&DialogueBrief::new("idea"), &cancel)
            .await
            .unwrap();

        assert_eq!(outcome.state(), DialogueState::Cancelled);
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_zero_iteration_cap_makes_no_calls() {
        let service = Scripted::new(vec![ok("unused")]);
        let scheduler = TurnScheduler::new(service.clone(), config(0, 8192));

        let outcome = scheduler.run(&DialogueBrief::new("idea")).await.unwrap();

        assert_eq!(outcome.state(), DialogueState::StoppedByIterationCap);
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_custom_stop_marker() {
        let service = Scripted::new(vec![ok("fine"), ok("we are [[fin]]"), ok("unused")]);
        let mut cfg = config(8, 8192);
        cfg.stop_marker = "[[fin]]".to_string();
        let scheduler = TurnScheduler::new(service.clone(), cfg);

        let outcome = scheduler.run(&DialogueBrief::new("idea")).await.unwrap();

        assert_eq!(outcome.state(), DialogueState::StoppedBySignal);
        assert_eq!(outcome.iterations(), 2);
        // Speaker does not flip after a stop
        assert_eq!(outcome.session.active_speaker, Persona::Bernard);
    }
}
