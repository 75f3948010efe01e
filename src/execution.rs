//! End-to-end exploration pipeline
//!
//! Runs the turn loop, finalizes Alfred's side of the dialogue and
//! assembles the memo. A dialogue cut short by a completion failure still
//! produces a memo; a failed finalization does not.

use crate::completion::CompletionService;
use crate::delivery::Memo;
use crate::dialogue::{DialogueBrief, DialogueState, FinalizerConfig, SchedulerConfig, SummaryFinalizer, TurnScheduler};
use crate::errors::{DialogueError, Result};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Everything the pipeline needs besides the completion service
#[derive(Debug, Clone, Default)]
pub struct ExploreSettings {
    pub scheduler: SchedulerConfig,
    pub finalizer: FinalizerConfig,
}

/// Explore `brief` and return the finished memo
pub async fn explore(
    completion: Arc<dyn CompletionService>,
    settings: &ExploreSettings,
    brief: DialogueBrief,
    cancel: &CancellationToken,
) -> Result<Memo> {
    let start_time = Instant::now();

    let scheduler = TurnScheduler::new(completion.clone(), settings.scheduler.clone());
    let outcome = scheduler.run_until_cancelled(&brief, cancel).await?;

    let stop_state = outcome.state();
    if stop_state == DialogueState::Cancelled {
        return Err(DialogueError::Cancelled);
    }
    if let Some(reason) = &outcome.failure {
        tracing::warn!(iterations = outcome.iterations(), reason = %reason, "finalizing a truncated dialogue");
    }

    let finalizer = SummaryFinalizer::new(completion, settings.finalizer.clone());
    let transcript = finalizer
        .finalize_until_cancelled(outcome.into_alfred_conversation(), cancel)
        .await?;

    let memo = Memo::new(brief, transcript, stop_state);

    tracing::info!(
        title = %memo.title,
        turns = memo.turn_count(),
        stop_state = stop_state.display_name(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "exploration complete"
    );

    Ok(memo)
}
