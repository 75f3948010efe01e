//! Property tests for the estimator, store, budget and scheduler

mod support;

use memoduet::budget::{BudgetConfig, BudgetDecision, TokenBudget};
use memoduet::completion::ModelTier;
use memoduet::context::TokenCounter;
use memoduet::dialogue::scheduler::select_tier;
use memoduet::dialogue::{ConversationStore, DialogueBrief, Persona, SchedulerConfig, TurnScheduler, STOP_MARKER};
use memoduet::types::{Conversation, Message, Role};
use quickcheck_macros::quickcheck;
use support::{ok, ScriptedCompletion};

fn role_from(tag: u8) -> Role {
    match tag % 3 {
        0 => Role::System,
        1 => Role::User,
        _ => Role::Assistant,
    }
}

#[quickcheck]
fn estimate_never_decreases_on_append(history: Vec<(u8, String)>, next: (u8, String)) -> bool {
    let counter = TokenCounter::new();
    let mut conversation: Conversation = history
        .into_iter()
        .map(|(tag, content)| Message::new(role_from(tag), content))
        .collect::<Vec<_>>()
        .into();

    let before = counter.estimate_conversation(&conversation);
    conversation.push(Message::new(role_from(next.0), next.1));
    let after = counter.estimate_conversation(&conversation);

    after > before
}

#[quickcheck]
fn estimate_is_ceiling_of_quarter_chars(text: String) -> bool {
    let chars = text.chars().count();
    let tokens = TokenCounter::new().estimate(&text);
    tokens * 4 >= chars && tokens * 4 < chars + 4
}

#[quickcheck]
fn store_stays_mirrored(turns: Vec<(bool, String)>) -> bool {
    let mut store = ConversationStore::new("alfred system", "bernard system");

    for (alfred_speaks, reply) in &turns {
        let speaker = if *alfred_speaks { Persona::Alfred } else { Persona::Bernard };
        store.append_turn(speaker, reply);
        if !store.is_mirrored() {
            return false;
        }
    }

    store.turn_count() == turns.len()
        && store.snapshot(Persona::Alfred).len() == store.snapshot(Persona::Bernard).len()
}

#[quickcheck]
fn proceed_respects_floor_and_cap(cap: u16, floor: u16, content: String) -> bool {
    let budget = TokenBudget::with_config(BudgetConfig {
        cap_tokens: cap as usize,
        minimum_reply_tokens: floor as usize,
        warning_threshold: 0.8,
    });
    let conversation = Conversation::seeded(content);

    match budget.assess(&conversation) {
        BudgetDecision::Proceed { used, max_tokens } => {
            max_tokens >= floor as usize && used + max_tokens == cap as usize
        }
        BudgetDecision::Exhausted { remaining, .. } => remaining < floor as usize,
    }
}

#[quickcheck]
fn tier_never_upgrades(iteration: u8, standard_turns: u8) -> bool {
    let now = select_tier(iteration as usize, standard_turns as usize);
    let next = select_tier(iteration as usize + 1, standard_turns as usize);
    !(now == ModelTier::Economy && next == ModelTier::Standard)
}

#[quickcheck]
fn scheduler_terminates_within_cap(max_iterations: u8, stop_after: Option<u8>) -> bool {
    let max_iterations = (max_iterations % 12) as usize;

    let mut replies = Vec::new();
    if let Some(n) = stop_after {
        for _ in 0..(n % 12) {
            replies.push(ok("keep going"));
        }
        replies.push(ok(format!("we are done {}", STOP_MARKER)));
    }
    let service = ScriptedCompletion::new(replies).with_fallback("keep going").shared();

    let config = SchedulerConfig {
        max_iterations,
        ..SchedulerConfig::default()
    };
    let scheduler = TurnScheduler::new(service.clone(), config);

    let outcome = tokio_test::block_on(scheduler.run(&DialogueBrief::new("idea")));

    match outcome {
        Ok(outcome) => {
            outcome.state().is_terminal()
                && outcome.iterations() <= max_iterations
                && service.call_count() <= max_iterations
                && outcome.alfred_conversation().len() == outcome.iterations() + 1
                && outcome.session.store.is_mirrored()
        }
        Err(_) => false,
    }
}
