//! memoduet - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use memoduet::{
    cli::{Args, Config, IdeaSource, Verbosity},
    completion::CompletionService,
    delivery::{FileDelivery, Memo, MemoDelivery, MemoFormat, StdoutDelivery},
    dialogue::{DialogueBrief, DialogueState},
    execution::explore,
    intake::IdeaFacilitator,
    telemetry,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(message) = args.validate() {
        eprintln!("{}: {}", "Error".red(), message);
        std::process::exit(2);
    }

    let verbosity = args.verbosity();
    let config = Config::load(args.config.clone())?.with_overrides(args.max_iterations, args.budget)?;
    telemetry::init_tracing(verbosity, config.logging.json)?;

    let completion: Arc<dyn CompletionService> = Arc::new(config.completion_client()?);

    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(cancel.clone());

    let brief = resolve_brief(&args, completion.clone(), verbosity).await?;
    if verbosity.show_progress() {
        eprintln!("{} {}", "Idea:".cyan().bold(), brief.idea);
        if let Some(instructions) = &brief.instructions {
            eprintln!("{} {}", "Instructions:".cyan().bold(), instructions);
        }
    }

    let settings = config.explore_settings();
    let spinner = start_spinner(verbosity, "Alfred and Bernard are discussing...");
    let result = explore(completion, &settings, brief, &cancel).await;
    spinner.finish_and_clear();

    let memo = match result {
        Ok(memo) => memo,
        Err(e) if e.is_finalization() => {
            eprintln!("{}: {}", "Finalization failed".red(), e);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    deliver(&args, &memo).await?;

    if verbosity.show_progress() {
        print_status(&memo);
    }

    Ok(())
}

/// Cancel the dialogue on Ctrl-C; the current turn finishes first
fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n{}", "Stopping after the current turn...".yellow());
            cancel.cancel();
        }
    });
}

async fn resolve_brief(
    args: &Args,
    completion: Arc<dyn CompletionService>,
    verbosity: Verbosity,
) -> Result<DialogueBrief> {
    let message = match args.source() {
        Some(IdeaSource::Direct { idea, instructions }) => {
            let brief = DialogueBrief::new(idea);
            return Ok(match instructions {
                Some(instructions) => brief.with_instructions(instructions),
                None => brief,
            });
        }
        Some(IdeaSource::Message(message)) => message,
        Some(IdeaSource::Transcript(path)) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read transcript {}", path.display()))?,
        None => anyhow::bail!("No idea given"),
    };

    let spinner = start_spinner(verbosity, "Extracting the idea...");
    let brief = IdeaFacilitator::new(completion).facilitate(&message).await;
    spinner.finish_and_clear();

    Ok(brief?)
}

async fn deliver(args: &Args, memo: &Memo) -> Result<()> {
    let format = if args.json { MemoFormat::Json } else { MemoFormat::Text };

    match &args.output {
        Some(path) => FileDelivery::new(path, format).deliver(memo).await?,
        None => StdoutDelivery { format }.deliver(memo).await?,
    }

    Ok(())
}

fn start_spinner(verbosity: Verbosity, message: &'static str) -> ProgressBar {
    if !verbosity.show_progress() {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn print_status(memo: &Memo) {
    let state = memo.stop_state.display_name();
    let status = match memo.stop_state {
        DialogueState::StoppedBySignal | DialogueState::StoppedByIterationCap => state.green(),
        DialogueState::StoppedByBudget => state.yellow(),
        _ => state.red(),
    };

    eprintln!();
    eprintln!("{} {}", "Title:".bold(), memo.title);
    eprintln!("{} {} ({} turns)", "Dialogue:".bold(), status, memo.turn_count());
}
