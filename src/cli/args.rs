//! Command-line argument parsing for memoduet
//!
//! Provides clap-based CLI with verbosity control.

use clap::Parser;
use std::path::PathBuf;

/// memoduet - Have two AI personas explore an idea and write it up as a memo
#[derive(Parser, Debug)]
#[command(name = "memoduet")]
#[command(version)]
#[command(about = "Explore an idea through an Alfred/Bernard dialogue and produce a memo", long_about = None)]
pub struct Args {
    /// Idea to explore
    #[arg(value_name = "IDEA")]
    pub idea: Option<String>,

    /// Optional exploration instructions (with IDEA only)
    #[arg(short, long)]
    pub instructions: Option<String>,

    /// Free-form message; the idea and instructions are extracted from it
    #[arg(short, long, conflicts_with = "idea")]
    pub message: Option<String>,

    /// Transcript file; the idea and instructions are extracted from it
    #[arg(short, long, conflicts_with_all = ["idea", "message"])]
    pub transcript: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the maximum number of dialogue turns
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Override the per-persona token budget
    #[arg(long, value_name = "TOKENS")]
    pub budget: Option<usize>,

    /// Write the memo to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Render the memo as JSON
    #[arg(long)]
    pub json: bool,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress all output except the memo)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

/// Where the idea comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdeaSource {
    Direct {
        idea: String,
        instructions: Option<String>,
    },
    Message(String),
    Transcript(PathBuf),
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Check that exactly one idea source is given
    pub fn validate(&self) -> Result<(), String> {
        let sources = [self.idea.is_some(), self.message.is_some(), self.transcript.is_some()]
            .iter()
            .filter(|given| **given)
            .count();

        if sources == 0 {
            return Err("An idea is required. Use 'memoduet <IDEA>', --message or --transcript.".to_string());
        }

        if sources > 1 {
            return Err("Give only one of IDEA, --message or --transcript.".to_string());
        }

        if self.instructions.is_some() && self.idea.is_none() {
            return Err("--instructions can only be used with IDEA.".to_string());
        }

        Ok(())
    }

    /// Resolve the idea source after validation
    pub fn source(&self) -> Option<IdeaSource> {
        if let Some(idea) = &self.idea {
            return Some(IdeaSource::Direct {
                idea: idea.clone(),
                instructions: self.instructions.clone(),
            });
        }
        if let Some(message) = &self.message {
            return Some(IdeaSource::Message(message.clone()));
        }
        self.transcript.clone().map(IdeaSource::Transcript)
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Check if should show the progress spinner
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Default log filter directive when RUST_LOG is unset
    pub fn log_directive(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "memoduet=info",
            Verbosity::VeryVerbose => "memoduet=debug",
        }
    }
}
