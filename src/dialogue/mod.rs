//! Two-persona dialogue engine
//!
//! Conversation store, stop detection, state machine, turn scheduler and
//! summary finalizer.

pub mod finalizer;
pub mod personas;
pub mod scheduler;
pub mod state;
pub mod stop;
pub mod store;

// Re-export commonly used types
pub use finalizer::{FinalTranscript, FinalizerConfig, SummaryFinalizer};
pub use personas::{DialogueBrief, Persona};
pub use scheduler::{DialogueOutcome, SchedulerConfig, SessionState, TurnRecord, TurnScheduler};
pub use state::{DialogueState, StateEvent};
pub use stop::{StopConditionDetector, STOP_MARKER};
pub use store::{ConversationStore, PersonaState};
