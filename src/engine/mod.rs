//! Event-driven scoring loop

pub mod abuse;
pub mod judgement;
pub mod mode;
pub mod state;

pub use mode::{CustomRun, RunMode};
pub use state::{note_score, NoteOutcome, StateMachine};
