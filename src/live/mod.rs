//! Chart input: notes, song metadata and the numeric constant tables

pub mod chart;
pub mod constants;
pub mod note;

pub use chart::Live;
pub use constants::{combo_weight, combo_weights, level_multiplier, life_drain, timing_window, TimingWindow};
pub use note::Note;
