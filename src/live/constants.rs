//! Live constants - all tunable chart values in one place
//!
//! Timing windows are half-widths in microseconds. A hit whose absolute
//! delta is less than or equal to a bound earns that judgement.

use crate::core::types::{Difficulty, Judgement, Micros, NoteType};

/// Half-width windows for one note kind at one difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingWindow {
    pub perfect: Micros,
    pub great: Micros,
    pub nice: Micros,
    pub bad: Micros,
}

impl TimingWindow {
    const fn new(perfect: Micros, great: Micros, nice: Micros, bad: Micros) -> Self {
        Self { perfect, great, nice, bad }
    }

    /// Judgement for a signed hit delta
    ///
    /// `concentration` halves the PERFECT half-width.
    pub fn judge(&self, delta: Micros, concentration: bool) -> Judgement {
        let distance = delta.abs();
        let perfect = if concentration { self.perfect / 2 } else { self.perfect };
        if distance <= perfect {
            Judgement::Perfect
        } else if distance <= self.great {
            Judgement::Great
        } else if distance <= self.nice {
            Judgement::Nice
        } else if distance <= self.bad {
            Judgement::Bad
        } else {
            Judgement::Miss
        }
    }
}

/// Tap / long windows per difficulty row (debut, regular, pro, master, master+)
pub const TAP_WINDOWS: [TimingWindow; 5] = [
    TimingWindow::new(80_000, 100_000, 120_000, 140_000),
    TimingWindow::new(70_000, 90_000, 110_000, 130_000),
    TimingWindow::new(60_000, 80_000, 100_000, 120_000),
    TimingWindow::new(60_000, 80_000, 100_000, 120_000),
    TimingWindow::new(60_000, 80_000, 100_000, 120_000),
];

/// Flick windows are wider and identical across difficulties
pub const FLICK_WINDOW: TimingWindow = TimingWindow::new(150_000, 170_000, 190_000, 200_000);

/// Slide notes are PERFECT or MISS
pub const SLIDE_WINDOW: TimingWindow = TimingWindow::new(200_000, 200_000, 200_000, 200_000);

/// Window for a note kind at a difficulty
pub fn timing_window(difficulty: Difficulty, note_type: NoteType) -> TimingWindow {
    match note_type {
        NoteType::Flick => FLICK_WINDOW,
        NoteType::Slide => SLIDE_WINDOW,
        NoteType::Tap | NoteType::Long | NoteType::Damage => TAP_WINDOWS[difficulty.table_index()],
    }
}

/// Life lost on MISS per difficulty row
pub const MISS_DRAIN: [i32; 5] = [10, 12, 15, 20, 25];

/// Life lost on BAD per difficulty row
pub const BAD_DRAIN: [i32; 5] = [5, 6, 8, 10, 12];

/// Life drain for a judgement; slide checkpoints lose half
pub fn life_drain(difficulty: Difficulty, judgement: Judgement, checkpoint: bool) -> i32 {
    let row = difficulty.table_index();
    let drain = match judgement {
        Judgement::Miss => MISS_DRAIN[row],
        Judgement::Bad => BAD_DRAIN[row],
        _ => 0,
    };
    if checkpoint {
        drain / 2
    } else {
        drain
    }
}

/// Combo weight tiers as (minimum combo ratio, weight)
pub const COMBO_WEIGHT_TIERS: [(f64, f64); 8] = [
    (0.0, 1.0),
    (0.05, 1.1),
    (0.10, 1.2),
    (0.25, 1.3),
    (0.50, 1.4),
    (0.70, 1.5),
    (0.80, 1.7),
    (0.90, 2.0),
];

/// Weight for a combo count given the scorable note count
pub fn combo_weight(combo: usize, note_count: usize) -> f64 {
    if note_count == 0 {
        return 1.0;
    }
    let ratio = combo as f64 / note_count as f64;
    COMBO_WEIGHT_TIERS
        .iter()
        .rev()
        .find(|(bound, _)| ratio >= *bound)
        .map_or(1.0, |(_, weight)| *weight)
}

/// Precomputed weight table indexed by combo (0..=note_count)
pub fn combo_weights(note_count: usize) -> Vec<f64> {
    (0..=note_count).map(|combo| combo_weight(combo, note_count)).collect()
}

/// Score multiplier for a chart level
///
/// Levels 1-5 share the base multiplier, each level above adds 2.5%.
pub fn level_multiplier(level: u32) -> f64 {
    let level = level.clamp(1, 30);
    1.0 + 0.025 * level.saturating_sub(5) as f64
}

/// Seconds at the end of a live during which no activation may start
pub const ACTIVATION_TAIL_SECONDS: f64 = 3.0;

/// Lanes in a wide live (grand lives use 15)
pub const WIDE_LANES: u8 = 5;
pub const GRAND_LANES: u8 = 15;
