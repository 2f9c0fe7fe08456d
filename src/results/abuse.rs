//! Abuse output: best achievable timing per note

use serde::{Deserialize, Serialize};

use crate::core::types::{Judgement, Micros};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbuseNote {
    pub index: usize,
    pub time: Micros,
    pub baseline_score: u64,
    /// Best score minus the perfect baseline
    pub score_delta: i64,
    /// Hit offsets (relative to the note) achieving the best score
    pub window_left: Micros,
    pub window_right: Micros,
    pub judgement: Judgement,
    /// Lowest combo-keeping score
    pub worst_score: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbuseData {
    pub notes: Vec<AbuseNote>,
}

impl AbuseData {
    pub fn score_deltas(&self) -> Vec<i64> {
        self.notes.iter().map(|n| n.score_delta).collect()
    }

    pub fn total_delta(&self) -> i64 {
        self.notes.iter().map(|n| n.score_delta).sum()
    }

    pub fn worst_total(&self) -> u64 {
        self.notes.iter().map(|n| n.worst_score).sum()
    }

    pub fn abusable(&self) -> impl Iterator<Item = &AbuseNote> {
        self.notes.iter().filter(|n| n.score_delta > 0)
    }
}
