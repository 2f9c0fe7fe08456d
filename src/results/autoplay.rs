//! Autoplay summary

use serde::{Deserialize, Serialize};

use crate::core::types::{Judgement, Micros};
use crate::results::detail::LiveDetail;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoplayResult {
    pub total: u64,
    pub perfects: usize,
    pub misses: usize,
    pub max_combo: usize,
    pub lowest_life: i32,
    pub lowest_life_time: Micros,
    /// Every skill activates with certainty, so this run is exact
    pub all_100: bool,
    pub detail: LiveDetail,
}

impl AutoplayResult {
    /// Count judgements from a recorded run
    pub fn count(judgements: impl IntoIterator<Item = Judgement>) -> (usize, usize) {
        judgements.into_iter().fold((0, 0), |(perfects, misses), j| match j {
            Judgement::Perfect => (perfects + 1, misses),
            Judgement::Miss => (perfects, misses + 1),
            _ => (perfects, misses),
        })
    }

    pub fn full_combo(&self) -> bool {
        self.misses == 0
    }
}
