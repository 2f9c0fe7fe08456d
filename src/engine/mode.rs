//! Run modes of the state machine

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::core::types::{Micros, Slot};

/// What-if inputs for a custom run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomRun {
    /// Activation serials switched off per slot
    pub disabled: BTreeMap<Slot, BTreeSet<u32>>,
    /// Hit offset in microseconds per note index
    pub note_offsets: BTreeMap<usize, Micros>,
    /// Note indices judged MISS regardless of timing
    pub forced_misses: BTreeSet<usize>,
}

impl CustomRun {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disable(mut self, slot: Slot, serial: u32) -> Self {
        self.disabled.entry(slot).or_default().insert(serial);
        self
    }

    pub fn offset(mut self, note: usize, offset: Micros) -> Self {
        self.note_offsets.insert(note, offset);
        self
    }

    pub fn miss(mut self, note: usize) -> Self {
        self.forced_misses.insert(note);
        self
    }

    pub fn is_disabled(&self, slot: Slot, serial: u32) -> bool {
        self.disabled.get(&slot).map_or(false, |s| s.contains(&serial))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunMode {
    /// Every note PERFECT, every activation taken
    Perfect,
    /// Random hit offsets, rolled activations
    Probabilistic { perfect_only: bool },
    /// Fixed input lag; holds break on misses
    Autoplay { time_offset: Micros, special_offset: Micros },
    /// Perfect baseline that records bonus snapshots for probing
    Abuse,
    Custom(CustomRun),
}
