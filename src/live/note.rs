//! Chart notes and their derived flags

use serde::{Deserialize, Serialize};

use crate::core::types::{Micros, NoteType};

/// One chart entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Nominal hit time in seconds
    pub time: f64,
    pub note_type: NoteType,
    /// Lane (finish position), 1-based
    pub lane: u8,
    #[serde(default)]
    pub sync: bool,
    /// Long / slide chain id, 0 for standalone notes
    #[serde(default)]
    pub group_id: u32,

    /// Derived: interior note of a slide group (not first, not last)
    #[serde(skip)]
    pub checkpoint: bool,
    /// Derived: first note of its long/slide group
    #[serde(skip)]
    pub group_head: bool,
    /// Derived: nominal time in microseconds
    #[serde(skip)]
    pub time_us: Micros,
}

impl Note {
    pub fn new(time: f64, note_type: NoteType, lane: u8) -> Self {
        Self {
            time,
            note_type,
            lane,
            sync: false,
            group_id: 0,
            checkpoint: false,
            group_head: false,
            time_us: crate::core::types::to_micros(time),
        }
    }

    /// Builder: attach the note to a long/slide group
    pub fn in_group(mut self, group_id: u32) -> Self {
        self.group_id = group_id;
        self
    }

    pub fn is_flick(&self) -> bool {
        self.note_type == NoteType::Flick
    }

    pub fn is_long(&self) -> bool {
        self.note_type == NoteType::Long
    }

    pub fn is_slide(&self) -> bool {
        self.note_type == NoteType::Slide
    }

    /// Damage notes are avoided and never scored
    pub fn is_scored(&self) -> bool {
        self.note_type != NoteType::Damage
    }

    /// Holds are long and slide chains
    pub fn is_held(&self) -> bool {
        self.group_id != 0 && matches!(self.note_type, NoteType::Long | NoteType::Slide)
    }

    /// Lane seen from the other side of the stage
    pub fn mirrored_lane(&self, lanes: u8) -> u8 {
        lanes + 1 - self.lane.min(lanes)
    }
}
