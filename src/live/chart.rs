//! Live chart: ordered note table and song metadata

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{to_micros, Color, Difficulty, NoteType};
use crate::live::constants::{GRAND_LANES, WIDE_LANES};
use crate::live::note::Note;

/// A resolved chart ready for simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Live {
    pub notes: Vec<Note>,
    pub difficulty: Difficulty,
    pub level: u32,
    /// Song duration in seconds
    pub duration: f64,
    pub color: Color,
    #[serde(default)]
    pub grand: bool,
}

impl Live {
    /// Build a chart, sorting notes by time and deriving note flags
    pub fn new(mut notes: Vec<Note>, difficulty: Difficulty, level: u32, duration: f64, color: Color) -> Self {
        notes.sort_by(|a, b| a.time.total_cmp(&b.time));
        let grand = matches!(difficulty, Difficulty::Piano | Difficulty::Forte);
        let mut live = Self {
            notes,
            difficulty,
            level,
            duration,
            color,
            grand,
        };
        live.derive_flags();
        live
    }

    /// Evenly spaced chart of `count` notes over `duration` seconds
    ///
    /// Notes sit at `(i + 1) * duration / (count + 1)`; lanes cycle 1..=5.
    pub fn evenly_spaced(
        count: usize,
        note_type: NoteType,
        difficulty: Difficulty,
        level: u32,
        duration: f64,
        color: Color,
    ) -> Self {
        let spacing = duration / (count as f64 + 1.0);
        let notes = (0..count)
            .map(|i| Note::new((i as f64 + 1.0) * spacing, note_type, (i % 5) as u8 + 1))
            .collect();
        Self::new(notes, difficulty, level, duration, color)
    }

    /// Recompute derived flags (microsecond time, group heads, checkpoints)
    ///
    /// Called after deserialisation since derived fields are skipped.
    pub fn derive_flags(&mut self) {
        let mut groups: AHashMap<u32, Vec<usize>> = AHashMap::new();
        for (idx, note) in self.notes.iter_mut().enumerate() {
            note.time_us = to_micros(note.time);
            note.checkpoint = false;
            note.group_head = false;
            if note.group_id != 0 {
                groups.entry(note.group_id).or_default().push(idx);
            }
        }

        for members in groups.values() {
            if let Some(&head) = members.first() {
                self.notes[head].group_head = true;
            }
            if members.len() > 2 {
                for &idx in &members[1..members.len() - 1] {
                    if self.notes[idx].is_slide() {
                        self.notes[idx].checkpoint = true;
                    }
                }
            }
        }
    }

    /// Notes that count towards score and combo
    pub fn scored_note_count(&self) -> usize {
        self.notes.iter().filter(|n| n.is_scored()).count()
    }

    pub fn lanes(&self) -> u8 {
        if self.grand {
            GRAND_LANES
        } else {
            WIDE_LANES
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slide_checkpoints_are_interior() {
        let notes = vec![
            Note::new(1.0, NoteType::Slide, 1).in_group(7),
            Note::new(1.5, NoteType::Slide, 2).in_group(7),
            Note::new(2.0, NoteType::Slide, 3).in_group(7),
            Note::new(2.5, NoteType::Slide, 4).in_group(7),
            Note::new(3.0, NoteType::Tap, 1),
        ];
        let live = Live::new(notes, Difficulty::Master, 26, 10.0, Color::All);

        let flags: Vec<bool> = live.notes.iter().map(|n| n.checkpoint).collect();
        assert_eq!(flags, vec![false, true, true, false, false]);
        assert!(live.notes[0].group_head);
        assert!(!live.notes[1].group_head);
    }

    #[test]
    fn test_notes_sorted_on_construction() {
        let notes = vec![Note::new(2.0, NoteType::Tap, 1), Note::new(1.0, NoteType::Tap, 2)];
        let live = Live::new(notes, Difficulty::Pro, 15, 5.0, Color::Cute);
        assert_eq!(live.notes[0].lane, 2);
        assert_eq!(live.notes[0].time_us, 1_000_000);
    }

    #[test]
    fn test_damage_notes_not_scored() {
        let notes = vec![Note::new(1.0, NoteType::Tap, 1), Note::new(1.5, NoteType::Damage, 2)];
        let live = Live::new(notes, Difficulty::MasterPlus, 28, 5.0, Color::All);
        assert_eq!(live.scored_note_count(), 1);
    }
}
