//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Microseconds since the start of the live
pub type Micros = i64;

/// Card slot in the formation (1-based, sign encodes activation/deactivation)
pub type Slot = usize;

/// Convert chart seconds to engine microseconds
pub fn to_micros(seconds: f64) -> Micros {
    (seconds * 1_000_000.0).round() as Micros
}

/// Idol / song color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Cute,
    Cool,
    Passion,
    /// Songs playable by every color (no color match bonus restriction)
    All,
}

impl Color {
    /// The three concrete card colors
    pub const CARD_COLORS: [Color; 3] = [Color::Cute, Color::Cool, Color::Passion];

    /// Index into per-color tables, `None` for `All`
    pub fn index(self) -> Option<usize> {
        match self {
            Color::Cute => Some(0),
            Color::Cool => Some(1),
            Color::Passion => Some(2),
            Color::All => None,
        }
    }

    /// Does a card of this color match the given song color?
    pub fn matches_song(self, song: Color) -> bool {
        song == Color::All || self == song
    }
}

/// Appeal attribute axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Vocal,
    Dance,
    Visual,
}

/// Card rarity (only SR / SSR matter for sparkle tables)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    N,
    R,
    Sr,
    #[default]
    Ssr,
}

/// Chart note types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    Tap,
    Long,
    Flick,
    Slide,
    /// Bomb note: never scored, never combo'd, avoided in every mode
    Damage,
}

impl NoteType {
    /// Index into per-type value tables (tap, long, flick, slide)
    pub fn value_index(self) -> usize {
        match self {
            NoteType::Tap | NoteType::Damage => 0,
            NoteType::Long => 1,
            NoteType::Flick => 2,
            NoteType::Slide => 3,
        }
    }
}

/// Chart difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Debut,
    Regular,
    Pro,
    Master,
    MasterPlus,
    Light,
    Trick,
    /// Grand live difficulties
    Piano,
    Forte,
}

impl Difficulty {
    /// Row into timing window / drain tables
    pub fn table_index(self) -> usize {
        match self {
            Difficulty::Debut | Difficulty::Light => 0,
            Difficulty::Regular => 1,
            Difficulty::Pro => 2,
            Difficulty::Master | Difficulty::Trick | Difficulty::Piano => 3,
            Difficulty::MasterPlus | Difficulty::Forte => 4,
        }
    }
}

/// Per-note judgement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Judgement {
    Perfect,
    Great,
    Nice,
    Bad,
    Miss,
}

impl Judgement {
    /// Score multiplier applied to the note's base score
    pub fn multiplier(self) -> f64 {
        match self {
            Judgement::Perfect => 1.0,
            Judgement::Great => 0.7,
            Judgement::Nice => 0.4,
            Judgement::Bad => 0.1,
            Judgement::Miss => 0.0,
        }
    }

    /// Distance below PERFECT (0 = perfect, 4 = miss)
    pub fn severity(self) -> u8 {
        match self {
            Judgement::Perfect => 0,
            Judgement::Great => 1,
            Judgement::Nice => 2,
            Judgement::Bad => 3,
            Judgement::Miss => 4,
        }
    }

    /// Judgements that keep combo without any support
    pub fn keeps_combo(self) -> bool {
        matches!(self, Judgement::Perfect | Judgement::Great)
    }
}
