//! Per-note and per-activation diagnostic records

use serde::{Deserialize, Serialize};

use crate::bonus::BonusKind;
use crate::core::types::{Judgement, Micros, NoteType, Slot};

/// Why an activation did not take effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkillInact {
    /// Lost its probability roll
    NotRolled,
    /// Encore with no earlier activation to copy
    NoEncoreable,
    /// Focus on a unit that is not monochrome of its color
    FocusColor,
    /// Tricolor / symphony / harmony color makeup not met
    ColorRequirement,
    /// Song color does not match
    SongColor,
    LifeTooLow,
    AltNoScore,
    MutNoCombo,
    RefNothing,
    MagicNoTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum SkillStatus {
    Active,
    /// Switched off by the caller (custom runs)
    Deactivated,
    Inactive(SkillInact),
}

/// Bonus copied by an alternate / mutual / refrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmrEntry {
    pub kind: BonusKind,
    pub value: i32,
    /// Activation whose bonus was copied
    pub source: Option<(Slot, u32)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmrBonus {
    pub entries: Vec<AmrEntry>,
}

/// What a magic activation copied
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagicBonus {
    pub guard: bool,
    pub concentration: bool,
    /// Copied families in processing order
    pub copies: Vec<(Slot, String)>,
}

/// One activation window of one card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDetail {
    pub slot: Slot,
    pub serial: u32,
    pub on: Micros,
    pub off: Micros,
    pub probability: f64,
    pub status: SkillStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encore_target: Option<Slot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amr_bonus: Option<AmrBonus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magic_bonus: Option<MagicBonus>,
}

impl SkillDetail {
    pub fn inact(&self) -> Option<SkillInact> {
        match self.status {
            SkillStatus::Inactive(reason) => Some(reason),
            _ => None,
        }
    }
}

/// One skill contribution applied to a note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDetailSkill {
    pub slot: Slot,
    /// Lane of the card in the formation
    pub lane: u8,
    pub kind: BonusKind,
    pub value: i32,
    /// Boosting slots and their percent
    pub boost_chain: Vec<(Slot, i32)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteDetail {
    pub index: usize,
    pub time: Micros,
    pub note_type: NoteType,
    pub lane: u8,
    pub judgement: Judgement,
    pub life: i32,
    pub combo: usize,
    pub score_bonus: i32,
    pub combo_bonus: i32,
    pub score: u64,
    pub cumulative_score: u64,
    pub skills: Vec<NoteDetailSkill>,
}

/// Everything a run recorded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveDetail {
    /// Indexed by chart position
    pub notes: Vec<Option<NoteDetail>>,
    pub skills: Vec<SkillDetail>,
    pub full_roll_chance: f64,
    pub max_life: i32,
}

impl LiveDetail {
    pub fn note(&self, index: usize) -> Option<&NoteDetail> {
        self.notes.get(index).and_then(Option::as_ref)
    }

    pub fn skill(&self, slot: Slot, serial: u32) -> Option<&SkillDetail> {
        self.skills.iter().find(|s| s.slot == slot && s.serial == serial)
    }

    /// First activation window of a slot
    pub fn first_skill(&self, slot: Slot) -> Option<&SkillDetail> {
        self.skills.iter().filter(|s| s.slot == slot).min_by_key(|s| s.serial)
    }
}
