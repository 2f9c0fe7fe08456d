//! Owned per-activation skill copies
//!
//! The `Skill` template never changes during a run. Every activation builds
//! `LiveSkill` working copies whose `SkillValues` are the unboosted payload.

use serde::{Deserialize, Serialize};

use crate::core::types::{Color, Micros, NoteType, Slot};
use crate::skills::tables::HARMONY_BOOST;
use crate::skills::{BoostEffect, BoostScope, Skill, SkillFamily};

/// One bonus axis produced by skills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusKind {
    Tap,
    Long,
    Flick,
    Slide,
    Great,
    Combo,
    Life,
    PerfectSupport,
    ComboSupport,
}

/// Boost attribute that scales a bonus kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostAttr {
    Score,
    Combo,
    Life,
    Support,
}

impl BoostAttr {
    pub const ALL: [BoostAttr; 4] = [BoostAttr::Score, BoostAttr::Combo, BoostAttr::Life, BoostAttr::Support];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn of(self, effect: &BoostEffect) -> i32 {
        match self {
            BoostAttr::Score => effect.score,
            BoostAttr::Combo => effect.combo,
            BoostAttr::Life => effect.life,
            BoostAttr::Support => effect.support,
        }
    }
}

impl BonusKind {
    pub const COUNT: usize = 9;

    pub const ALL: [BonusKind; Self::COUNT] = [
        BonusKind::Tap,
        BonusKind::Long,
        BonusKind::Flick,
        BonusKind::Slide,
        BonusKind::Great,
        BonusKind::Combo,
        BonusKind::Life,
        BonusKind::PerfectSupport,
        BonusKind::ComboSupport,
    ];

    pub const SCORE: [BonusKind; 4] = [BonusKind::Tap, BonusKind::Long, BonusKind::Flick, BonusKind::Slide];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Score axis for a note type
    pub fn score_for(note_type: NoteType) -> BonusKind {
        BonusKind::SCORE[note_type.value_index()]
    }

    pub fn is_score(self) -> bool {
        matches!(self, BonusKind::Tap | BonusKind::Long | BonusKind::Flick | BonusKind::Slide)
    }

    pub fn boost_attr(self) -> BoostAttr {
        match self {
            BonusKind::Tap | BonusKind::Long | BonusKind::Flick | BonusKind::Slide | BonusKind::Great => {
                BoostAttr::Score
            }
            BonusKind::Combo => BoostAttr::Combo,
            BonusKind::Life => BoostAttr::Life,
            BonusKind::PerfectSupport | BonusKind::ComboSupport => BoostAttr::Support,
        }
    }

    /// Apply a boost to a raw value; only positive values are boosted
    pub fn boosted(self, raw: i32, percent: i32) -> i32 {
        if raw <= 0 {
            return raw;
        }
        match self.boost_attr() {
            BoostAttr::Support => raw + percent,
            _ => {
                let scaled = raw as i64 * (100 + percent as i64);
                ((scaled + 99) / 100) as i32
            }
        }
    }
}

/// Unboosted payload per bonus kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkillValues([i32; BonusKind::COUNT]);

impl SkillValues {
    pub fn get(&self, kind: BonusKind) -> i32 {
        self.0[kind.index()]
    }

    pub fn set(&mut self, kind: BonusKind, value: i32) {
        self.0[kind.index()] = value;
    }

    pub fn set_score(&mut self, value: i32) {
        for kind in BonusKind::SCORE {
            self.set(kind, value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&v| v == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BonusKind, i32)> + '_ {
        BonusKind::ALL.iter().map(move |&kind| (kind, self.get(kind)))
    }

    /// Static payload of a skill from its slots
    ///
    /// Sparkle, motif and AMR payloads depend on live state and are filled in
    /// at activation or resolution.
    pub fn from_skill(skill: &Skill) -> Self {
        let [v0, v1, v2, v3, v4] = skill.values;
        let mut values = SkillValues::default();
        match skill.family {
            SkillFamily::Score => {
                values.set_score(v0);
                values.set(BonusKind::Great, v1);
            }
            SkillFamily::Act { note_type } => {
                values.set_score(v0);
                values.set(BonusKind::score_for(note_type), v1);
            }
            SkillFamily::PerfectSupport => values.set(BonusKind::PerfectSupport, v4),
            SkillFamily::ComboSupport => values.set(BonusKind::ComboSupport, v4),
            SkillFamily::Overload => {
                values.set_score(v0);
                values.set(BonusKind::ComboSupport, OVERLOAD_COMBO_SUPPORT);
            }
            SkillFamily::Tuning => {
                values.set(BonusKind::Combo, v2);
                values.set(BonusKind::PerfectSupport, v4);
            }
            SkillFamily::Boost { .. }
            | SkillFamily::Harmony { .. }
            | SkillFamily::Guard
            | SkillFamily::Encore
            | SkillFamily::Magic
            | SkillFamily::Sparkle
            | SkillFamily::Motif { .. }
            | SkillFamily::Refrain
            | SkillFamily::None => {}
            SkillFamily::Alternate { .. } => values.set(BonusKind::Combo, v2),
            SkillFamily::Mutual { .. } => values.set_score(v0),
            _ => {
                values.set_score(v0);
                values.set(BonusKind::Combo, v2);
                values.set(BonusKind::Life, v3);
            }
        }
        values
    }
}

/// Combo support level granted by overload
pub const OVERLOAD_COMBO_SUPPORT: i32 = 2;

/// A working copy of one skill effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveSkill {
    /// Card whose effect this copy carries
    pub origin_slot: Slot,
    pub skill: Skill,
    pub values: SkillValues,
    /// Values copied from already-boosted bonuses; never boosted again
    pub derived: bool,
}

impl LiveSkill {
    pub fn new(origin_slot: Slot, skill: Skill) -> Self {
        let values = SkillValues::from_skill(&skill);
        Self {
            origin_slot,
            skill,
            values,
            derived: false,
        }
    }

    pub fn family(&self) -> SkillFamily {
        self.skill.family
    }

    pub fn color(&self) -> Color {
        self.skill.color
    }

    /// Colors and magnitudes this copy boosts
    pub fn boost_effect(&self) -> Option<(Vec<Color>, BoostEffect)> {
        match self.skill.family {
            SkillFamily::Boost { scope: BoostScope::Color(color), effect } => Some((vec![color], effect)),
            SkillFamily::Boost { effect, .. } => Some((Color::CARD_COLORS.to_vec(), effect)),
            SkillFamily::Harmony { primary, .. } => Some((vec![primary], HARMONY_BOOST)),
            _ => None,
        }
    }
}

/// How copies of one activation aggregate before the sub-unit step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grouping {
    /// One plain copy
    Single,
    /// Magic copies collapse to their per-kind max
    MagicMax,
    /// Encored magic copies aggregate like individual skills
    Escaped,
}

/// A resolved activation occupying a slot of the active map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSkill {
    pub slot: Slot,
    pub serial: u32,
    /// Sub-unit whose aggregation table this activation feeds
    pub sub_unit: usize,
    pub on: Micros,
    pub off: Micros,
    pub copies: Vec<LiveSkill>,
    pub grouping: Grouping,
    /// Slot copied by an encore
    pub encore_target: Option<Slot>,
}

impl ActiveSkill {
    pub fn is_magic(&self) -> bool {
        self.grouping != Grouping::Single
    }

    pub fn has_family(&self, predicate: impl Fn(&SkillFamily) -> bool) -> bool {
        self.copies.iter().any(|c| predicate(&c.skill.family))
    }

    pub fn has_sparkle(&self) -> bool {
        self.has_family(|f| matches!(f, SkillFamily::Sparkle))
    }

    /// Life consumed on activation by overload copies
    pub fn life_cost(&self) -> i32 {
        self.copies
            .iter()
            .filter(|c| matches!(c.skill.family, SkillFamily::Overload))
            .map(|c| c.skill.life_requirement)
            .sum()
    }
}
