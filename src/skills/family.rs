//! Skill families: the closed set of behaviours selected by `skill_type`

use serde::{Deserialize, Serialize};

use crate::core::types::{Attribute, Color, NoteType};

/// Boost magnitudes in percent (support is an additive level)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostEffect {
    pub score: i32,
    pub combo: i32,
    pub life: i32,
    pub support: i32,
}

impl BoostEffect {
    pub fn is_zero(&self) -> bool {
        *self == BoostEffect::default()
    }
}

/// Which skills a boost reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoostScope {
    /// Skill boost: every color
    All,
    /// Ensemble: skills of one color
    Color(Color),
    /// Symphony: every color, tricolor-gated
    Symphony,
}

/// Behaviour family of a skill
///
/// Every `skill_type` maps to exactly one variant; variants carry only the
/// parameters their resolution needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillFamily {
    /// Zero skill (id 0 or unresolvable)
    None,
    Score,
    Combo,
    PerfectSupport,
    ComboSupport,
    Guard,
    Overload,
    Concentration,
    Encore,
    Heal,
    Boost { scope: BoostScope, effect: BoostEffect },
    Focus { color: Color },
    AllRound,
    Sparkle,
    Tricolor,
    Coordinate,
    Act { note_type: NoteType },
    Tuning,
    Motif { axis: Attribute },
    Alternate { multiplier: i32 },
    Refrain,
    Magic,
    Mutual { multiplier: i32 },
    Spike,
    Harmony { primary: Color, secondary: Color },
}

/// Processing order for activations landing at the same instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkillPriority {
    Magic,
    Guard,
    Normal,
    Alternate,
    Mutual,
    Refrain,
}

impl SkillFamily {
    pub fn is_boost(&self) -> bool {
        matches!(self, SkillFamily::Boost { .. } | SkillFamily::Harmony { .. })
    }

    pub fn is_amr(&self) -> bool {
        matches!(
            self,
            SkillFamily::Alternate { .. } | SkillFamily::Mutual { .. } | SkillFamily::Refrain
        )
    }

    pub fn is_magic(&self) -> bool {
        matches!(self, SkillFamily::Magic)
    }

    pub fn is_encore(&self) -> bool {
        matches!(self, SkillFamily::Encore)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, SkillFamily::None)
    }

    pub fn is_guard(&self) -> bool {
        matches!(self, SkillFamily::Guard)
    }

    pub fn priority(&self) -> SkillPriority {
        match self {
            SkillFamily::Magic => SkillPriority::Magic,
            SkillFamily::Guard => SkillPriority::Guard,
            SkillFamily::Alternate { .. } => SkillPriority::Alternate,
            SkillFamily::Mutual { .. } => SkillPriority::Mutual,
            SkillFamily::Refrain => SkillPriority::Refrain,
            _ => SkillPriority::Normal,
        }
    }

    /// Perfect window halving
    pub fn is_concentration(&self) -> bool {
        matches!(self, SkillFamily::Concentration)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SkillFamily::None => "None",
            SkillFamily::Score => "Score Bonus",
            SkillFamily::Combo => "Combo Bonus",
            SkillFamily::PerfectSupport => "Perfect Support",
            SkillFamily::ComboSupport => "Combo Support",
            SkillFamily::Guard => "Damage Guard",
            SkillFamily::Overload => "Overload",
            SkillFamily::Concentration => "Concentration",
            SkillFamily::Encore => "Encore",
            SkillFamily::Heal => "Life Recovery",
            SkillFamily::Boost { scope: BoostScope::All, .. } => "Skill Boost",
            SkillFamily::Boost { scope: BoostScope::Color(_), .. } => "Ensemble",
            SkillFamily::Boost { scope: BoostScope::Symphony, .. } => "Symphony",
            SkillFamily::Focus { .. } => "Focus",
            SkillFamily::AllRound => "All-round",
            SkillFamily::Sparkle => "Life Sparkle",
            SkillFamily::Tricolor => "Tricolor Synergy",
            SkillFamily::Coordinate => "Coordinate",
            SkillFamily::Act { .. } => "Act",
            SkillFamily::Tuning => "Tuning",
            SkillFamily::Motif { .. } => "Motif",
            SkillFamily::Alternate { .. } => "Alternate",
            SkillFamily::Refrain => "Refrain",
            SkillFamily::Magic => "Magic",
            SkillFamily::Mutual { .. } => "Mutual",
            SkillFamily::Spike => "Spike",
            SkillFamily::Harmony { .. } => "Harmony",
        }
    }
}
