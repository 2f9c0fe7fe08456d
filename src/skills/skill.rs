//! Runtime skill descriptor and its construction from metadata

use serde::{Deserialize, Serialize};

use crate::core::types::{Color, NoteType, Rarity};
use crate::skills::definitions::{family_for, slots_for, SkillSource, CUSTOM_SKILL_ID_BASE};
use crate::skills::family::{BoostScope, SkillFamily};
use crate::skills::tables::life_requirement;

/// Per-color card counts a sub-unit must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRequirements {
    pub min: [u8; 3],
    pub max: [u8; 3],
}

impl ColorRequirements {
    /// Every card must be `color`
    pub fn monochrome(color: Color) -> Option<Self> {
        let idx = color.index()?;
        let mut max = [0; 3];
        let mut min = [0; 3];
        max[idx] = u8::MAX;
        min[idx] = 1;
        Some(Self { min, max })
    }

    /// All three colors present
    pub fn tricolor() -> Self {
        Self { min: [1, 1, 1], max: [u8::MAX; 3] }
    }

    /// Only the two given colors, both present
    pub fn pair(primary: Color, secondary: Color) -> Option<Self> {
        let (a, b) = (primary.index()?, secondary.index()?);
        let mut min = [0; 3];
        let mut max = [0; 3];
        for idx in [a, b] {
            min[idx] = 1;
            max[idx] = u8::MAX;
        }
        Some(Self { min, max })
    }

    pub fn satisfied_by(&self, counts: [u8; 3]) -> bool {
        (0..3).all(|i| counts[i] >= self.min[i] && counts[i] <= self.max[i])
    }
}

/// A resolved skill template
///
/// Immutable for the whole run; activations take owned working copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub skill_id: u32,
    pub skill_type: u32,
    pub family: SkillFamily,
    pub color: Color,
    pub rarity: Rarity,
    /// Max-level duration in seconds
    pub duration: f64,
    /// Seconds between activations
    pub interval: f64,
    /// Activation probability in [0, 1]
    pub probability: f64,
    pub values: [i32; 5],
    /// Grand stagger index (0/1/2)
    pub offset: usize,
    pub is_boost: bool,
    /// Boost reaches only skills of specific colors
    pub color_target: bool,
    /// Special note type for act skills
    pub act: Option<NoteType>,
    pub requirements: Option<ColorRequirements>,
    pub song_required: Option<Color>,
    /// Life needed (and for overload consumed) to activate
    pub life_requirement: i32,
    /// 1..=10; scales the active window
    pub skill_level: u32,
}

pub const MAX_SKILL_LEVEL: u32 = 10;

impl Skill {
    /// The "no skill" descriptor
    pub fn none() -> Self {
        Self {
            skill_id: 0,
            skill_type: 0,
            family: SkillFamily::None,
            color: Color::All,
            rarity: Rarity::default(),
            duration: 0.0,
            interval: 0.0,
            probability: 0.0,
            values: [0; 5],
            offset: 0,
            is_boost: false,
            color_target: false,
            act: None,
            requirements: None,
            song_required: None,
            life_requirement: 0,
            skill_level: MAX_SKILL_LEVEL,
        }
    }

    /// Resolve a skill id into a runtime skill
    ///
    /// `bonus_probability` is per 10000 (skill potential). Unknown ids degrade
    /// to the zero skill.
    pub fn resolve(
        source: &dyn SkillSource,
        skill_id: u32,
        bonus_probability: u32,
        color: Option<Color>,
    ) -> Self {
        if skill_id == 0 {
            return Self::none();
        }

        let raw = if skill_id > CUSTOM_SKILL_ID_BASE {
            source.custom_skill(skill_id)
        } else {
            source.raw_skill(skill_id)
        };
        let Some(raw) = raw else {
            tracing::warn!("Skill {} not found in metadata, using zero skill", skill_id);
            return Self::none();
        };
        let Some(family) = family_for(&raw) else {
            tracing::warn!(
                "Skill {} has unknown skill_type {}, using zero skill",
                skill_id,
                raw.skill_type
            );
            return Self::none();
        };
        if raw.interval == 0 {
            tracing::warn!("Skill {} has zero interval, using zero skill", skill_id);
            return Self::none();
        }

        let values = slots_for(&raw, &family);
        let chance = (raw.max_chance + bonus_probability).min(10_000);

        let requirements = match family {
            SkillFamily::Focus { color } => ColorRequirements::monochrome(color),
            SkillFamily::Tricolor | SkillFamily::Boost { scope: BoostScope::Symphony, .. } => {
                Some(ColorRequirements::tricolor())
            }
            SkillFamily::Harmony { primary, secondary } => ColorRequirements::pair(primary, secondary),
            _ => None,
        };

        let life_req = match family {
            SkillFamily::Overload | SkillFamily::Spike => life_requirement(raw.interval),
            _ => 0,
        };

        Self {
            skill_id,
            skill_type: raw.skill_type,
            family,
            color: color.unwrap_or(Color::All),
            rarity: Rarity::default(),
            duration: raw.duration,
            interval: raw.interval as f64,
            probability: chance as f64 / 10_000.0,
            values,
            offset: 0,
            is_boost: family.is_boost(),
            color_target: matches!(
                family,
                SkillFamily::Boost { scope: BoostScope::Color(_), .. } | SkillFamily::Harmony { .. }
            ),
            act: match family {
                SkillFamily::Act { note_type } => Some(note_type),
                _ => None,
            },
            requirements,
            song_required: raw.song_required,
            life_requirement: life_req,
            skill_level: MAX_SKILL_LEVEL,
        }
    }

    pub fn is_none(&self) -> bool {
        self.family.is_none() || self.interval <= 0.0
    }

    /// Active window length in seconds for this skill level
    pub fn active_seconds(&self) -> f64 {
        let level = self.skill_level.clamp(1, MAX_SKILL_LEVEL) as f64;
        self.interval.min(self.duration) / 1.5 * (1.0 + (level - 1.0) / 18.0)
    }

    /// Does a boost from this skill reach a skill of `target` color?
    pub fn boost_reaches(&self, target: Color) -> bool {
        match self.family {
            SkillFamily::Boost { scope: BoostScope::Color(color), .. } => target == color,
            SkillFamily::Harmony { primary, .. } => target == primary,
            SkillFamily::Boost { .. } => true,
            _ => false,
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.skill_level = level.clamp(1, MAX_SKILL_LEVEL);
        self
    }

    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }
}
