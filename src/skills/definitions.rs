//! Raw skill metadata and the skill family table
//!
//! Metadata comes from an external store; the crate only needs the raw row
//! shape and a `SkillSource` to look rows up.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{Attribute, Color, NoteType};
use crate::skills::family::{BoostScope, SkillFamily};
use crate::skills::tables::boost_lookup;

/// Ids above this value are user-authored skills
pub const CUSTOM_SKILL_ID_BASE: u32 = 500_000;

/// Skill types whose value is resolved through the boost table
pub const BOOST_SKILL_TYPES: [u32; 11] = [20, 32, 33, 34, 38, 45, 46, 47, 48, 49, 50];

/// One raw metadata row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSkill {
    pub id: u32,
    pub skill_type: u32,
    /// Seconds between activation attempts
    pub interval: u32,
    /// Max-level duration in seconds
    pub duration: f64,
    /// Activation probability cap, per 10000
    pub max_chance: u32,
    #[serde(default)]
    pub value: i32,
    #[serde(default)]
    pub value_2: i32,
    #[serde(default)]
    pub value_3: i32,
    /// Custom skills may require a song color
    #[serde(default)]
    pub song_required: Option<Color>,
}

/// Lookup of raw skill rows by id
pub trait SkillSource {
    /// Standard skill row
    fn raw_skill(&self, id: u32) -> Option<RawSkill>;

    /// User-authored skill row (ids above `CUSTOM_SKILL_ID_BASE`)
    fn custom_skill(&self, id: u32) -> Option<RawSkill>;
}

/// In-memory skill metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillCatalog {
    #[serde(default, rename = "skill")]
    skills: Vec<RawSkill>,
    #[serde(skip)]
    by_id: AHashMap<u32, RawSkill>,
}

impl SkillCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, raw: RawSkill) {
        self.skills.push(raw.clone());
        self.by_id.insert(raw.id, raw);
    }

    /// Builder form of `insert`
    pub fn with(mut self, raw: RawSkill) -> Self {
        self.insert(raw);
        self
    }

    /// Parse `[[skill]]` tables from a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut catalog: SkillCatalog = toml::from_str(content)?;
        catalog.by_id = catalog.skills.iter().map(|raw| (raw.id, raw.clone())).collect();
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl SkillSource for SkillCatalog {
    fn raw_skill(&self, id: u32) -> Option<RawSkill> {
        if id > CUSTOM_SKILL_ID_BASE {
            return None;
        }
        self.by_id.get(&id).cloned()
    }

    fn custom_skill(&self, id: u32) -> Option<RawSkill> {
        if id <= CUSTOM_SKILL_ID_BASE {
            return None;
        }
        self.by_id.get(&id).cloned()
    }
}

/// Family for a skill type; `None` when the type is unknown
pub fn family_for(raw: &RawSkill) -> Option<SkillFamily> {
    let family = match raw.skill_type {
        1..=3 => SkillFamily::Score,
        4 => SkillFamily::Combo,
        5..=7 => SkillFamily::PerfectSupport,
        9 => SkillFamily::ComboSupport,
        12 => SkillFamily::Guard,
        14 => SkillFamily::Overload,
        15 => SkillFamily::Concentration,
        16 => SkillFamily::Encore,
        17 => SkillFamily::Heal,
        20 => SkillFamily::Boost { scope: BoostScope::All, effect: boost_lookup(raw.value) },
        21 => SkillFamily::Focus { color: Color::Cute },
        22 => SkillFamily::Focus { color: Color::Cool },
        23 => SkillFamily::Focus { color: Color::Passion },
        24 => SkillFamily::AllRound,
        25 => SkillFamily::Sparkle,
        26 => SkillFamily::Tricolor,
        27 => SkillFamily::Coordinate,
        28 => SkillFamily::Act { note_type: NoteType::Long },
        29 => SkillFamily::Act { note_type: NoteType::Flick },
        30 => SkillFamily::Act { note_type: NoteType::Slide },
        31 => SkillFamily::Tuning,
        32 => SkillFamily::Boost { scope: BoostScope::Color(Color::Cute), effect: boost_lookup(raw.value) },
        33 => SkillFamily::Boost { scope: BoostScope::Color(Color::Cool), effect: boost_lookup(raw.value) },
        34 => SkillFamily::Boost { scope: BoostScope::Color(Color::Passion), effect: boost_lookup(raw.value) },
        35 => SkillFamily::Motif { axis: Attribute::Vocal },
        36 => SkillFamily::Motif { axis: Attribute::Dance },
        37 => SkillFamily::Motif { axis: Attribute::Visual },
        38 => SkillFamily::Boost { scope: BoostScope::Symphony, effect: boost_lookup(raw.value) },
        39 => SkillFamily::Alternate { multiplier: raw.value_2.max(0) },
        40 => SkillFamily::Refrain,
        41 => SkillFamily::Magic,
        42 => SkillFamily::Mutual { multiplier: raw.value_2.max(0) },
        44 => SkillFamily::Spike,
        45 => SkillFamily::Harmony { primary: Color::Cute, secondary: Color::Cool },
        46 => SkillFamily::Harmony { primary: Color::Cute, secondary: Color::Passion },
        47 => SkillFamily::Harmony { primary: Color::Cool, secondary: Color::Cute },
        48 => SkillFamily::Harmony { primary: Color::Cool, secondary: Color::Passion },
        49 => SkillFamily::Harmony { primary: Color::Passion, secondary: Color::Cute },
        50 => SkillFamily::Harmony { primary: Color::Passion, secondary: Color::Cool },
        _ => return None,
    };
    Some(family)
}

/// Percent-style value above the 100 baseline
fn over_baseline(value: i32) -> i32 {
    value - 100
}

/// Map raw values into the five generic slots
///
/// Slots: v0 score (perfect / normal note), v1 great or special-note score,
/// v2 combo, v3 life, v4 support level.
pub fn slots_for(raw: &RawSkill, family: &SkillFamily) -> [i32; 5] {
    if BOOST_SKILL_TYPES.contains(&raw.skill_type) {
        return [0; 5];
    }
    match family {
        SkillFamily::Score => {
            let great = if raw.skill_type >= 2 { over_baseline(raw.value) } else { 0 };
            [over_baseline(raw.value), great, 0, 0, 0]
        }
        SkillFamily::Combo => [0, 0, over_baseline(raw.value), 0, 0],
        SkillFamily::PerfectSupport => [0, 0, 0, 0, raw.skill_type as i32 - 4],
        SkillFamily::ComboSupport => [0, 0, 0, 0, 2],
        SkillFamily::Guard | SkillFamily::Encore | SkillFamily::Magic => [0; 5],
        SkillFamily::Overload => [over_baseline(raw.value), 0, 0, 0, 0],
        SkillFamily::Concentration => [over_baseline(raw.value), 0, 0, 0, 0],
        SkillFamily::Heal => [0, 0, 0, raw.value, 0],
        SkillFamily::Focus { .. } => [over_baseline(raw.value), 0, over_baseline(raw.value_2), 0, 0],
        SkillFamily::AllRound => [0, 0, over_baseline(raw.value), raw.value_2, 0],
        SkillFamily::Sparkle | SkillFamily::Motif { .. } => [0; 5],
        SkillFamily::Tricolor => [over_baseline(raw.value), 0, over_baseline(raw.value_3), raw.value_2, 0],
        SkillFamily::Coordinate => [over_baseline(raw.value), 0, over_baseline(raw.value_2), 0, 0],
        SkillFamily::Act { .. } => [over_baseline(raw.value), over_baseline(raw.value_2), 0, 0, 0],
        SkillFamily::Tuning => [0, 0, over_baseline(raw.value), 0, 1],
        SkillFamily::Alternate { .. } => [0, 0, over_baseline(raw.value), 0, 0],
        SkillFamily::Mutual { .. } => [over_baseline(raw.value), 0, 0, 0, 0],
        SkillFamily::Refrain => [0; 5],
        SkillFamily::Spike => [over_baseline(raw.value), 0, over_baseline(raw.value_2), 0, 0],
        SkillFamily::None | SkillFamily::Boost { .. } | SkillFamily::Harmony { .. } => {
            [raw.value, 0, raw.value_2, raw.value_3, 0]
        }
    }
}
