//! Load a complete simulation scenario from TOML
//!
//! A scenario bundles skill metadata, the card list, the chart and the
//! config flags:
//!
//! ```toml
//! support_appeal = 100000
//!
//! [config]
//! doublelife = true
//!
//! [[skill]]
//! id = 100001
//! skill_type = 1
//! interval = 7
//! duration = 4.5
//! max_chance = 4000
//! value = 118
//!
//! [[card]]
//! card_id = 300001
//! color = "cute"
//! rarity = "ssr"
//! vocal = 6000
//! dance = 6000
//! visual = 6000
//! life = 40
//! skill_id = 100001
//!
//! [live]
//! difficulty = "master"
//! level = 28
//! duration = 120.0
//! color = "cute"
//!
//! [[live.note]]
//! time = 1.5
//! note_type = "tap"
//! lane = 3
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{Color, Difficulty, Rarity};
use crate::live::{Live, Note};
use crate::skills::{RawSkill, Skill, SkillCatalog, MAX_SKILL_LEVEL};
use crate::skills::tables::potential_bonus;
use crate::unit::{Card, Formation, LeaderSkill, Potential};

/// One card entry; `None` entries in `[[card]]` are not representable in
/// TOML, so an omitted slot is written as `empty = true`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardEntry {
    #[serde(default)]
    pub empty: bool,
    #[serde(default)]
    pub card_id: u32,
    #[serde(default = "default_color")]
    pub color: Color,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub vocal: u32,
    #[serde(default)]
    pub dance: u32,
    #[serde(default)]
    pub visual: u32,
    #[serde(default)]
    pub life: u32,
    #[serde(default)]
    pub skill_id: u32,
    #[serde(default = "default_skill_level")]
    pub skill_level: u32,
    #[serde(default)]
    pub potential: Potential,
    #[serde(default)]
    pub leader: Option<LeaderSkill>,
}

fn default_color() -> Color {
    Color::Cute
}

fn default_skill_level() -> u32 {
    MAX_SKILL_LEVEL
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveEntry {
    pub difficulty: Difficulty,
    pub level: u32,
    pub duration: f64,
    pub color: Color,
    #[serde(default, rename = "note")]
    pub notes: Vec<Note>,
}

/// Scenario file as written on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioFile {
    #[serde(default)]
    pub config: SimulationConfig,
    #[serde(default)]
    pub support_appeal: u32,
    #[serde(default, rename = "skill")]
    pub skills: Vec<RawSkill>,
    #[serde(default, rename = "card")]
    pub cards: Vec<CardEntry>,
    pub live: LiveEntry,
}

/// Resolved scenario, ready for `Simulator::setup`
#[derive(Debug, Clone)]
pub struct Scenario {
    pub formation: Formation,
    pub live: Live,
    pub config: SimulationConfig,
}

impl Scenario {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ScenarioFile = toml::from_str(content)?;
        Self::resolve(file)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| SimError::Scenario(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    fn resolve(file: ScenarioFile) -> Result<Self> {
        file.config.validate()?;

        let mut catalog = SkillCatalog::new();
        for raw in file.skills {
            catalog.insert(raw);
        }

        let cards = file.cards.iter().map(|entry| resolve_card(entry, &catalog)).collect();
        let formation = Formation::from_cards(cards)?.with_support(file.support_appeal);

        let live_entry = file.live;
        if live_entry.notes.is_empty() {
            return Err(SimError::Scenario("live has no notes".to_string()));
        }
        let live = Live::new(
            live_entry.notes,
            live_entry.difficulty,
            live_entry.level,
            live_entry.duration,
            live_entry.color,
        );

        tracing::debug!(
            "Loaded scenario: {} skills, {} cards, {} notes",
            catalog.len(),
            formation.all_cards().len(),
            live.notes.len()
        );

        Ok(Self {
            formation,
            live,
            config: file.config,
        })
    }
}

fn resolve_card(entry: &CardEntry, catalog: &SkillCatalog) -> Option<Card> {
    if entry.empty {
        return None;
    }
    let skill = Skill::resolve(catalog, entry.skill_id, potential_bonus(entry.potential.skill), Some(entry.color))
        .with_level(entry.skill_level);
    let mut card = Card::new(
        entry.card_id,
        entry.color,
        entry.rarity,
        entry.vocal,
        entry.dance,
        entry.visual,
        entry.life,
    )
    .with_skill(skill);
    card.potential = entry.potential;
    if let Some(leader) = &entry.leader {
        card = card.with_leader(leader.clone());
    }
    Some(card)
}
