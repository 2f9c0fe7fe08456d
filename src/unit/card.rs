//! Cards: stats, skill and leader skill of one idol

use serde::{Deserialize, Serialize};

use crate::core::types::{Attribute, Color, Rarity};
use crate::skills::tables::potential_bonus;
use crate::skills::Skill;
use crate::unit::leader::LeaderSkill;

/// Stat bonus by appeal potential level 0..=10
const POTENTIAL_STAT_BONUS: [u32; 11] = [0, 60, 120, 180, 255, 330, 405, 495, 585, 675, 765];

/// Life bonus by life potential level 0..=10
const POTENTIAL_LIFE_BONUS: [u32; 11] = [0, 1, 2, 4, 6, 8, 10, 13, 16, 19, 22];

/// Potential allocation of a card
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Potential {
    #[serde(default)]
    pub vocal: u8,
    #[serde(default)]
    pub dance: u8,
    #[serde(default)]
    pub visual: u8,
    #[serde(default)]
    pub life: u8,
    #[serde(default)]
    pub skill: u8,
}

fn table_value(table: &[u32; 11], level: u8) -> u32 {
    table[(level as usize).min(table.len() - 1)]
}

/// One idol card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub card_id: u32,
    pub color: Color,
    pub rarity: Rarity,
    pub vocal: u32,
    pub dance: u32,
    pub visual: u32,
    pub life: u32,
    pub skill: Skill,
    pub leader: LeaderSkill,
    pub potential: Potential,
}

impl Card {
    pub fn new(card_id: u32, color: Color, rarity: Rarity, vocal: u32, dance: u32, visual: u32, life: u32) -> Self {
        Self {
            card_id,
            color,
            rarity,
            vocal,
            dance,
            visual,
            life,
            skill: Skill::none(),
            leader: LeaderSkill::none(),
            potential: Potential::default(),
        }
    }

    /// Attach a resolved skill, stamping it with this card's color and rarity
    pub fn with_skill(mut self, mut skill: Skill) -> Self {
        if !skill.is_none() {
            skill.color = self.color;
        }
        skill.rarity = self.rarity;
        self.skill = skill;
        self
    }

    pub fn with_leader(mut self, leader: LeaderSkill) -> Self {
        self.leader = leader;
        self
    }

    pub fn with_skill_level(mut self, level: u32) -> Self {
        self.skill = self.skill.with_level(level);
        self
    }

    /// Apply potential; the skill potential raises activation probability
    pub fn with_potential(mut self, potential: Potential) -> Self {
        self.potential = potential;
        if !self.skill.is_none() {
            let bonus = potential_bonus(potential.skill) as f64 / 10_000.0;
            self.skill.probability = (self.skill.probability + bonus).min(1.0);
        }
        self
    }

    pub fn stat(&self, attribute: Attribute) -> u32 {
        match attribute {
            Attribute::Vocal => self.vocal + table_value(&POTENTIAL_STAT_BONUS, self.potential.vocal),
            Attribute::Dance => self.dance + table_value(&POTENTIAL_STAT_BONUS, self.potential.dance),
            Attribute::Visual => self.visual + table_value(&POTENTIAL_STAT_BONUS, self.potential.visual),
        }
    }

    pub fn total_appeal(&self) -> u32 {
        self.stat(Attribute::Vocal) + self.stat(Attribute::Dance) + self.stat(Attribute::Visual)
    }

    pub fn total_life(&self) -> u32 {
        self.life + table_value(&POTENTIAL_LIFE_BONUS, self.potential.life)
    }
}
