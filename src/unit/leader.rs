//! Leader skills: unit-wide appeal / life / probability bonuses

use serde::{Deserialize, Serialize};

use crate::core::types::{Attribute, Color};
use crate::skills::ColorRequirements;

/// Percent bonuses a leader grants to cards of its target color
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderBonus {
    pub vocal: i32,
    pub dance: i32,
    pub visual: i32,
    pub life: i32,
    pub skill_probability: i32,
}

impl LeaderBonus {
    pub fn appeal(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Vocal => self.vocal,
            Attribute::Dance => self.dance,
            Attribute::Visual => self.visual,
        }
    }

    fn add(&mut self, other: &LeaderBonus) {
        self.vocal += other.vocal;
        self.dance += other.dance;
        self.visual += other.visual;
        self.life += other.life;
        self.skill_probability += other.skill_probability;
    }
}

/// A card's leader skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderSkill {
    /// `All` reaches every card
    pub target: Color,
    pub bonus: LeaderBonus,
    /// Unit color makeup needed for the leader to take effect
    #[serde(default)]
    pub requirements: Option<ColorRequirements>,
    /// Resonance trait: same-family bonuses sum within the sub-unit
    #[serde(default)]
    pub resonance: bool,
}

impl LeaderSkill {
    pub fn none() -> Self {
        Self {
            target: Color::All,
            bonus: LeaderBonus::default(),
            requirements: None,
            resonance: false,
        }
    }

    pub fn new(target: Color, bonus: LeaderBonus) -> Self {
        Self {
            target,
            bonus,
            requirements: None,
            resonance: false,
        }
    }

    /// Resonance leader (bonuses usually trade appeal for summing)
    pub fn resonance(target: Color, bonus: LeaderBonus) -> Self {
        Self {
            resonance: true,
            ..Self::new(target, bonus)
        }
    }

    pub fn applies_to(&self, card_color: Color, unit_colors: [u8; 3]) -> bool {
        let color_ok = self.target == Color::All || self.target == card_color;
        let makeup_ok = self.requirements.map_or(true, |req| req.satisfied_by(unit_colors));
        color_ok && makeup_ok
    }
}

/// Sum the bonuses of every leader (center, guest) that reach a card
pub fn aggregate_bonus<'a>(
    leaders: impl IntoIterator<Item = &'a LeaderSkill>,
    card_color: Color,
    unit_colors: [u8; 3],
) -> LeaderBonus {
    let mut total = LeaderBonus::default();
    for leader in leaders {
        if leader.applies_to(card_color, unit_colors) {
            total.add(&leader.bonus);
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leader_targets_color() {
        let leader = LeaderSkill::new(Color::Cute, LeaderBonus { vocal: 90, ..Default::default() });
        assert!(leader.applies_to(Color::Cute, [5, 0, 0]));
        assert!(!leader.applies_to(Color::Cool, [4, 1, 0]));
    }

    #[test]
    fn test_aggregate_center_and_guest() {
        let center = LeaderSkill::new(Color::All, LeaderBonus { life: 10, ..Default::default() });
        let guest = LeaderSkill::new(Color::All, LeaderBonus { life: 20, skill_probability: 5, ..Default::default() });
        let bonus = aggregate_bonus([&center, &guest], Color::Cool, [0, 6, 0]);
        assert_eq!(bonus.life, 30);
        assert_eq!(bonus.skill_probability, 5);
    }

    #[test]
    fn test_requirement_blocks_leader() {
        let mut leader = LeaderSkill::new(Color::All, LeaderBonus { dance: 30, ..Default::default() });
        leader.requirements = Some(ColorRequirements::tricolor());
        assert!(!leader.applies_to(Color::Cute, [5, 0, 0]));
        assert!(leader.applies_to(Color::Cute, [2, 2, 1]));
    }
}
