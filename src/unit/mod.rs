//! Cards, leader skills and formations (wide / grand)

pub mod card;
pub mod formation;
pub mod leader;

pub use card::{Card, Potential};
pub use formation::{Formation, GrandUnit, SlotCard, StageStats, Unit, SKILL_CARDS_PER_UNIT};
pub use leader::{LeaderBonus, LeaderSkill};
