//! Shared fixtures for integration tests

#![allow(dead_code)]

use stage_sim::core::config::SimulationConfig;
use stage_sim::core::types::{Color, Difficulty, NoteType, Rarity};
use stage_sim::live::{Live, Note};
use stage_sim::skills::{RawSkill, Skill, SkillCatalog};
use stage_sim::simulator::{PreparedSimulation, Simulator};
use stage_sim::unit::{Card, Formation, LeaderBonus, LeaderSkill};

pub fn raw(id: u32, skill_type: u32, interval: u32, duration: f64, chance: u32, value: i32) -> RawSkill {
    RawSkill {
        id,
        skill_type,
        interval,
        duration,
        max_chance: chance,
        value,
        value_2: 0,
        value_3: 0,
        song_required: None,
    }
}

/// Card with the given skill row resolved through a one-entry catalog
pub fn card_with(id: u32, color: Color, row: RawSkill) -> Card {
    let skill_id = row.id;
    let catalog = SkillCatalog::new().with(row);
    let skill = Skill::resolve(&catalog, skill_id, 0, Some(color));
    Card::new(id, color, Rarity::Ssr, 5000, 5000, 5000, 40).with_skill(skill)
}

pub fn plain_card(id: u32) -> Card {
    Card::new(id, Color::Cute, Rarity::Ssr, 5000, 5000, 5000, 40)
}

pub fn resonance_leader() -> LeaderSkill {
    LeaderSkill::resonance(Color::All, LeaderBonus::default())
}

/// 20% score every 20s for 6s, always activates
pub fn score_card(id: u32) -> Card {
    card_with(id, Color::Cute, raw(100_001, 1, 20, 6.0, 10_000, 120))
}

pub fn wide(cards: Vec<Card>) -> Formation {
    Formation::from_cards(cards.into_iter().map(Some).collect()).unwrap()
}

/// One skill card in slot 1, four plain cards
pub fn single_skill(card: Card) -> Formation {
    let mut cards = vec![card];
    cards.extend((2..=5).map(plain_card));
    wide(cards)
}

/// 200 taps spread over 80s on MASTER
pub fn eighty_second_chart() -> Live {
    Live::evenly_spaced(200, NoteType::Tap, Difficulty::Master, 26, 80.0, Color::All)
}

/// Base score of 25 per note
pub fn flat_config() -> SimulationConfig {
    SimulationConfig {
        level_multiplier_override: Some(1.0),
        ..SimulationConfig::default()
    }
}

/// Taps on every whole second from 1s to 79s of an 80s MASTER chart
///
/// Note `i` sits at `i + 1` seconds, so indices 19 and 25 land exactly on the
/// first 20s..26s window edges.
pub fn whole_second_chart() -> Live {
    let notes = (1..=79).map(|s| Note::new(s as f64, NoteType::Tap, 1)).collect();
    Live::new(notes, Difficulty::Master, 26, 80.0, Color::All)
}

pub fn prepare(formation: Formation, live: Live) -> PreparedSimulation {
    prepare_with(formation, live, flat_config())
}

pub fn prepare_with(formation: Formation, live: Live, config: SimulationConfig) -> PreparedSimulation {
    Simulator::setup(formation, live, config)
        .unwrap()
        .with_appeals(5000.0)
}
