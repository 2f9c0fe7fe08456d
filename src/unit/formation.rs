//! Units and grand units
//!
//! A `Unit` is one sub-unit of 5 cards plus an optional guest. A grand live
//! uses three units whose skills interleave on every third activation slot.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{Attribute, Color, Slot};
use crate::live::Live;
use crate::unit::card::Card;
use crate::unit::leader::{aggregate_bonus, LeaderBonus};

/// Cards whose skills activate in one unit
pub const SKILL_CARDS_PER_UNIT: usize = 5;

/// Appeal multiplier for cards matching the song color
pub const COLOR_MATCH_BONUS: f64 = 1.3;

/// Stage totals consumed by the scoring loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageStats {
    /// Card appeal after color and leader bonuses
    pub appeals: f64,
    pub life: i32,
    /// Back-row support appeal
    pub support: f64,
}

impl StageStats {
    /// Appeal that feeds the per-note base score
    pub fn total_appeal(&self) -> f64 {
        self.appeals + self.support
    }
}

/// One sub-unit: 5 skill cards and an optional guest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    cards: Vec<Card>,
    /// Back-row support appeal added to the stage appeal
    #[serde(default)]
    pub support_appeal: u32,
}

impl Unit {
    pub fn new(cards: Vec<Card>) -> Result<Self> {
        if cards.len() != SKILL_CARDS_PER_UNIT && cards.len() != SKILL_CARDS_PER_UNIT + 1 {
            return Err(SimError::InvalidUnit(cards.len()));
        }
        Ok(Self { cards, support_appeal: 0 })
    }

    pub fn with_support(mut self, support_appeal: u32) -> Self {
        self.support_appeal = support_appeal;
        self
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Cards whose skills can activate (guest excluded)
    pub fn skill_cards(&self) -> &[Card] {
        &self.cards[..SKILL_CARDS_PER_UNIT]
    }

    pub fn center(&self) -> &Card {
        &self.cards[0]
    }

    pub fn guest(&self) -> Option<&Card> {
        self.cards.get(SKILL_CARDS_PER_UNIT)
    }

    /// Card counts per color over every card including the guest
    pub fn color_counts(&self) -> [u8; 3] {
        let mut counts = [0u8; 3];
        for card in &self.cards {
            if let Some(idx) = card.color.index() {
                counts[idx] = counts[idx].saturating_add(1);
            }
        }
        counts
    }

    /// Leader bonuses (center + guest) reaching a card of `color`
    pub fn leader_bonuses(&self, color: Color) -> LeaderBonus {
        let leaders = std::iter::once(&self.center().leader).chain(self.guest().map(|g| &g.leader));
        aggregate_bonus(leaders, color, self.color_counts())
    }

    /// Center declares resonance and the skill cards carry 5 distinct skill types
    pub fn resonance(&self) -> bool {
        if !self.center().leader.resonance {
            return false;
        }
        let distinct: AHashSet<u32> = self.skill_cards().iter().map(|c| c.skill.skill_type).collect();
        distinct.len() >= SKILL_CARDS_PER_UNIT
    }

    /// Summed stat over the skill cards
    pub fn stat_total(&self, attribute: Attribute) -> u32 {
        self.skill_cards().iter().map(|c| c.stat(attribute)).sum()
    }

    fn appeals(&self, song_color: Color) -> f64 {
        let mut total = 0.0;
        for card in &self.cards {
            let bonus = self.leader_bonuses(card.color);
            let color_match = if card.color.matches_song(song_color) { COLOR_MATCH_BONUS } else { 1.0 };
            for attribute in [Attribute::Vocal, Attribute::Dance, Attribute::Visual] {
                let stat = card.stat(attribute) as f64;
                let percent = 1.0 + bonus.appeal(attribute) as f64 / 100.0;
                total += (stat * percent * color_match).ceil();
            }
        }
        total
    }

    fn life(&self) -> i32 {
        self.cards
            .iter()
            .map(|card| {
                let bonus = self.leader_bonuses(card.color);
                (card.total_life() as f64 * (1.0 + bonus.life as f64 / 100.0)).ceil() as i32
            })
            .sum()
    }
}

/// Three sub-units played together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrandUnit {
    units: [Unit; 3],
}

impl GrandUnit {
    pub fn new(units: [Unit; 3]) -> Result<Self> {
        for unit in &units {
            if unit.guest().is_some() {
                return Err(SimError::InvalidUnit(unit.cards().len() * 3));
            }
        }
        Ok(Self { units })
    }

    pub fn units(&self) -> &[Unit; 3] {
        &self.units
    }
}

/// A card with an activation slot
#[derive(Debug, Clone, Copy)]
pub struct SlotCard<'a> {
    pub slot: Slot,
    pub sub_unit: usize,
    pub card: &'a Card,
}

/// The roster taking the stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Formation {
    Wide(Unit),
    Grand(GrandUnit),
}

impl Formation {
    /// Build from a flat card list: 5/6 cards for wide, 15 for grand
    ///
    /// Empty slots fail fast.
    pub fn from_cards(cards: Vec<Option<Card>>) -> Result<Self> {
        let count = cards.len();
        if count != 5 && count != 6 && count != 15 {
            return Err(SimError::InvalidUnit(count));
        }
        let mut resolved = Vec::with_capacity(count);
        for (idx, card) in cards.into_iter().enumerate() {
            resolved.push(card.ok_or(SimError::MissingCard(idx))?);
        }

        if count == 15 {
            let mut chunks = resolved.chunks(SKILL_CARDS_PER_UNIT).map(|c| Unit::new(c.to_vec()));
            let mut next = || chunks.next().unwrap_or(Err(SimError::InvalidUnit(count)));
            let units = [next()?, next()?, next()?];
            Ok(Formation::Grand(GrandUnit::new(units)?.with_offsets()))
        } else {
            Ok(Formation::Wide(Unit::new(resolved)?))
        }
    }

    /// Support appeal; grand formations split it evenly across sub-units
    pub fn with_support(self, support_appeal: u32) -> Self {
        match self {
            Formation::Wide(unit) => Formation::Wide(unit.with_support(support_appeal)),
            Formation::Grand(mut grand) => {
                let share = support_appeal / 3;
                for (idx, unit) in grand.units.iter_mut().enumerate() {
                    let extra = if idx == 0 { support_appeal % 3 } else { 0 };
                    unit.support_appeal = share + extra;
                }
                Formation::Grand(grand)
            }
        }
    }

    pub fn is_grand(&self) -> bool {
        matches!(self, Formation::Grand(_))
    }

    pub fn sub_units(&self) -> Vec<&Unit> {
        match self {
            Formation::Wide(unit) => vec![unit],
            Formation::Grand(grand) => grand.units.iter().collect(),
        }
    }

    pub fn sub_unit_count(&self) -> usize {
        match self {
            Formation::Wide(_) => 1,
            Formation::Grand(_) => 3,
        }
    }

    pub fn all_cards(&self) -> Vec<&Card> {
        self.sub_units().into_iter().flat_map(|u| u.cards().iter()).collect()
    }

    /// Skill-bearing cards with their slots, in formation order
    pub fn slot_cards(&self) -> Vec<SlotCard<'_>> {
        self.sub_units()
            .into_iter()
            .enumerate()
            .flat_map(|(sub_unit, unit)| {
                unit.skill_cards().iter().enumerate().map(move |(idx, card)| SlotCard {
                    slot: sub_unit * SKILL_CARDS_PER_UNIT + idx + 1,
                    sub_unit,
                    card,
                })
            })
            .collect()
    }

    /// Card in a slot (1-based)
    pub fn get_card(&self, slot: Slot) -> Option<&Card> {
        let idx = slot.checked_sub(1)?;
        let unit = self.sub_units().into_iter().nth(idx / SKILL_CARDS_PER_UNIT)?;
        unit.skill_cards().get(idx % SKILL_CARDS_PER_UNIT)
    }

    pub fn sub_unit_of(slot: Slot) -> usize {
        slot.saturating_sub(1) / SKILL_CARDS_PER_UNIT
    }

    pub fn resonance(&self, sub_unit: usize) -> bool {
        self.sub_units().get(sub_unit).map_or(false, |u| u.resonance())
    }

    /// Effective activation probability of the card in `slot`
    pub fn skill_probability(&self, slot: Slot) -> f64 {
        let Some(card) = self.get_card(slot) else {
            return 0.0;
        };
        let unit = self.sub_units()[Self::sub_unit_of(slot)];
        let bonus = unit.leader_bonuses(card.color).skill_probability;
        (card.skill.probability * (1.0 + bonus as f64 / 100.0)).clamp(0.0, 1.0)
    }

    /// Appeal, life and support for a live
    pub fn stage_stats(&self, live: &Live) -> StageStats {
        let units = self.sub_units();
        StageStats {
            appeals: units.iter().map(|u| u.appeals(live.color)).sum(),
            life: units.iter().map(|u| u.life()).sum(),
            support: units.iter().map(|u| u.support_appeal as f64).sum(),
        }
    }
}

impl GrandUnit {
    /// Stamp the grand stagger offset on each sub-unit's skills
    fn with_offsets(mut self) -> Self {
        for (offset, unit) in self.units.iter_mut().enumerate() {
            for card in unit.cards.iter_mut() {
                card.skill.offset = offset;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Rarity;
    use crate::unit::leader::LeaderSkill;

    fn card(color: Color, skill_type: u32) -> Card {
        let mut card = Card::new(1, color, Rarity::Ssr, 5000, 5000, 5000, 40);
        card.skill.skill_type = skill_type;
        card
    }

    #[test]
    fn test_invalid_card_counts() {
        let cards: Vec<Option<Card>> = (0..4).map(|_| Some(card(Color::Cute, 1))).collect();
        assert!(matches!(Formation::from_cards(cards), Err(SimError::InvalidUnit(4))));
    }

    #[test]
    fn test_missing_card_fails_fast() {
        let mut cards: Vec<Option<Card>> = (0..5).map(|_| Some(card(Color::Cute, 1))).collect();
        cards[2] = None;
        assert!(matches!(Formation::from_cards(cards), Err(SimError::MissingCard(2))));
    }

    #[test]
    fn test_grand_slots_and_offsets() {
        let cards: Vec<Option<Card>> = (0..15).map(|_| Some(card(Color::Cool, 1))).collect();
        let formation = Formation::from_cards(cards).unwrap();
        assert!(formation.is_grand());
        let slots = formation.slot_cards();
        assert_eq!(slots.len(), 15);
        assert_eq!(slots[14].slot, 15);
        assert_eq!(slots[14].sub_unit, 2);
        assert_eq!(slots[14].card.skill.offset, 2);
        assert_eq!(Formation::sub_unit_of(6), 1);
    }

    #[test]
    fn test_guest_has_no_slot() {
        let cards: Vec<Option<Card>> = (0..6).map(|_| Some(card(Color::Cute, 1))).collect();
        let formation = Formation::from_cards(cards).unwrap();
        assert_eq!(formation.slot_cards().len(), 5);
        assert!(formation.get_card(6).is_none());
    }

    #[test]
    fn test_resonance_needs_five_distinct_types() {
        let mut cards: Vec<Card> = (1..=5).map(|t| card(Color::Cute, t)).collect();
        cards[0].leader = LeaderSkill::resonance(Color::All, Default::default());
        let unit = Unit::new(cards.clone()).unwrap();
        assert!(unit.resonance());

        cards[4].skill.skill_type = 1;
        let unit = Unit::new(cards).unwrap();
        assert!(!unit.resonance());
    }

    #[test]
    fn test_color_match_appeal() {
        let cards: Vec<Option<Card>> = (0..5).map(|_| Some(card(Color::Cute, 1))).collect();
        let formation = Formation::from_cards(cards).unwrap();
        let matched = Live::evenly_spaced(10, crate::core::types::NoteType::Tap, crate::core::types::Difficulty::Master, 26, 60.0, Color::Cute);
        let unmatched = Live { color: Color::Cool, ..matched.clone() };
        let a = formation.stage_stats(&matched);
        let b = formation.stage_stats(&unmatched);
        assert!((a.appeals - b.appeals * COLOR_MATCH_BONUS).abs() < 1.0);
        assert_eq!(a.life, 200);
    }

    #[test]
    fn test_support_split_adds_to_total_appeal() {
        let cards: Vec<Option<Card>> = (0..15).map(|_| Some(card(Color::Cute, 1))).collect();
        let formation = Formation::from_cards(cards).unwrap().with_support(10_001);
        let shares: Vec<u32> = formation.sub_units().iter().map(|u| u.support_appeal).collect();
        assert_eq!(shares, vec![3_335, 3_333, 3_333]);

        let live = Live::evenly_spaced(10, crate::core::types::NoteType::Tap, crate::core::types::Difficulty::Master, 26, 60.0, Color::Cute);
        let stats = formation.stage_stats(&live);
        assert_eq!(stats.support, 10_001.0);
        assert_eq!(stats.total_appeal(), stats.appeals + 10_001.0);
    }
}
