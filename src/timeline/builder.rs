//! Activation timeline: every possible skill window of a live
//!
//! Building the activation list is deterministic and done once per prepared
//! simulation. Each trial then rolls the activations it keeps and turns them
//! into an ordered event queue.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::{to_micros, Micros, Slot};
use crate::live::constants::ACTIVATION_TAIL_SECONDS;
use crate::live::Live;
use crate::skills::SkillPriority;
use crate::unit::Formation;

/// One potential activation window of one card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activation {
    pub slot: Slot,
    pub sub_unit: usize,
    /// Activation index on the card's interval grid (1-based)
    pub serial: u32,
    pub on: Micros,
    pub off: Micros,
    pub probability: f64,
    #[serde(skip, default = "default_priority")]
    pub priority: SkillPriority,
}

fn default_priority() -> SkillPriority {
    SkillPriority::Normal
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Activate,
    Deactivate,
}

/// A timeline entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillEvent {
    pub time: Micros,
    pub slot: Slot,
    pub serial: u32,
    pub kind: EventKind,
    /// Index into `ActivationTimeline::activations`
    pub activation: usize,
    /// Processed before a note at the same instant
    pub before_notes: bool,
    pub priority: SkillPriority,
}

impl SkillEvent {
    fn sort_key(&self) -> (Micros, bool, SkillPriority, Slot) {
        (self.time, !self.before_notes, self.priority, self.slot)
    }
}

/// Which activations a trial keeps, and the odds of that outcome
#[derive(Debug, Clone, PartialEq)]
pub struct RollOutcome {
    pub activated: Vec<bool>,
    /// Probability of every skill rolling exactly like this
    pub chance: f64,
}

/// All activation windows of a formation on a live
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivationTimeline {
    activations: Vec<Activation>,
}

impl ActivationTimeline {
    pub fn build(formation: &Formation, live: &Live) -> Self {
        let sub_unit_count = formation.sub_unit_count();
        let mut activations = Vec::new();

        for entry in formation.slot_cards() {
            let skill = &entry.card.skill;
            if skill.is_none() {
                continue;
            }
            let probability = formation.skill_probability(entry.slot);
            if probability <= 0.0 {
                tracing::debug!("Slot {} has zero probability, skipping", entry.slot);
                continue;
            }

            let total = ((live.duration - ACTIVATION_TAIL_SECONDS) / skill.interval).floor();
            if total < 1.0 {
                continue;
            }
            let active = skill.active_seconds();
            let priority = skill.family.priority();

            for index in (skill.offset + 1..=total as usize).step_by(sub_unit_count) {
                let on_seconds = index as f64 * skill.interval;
                activations.push(Activation {
                    slot: entry.slot,
                    sub_unit: entry.sub_unit,
                    serial: index as u32,
                    on: to_micros(on_seconds),
                    off: to_micros(on_seconds + active),
                    probability,
                    priority,
                });
            }
        }

        activations.sort_by_key(|a| a.on);
        tracing::debug!("Timeline built with {} activations", activations.len());
        Self { activations }
    }

    pub fn activations(&self) -> &[Activation] {
        &self.activations
    }

    pub fn len(&self) -> usize {
        self.activations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activations.is_empty()
    }

    /// Keep every activation
    pub fn all_activate(&self) -> RollOutcome {
        let chance = self.activations.iter().map(|a| a.probability).product();
        RollOutcome {
            activated: vec![true; self.activations.len()],
            chance,
        }
    }

    /// Bernoulli trial per activation against its probability
    pub fn roll<R: Rng>(&self, rng: &mut R) -> RollOutcome {
        let mut chance = 1.0;
        let activated = self
            .activations
            .iter()
            .map(|a| {
                let hit = rng.gen::<f64>() < a.probability;
                chance *= if hit { a.probability } else { 1.0 - a.probability };
                hit
            })
            .collect();
        RollOutcome { activated, chance }
    }

    /// Ordered event queue for the kept activations
    pub fn events(&self, activated: &[bool], config: &SimulationConfig) -> Vec<SkillEvent> {
        let mut events = Vec::with_capacity(self.activations.len() * 2);
        for (idx, activation) in self.activations.iter().enumerate() {
            if !activated.get(idx).copied().unwrap_or(false) {
                continue;
            }
            events.push(SkillEvent {
                time: activation.on,
                slot: activation.slot,
                serial: activation.serial,
                kind: EventKind::Activate,
                activation: idx,
                before_notes: config.left_inclusive,
                priority: activation.priority,
            });
            events.push(SkillEvent {
                time: activation.off,
                slot: activation.slot,
                serial: activation.serial,
                kind: EventKind::Deactivate,
                activation: idx,
                before_notes: !config.right_inclusive,
                priority: activation.priority,
            });
        }
        events.sort_by_key(SkillEvent::sort_key);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Color, Difficulty, NoteType, Rarity};
    use crate::skills::{Skill, SkillFamily};
    use crate::unit::Card;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn score_card(interval: f64, duration: f64, probability: f64) -> Card {
        let mut skill = Skill::none();
        skill.skill_type = 1;
        skill.family = SkillFamily::Score;
        skill.interval = interval;
        skill.duration = duration;
        skill.probability = probability;
        skill.values[0] = 20;
        Card::new(1, Color::Cute, Rarity::Ssr, 5000, 5000, 5000, 40).with_skill(skill)
    }

    fn wide(cards: Vec<Card>) -> Formation {
        let mut all: Vec<Option<Card>> = cards.into_iter().map(Some).collect();
        while all.len() < 5 {
            all.push(Some(Card::new(2, Color::Cute, Rarity::Ssr, 1, 1, 1, 1)));
        }
        Formation::from_cards(all).unwrap()
    }

    fn live(duration: f64) -> Live {
        Live::evenly_spaced(10, NoteType::Tap, Difficulty::Master, 26, duration, Color::All)
    }

    #[test]
    fn test_activation_grid() {
        let timeline = ActivationTimeline::build(&wide(vec![score_card(20.0, 6.0, 1.0)]), &live(80.0));
        // floor((80 - 3) / 20) = 3
        assert_eq!(timeline.len(), 3);
        let first = &timeline.activations()[0];
        assert_eq!(first.on, 20_000_000);
        assert_eq!(first.off, 26_000_000);
        assert_eq!(timeline.activations()[2].serial, 3);
    }

    #[test]
    fn test_grand_stride() {
        let cards: Vec<Option<Card>> = (0..15).map(|_| Some(score_card(10.0, 5.0, 1.0))).collect();
        let formation = Formation::from_cards(cards).unwrap();
        let timeline = ActivationTimeline::build(&formation, &live(100.0));
        let serials: Vec<u32> = timeline
            .activations()
            .iter()
            .filter(|a| a.slot == 6)
            .map(|a| a.serial)
            .collect();
        // offset 1, total 9, stride 3
        assert_eq!(serials, vec![2, 5, 8]);
    }

    #[test]
    fn test_full_roll_chance_all_certain() {
        let timeline = ActivationTimeline::build(&wide(vec![score_card(9.0, 6.0, 1.0)]), &live(80.0));
        assert_eq!(timeline.all_activate().chance, 1.0);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let outcome = timeline.roll(&mut rng);
        assert_eq!(outcome.chance, 1.0);
        assert!(outcome.activated.iter().all(|&a| a));
    }

    #[test]
    fn test_roll_chance_bounded() {
        let timeline = ActivationTimeline::build(&wide(vec![score_card(9.0, 6.0, 0.4)]), &live(80.0));
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let outcome = timeline.roll(&mut rng);
        assert!(outcome.chance > 0.0 && outcome.chance <= 1.0);
    }

    #[test]
    fn test_events_ordered_with_closed_window() {
        // interval == duration: off of k coincides with on of k + 1
        let timeline = ActivationTimeline::build(&wide(vec![score_card(10.0, 10.0, 1.0)]), &live(40.0));
        let events = timeline.events(&timeline.all_activate().activated, &SimulationConfig::default());
        let at_20: Vec<EventKind> = events.iter().filter(|e| e.time == 20_000_000).map(|e| e.kind).collect();
        assert_eq!(at_20, vec![EventKind::Activate, EventKind::Deactivate]);
        assert_eq!(events[0].kind, EventKind::Activate);
    }
}
