//! Activation-time expansion: gating, magic copies, encore copies

use crate::bonus::amr;
use crate::bonus::cache::UnitCache;
use crate::bonus::live_skill::{ActiveSkill, Grouping, LiveSkill, SkillValues};
use crate::core::config::SimulationConfig;
use crate::core::types::{Color, Micros, Slot};
use crate::live::Live;
use crate::results::{AmrBonus, MagicBonus, SkillInact};
use crate::skills::tables::motif_bonus;
use crate::skills::{Skill, SkillFamily, SkillPriority};
use crate::timeline::Activation;
use crate::unit::Formation;

/// Read-only state an activation is expanded against
pub struct ExpansionContext<'a> {
    pub formation: &'a Formation,
    pub live: &'a Live,
    pub config: &'a SimulationConfig,
    pub life: i32,
    pub cache: &'a UnitCache,
    /// Successful activations in processing order
    pub history: &'a [ActiveSkill],
}

/// A successful expansion plus its diagnostics
#[derive(Debug, Clone)]
pub struct Expanded {
    pub active: ActiveSkill,
    pub amr_bonus: Option<AmrBonus>,
    pub magic_bonus: Option<MagicBonus>,
}

impl<'a> ExpansionContext<'a> {
    /// Static gates of a skill in a sub-unit
    pub fn can_activate(&self, skill: &Skill, sub_unit: usize) -> Result<(), SkillInact> {
        if let Some(requirements) = skill.requirements {
            let counts = self.formation.sub_units()[sub_unit].color_counts();
            if !requirements.satisfied_by(counts) {
                return Err(match skill.family {
                    SkillFamily::Focus { .. } => SkillInact::FocusColor,
                    _ => SkillInact::ColorRequirement,
                });
            }
        }
        if let Some(color) = skill.song_required {
            if self.live.color != color && self.live.color != Color::All {
                return Err(SkillInact::SongColor);
            }
        }
        if skill.life_requirement > 0 && self.life <= skill.life_requirement {
            return Err(SkillInact::LifeTooLow);
        }
        Ok(())
    }

    /// Gate a skill and build its working copy
    fn instantiate(
        &self,
        skill: &Skill,
        origin_slot: Slot,
        sub_unit: usize,
    ) -> Result<(LiveSkill, Option<AmrBonus>), SkillInact> {
        self.can_activate(skill, sub_unit)?;
        let mut copy = LiveSkill::new(origin_slot, skill.clone());
        if let SkillFamily::Motif { axis } = skill.family {
            let total = self.formation.sub_units()[sub_unit].stat_total(axis);
            copy.values.set_score(motif_bonus(total));
        }
        let amr_bonus = if skill.family.is_amr() {
            Some(amr::derive(&mut copy, self.cache.sub_unit(sub_unit))?)
        } else {
            None
        };
        Ok((copy, amr_bonus))
    }

    /// Expand one timeline activation into an active skill
    pub fn expand(&self, activation: &Activation) -> Result<Expanded, SkillInact> {
        let card = self
            .formation
            .get_card(activation.slot)
            .ok_or(SkillInact::NotRolled)?;
        let skill = &card.skill;

        match skill.family {
            SkillFamily::Magic => self.expand_magic(activation),
            SkillFamily::Encore => self.expand_encore(activation),
            _ => {
                let (copy, amr_bonus) = self.instantiate(skill, activation.slot, activation.sub_unit)?;
                Ok(Expanded {
                    active: self.active(activation, vec![copy], Grouping::Single, activation.sub_unit, None),
                    amr_bonus,
                    magic_bonus: None,
                })
            }
        }
    }

    fn active(
        &self,
        activation: &Activation,
        copies: Vec<LiveSkill>,
        grouping: Grouping,
        sub_unit: usize,
        encore_target: Option<Slot>,
    ) -> ActiveSkill {
        ActiveSkill {
            slot: activation.slot,
            serial: activation.serial,
            sub_unit,
            on: activation.on,
            off: activation.off,
            copies,
            grouping,
            encore_target,
        }
    }

    /// Copies of every eligible sibling, guard first and refrain last
    fn expand_magic(&self, activation: &Activation) -> Result<Expanded, SkillInact> {
        let mut siblings: Vec<(SkillPriority, Slot, &Skill)> = self
            .formation
            .slot_cards()
            .into_iter()
            .filter(|entry| entry.sub_unit == activation.sub_unit && entry.slot != activation.slot)
            .filter(|entry| {
                let family = entry.card.skill.family;
                !entry.card.skill.is_none() && !family.is_magic() && !family.is_encore()
            })
            .filter(|entry| self.formation.skill_probability(entry.slot) > 0.0)
            .map(|entry| (entry.card.skill.family.priority(), entry.slot, &entry.card.skill))
            .collect();
        siblings.sort_by_key(|(priority, slot, _)| (*priority, *slot));

        let mut copies = Vec::with_capacity(siblings.len());
        let mut amr_bonus = AmrBonus::default();
        for (_, slot, skill) in siblings {
            match self.instantiate(skill, slot, activation.sub_unit) {
                Ok((copy, amr)) => {
                    if let Some(amr) = amr {
                        amr_bonus.entries.extend(amr.entries);
                    }
                    copies.push(copy);
                }
                Err(reason) => {
                    tracing::debug!("Magic slot {} skips copy of slot {}: {:?}", activation.slot, slot, reason);
                }
            }
        }
        if copies.is_empty() {
            return Err(SkillInact::MagicNoTarget);
        }

        let magic_bonus = magic_bonus(&copies);
        Ok(Expanded {
            active: self.active(activation, copies, Grouping::MagicMax, activation.sub_unit, None),
            amr_bonus: (!amr_bonus.entries.is_empty()).then_some(amr_bonus),
            magic_bonus: Some(magic_bonus),
        })
    }

    /// Most recent activation, or the one before it when the most recent
    /// started at the encore's own instant
    fn encore_target(&self, now: Micros) -> Option<&'a ActiveSkill> {
        let mut recent = self.history.iter().rev();
        match recent.next() {
            Some(latest) if latest.on == now => recent.next(),
            latest => latest,
        }
    }

    fn expand_encore(&self, activation: &Activation) -> Result<Expanded, SkillInact> {
        let target = self.encore_target(activation.on).ok_or(SkillInact::NoEncoreable)?;
        let amr_sub_unit = if self.config.encore_amr_cache_to_encore_unit {
            activation.sub_unit
        } else {
            target.sub_unit
        };

        let mut copies = Vec::with_capacity(target.copies.len());
        let mut amr_bonus = AmrBonus::default();
        let mut last_reason = SkillInact::NoEncoreable;
        for source in &target.copies {
            let mut copy = source.clone();
            if copy.skill.life_requirement > 0 && self.life <= copy.skill.life_requirement {
                last_reason = SkillInact::LifeTooLow;
                continue;
            }
            if copy.skill.family.is_amr() {
                copy.values = SkillValues::from_skill(&copy.skill);
                match amr::derive(&mut copy, self.cache.sub_unit(amr_sub_unit)) {
                    Ok(bonus) => amr_bonus.entries.extend(bonus.entries),
                    Err(reason) => {
                        last_reason = reason;
                        continue;
                    }
                }
            }
            copies.push(copy);
        }
        if copies.is_empty() {
            return Err(last_reason);
        }

        let (grouping, sub_unit) = if target.is_magic() {
            let grouping = if self.config.allow_encore_magic_to_escape_max_aggregation {
                Grouping::Escaped
            } else {
                Grouping::MagicMax
            };
            let sub_unit = if self.config.encore_magic_to_encore_unit {
                activation.sub_unit
            } else {
                target.sub_unit
            };
            (grouping, sub_unit)
        } else {
            (Grouping::Single, activation.sub_unit)
        };

        let magic_bonus = target.is_magic().then(|| magic_bonus(&copies));
        Ok(Expanded {
            active: self.active(activation, copies, grouping, sub_unit, Some(target.slot)),
            amr_bonus: (!amr_bonus.entries.is_empty()).then_some(amr_bonus),
            magic_bonus,
        })
    }
}

fn magic_bonus(copies: &[LiveSkill]) -> MagicBonus {
    MagicBonus {
        guard: copies.iter().any(|c| c.skill.family.is_guard()),
        concentration: copies.iter().any(|c| c.skill.family.is_concentration()),
        copies: copies
            .iter()
            .map(|c| (c.origin_slot, c.skill.family.name().to_string()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bonus::BonusKind;
    use crate::core::types::{Difficulty, NoteType, Rarity};
    use crate::skills::ColorRequirements;
    use crate::unit::Card;

    fn skill(skill_type: u32, family: SkillFamily, values: [i32; 5]) -> Skill {
        let mut skill = Skill::none();
        skill.skill_type = skill_type;
        skill.family = family;
        skill.values = values;
        skill.interval = 7.0;
        skill.duration = 4.0;
        skill.probability = 1.0;
        skill
    }

    fn formation(skills: Vec<Skill>, color: Color) -> Formation {
        let cards = skills
            .into_iter()
            .enumerate()
            .map(|(i, s)| Some(Card::new(i as u32 + 1, color, Rarity::Ssr, 6000, 6000, 6000, 40).with_skill(s)))
            .collect();
        Formation::from_cards(cards).unwrap()
    }

    fn activation(slot: Slot, on: Micros) -> Activation {
        Activation {
            slot,
            sub_unit: 0,
            serial: 1,
            on,
            off: on + 4_000_000,
            probability: 1.0,
            priority: SkillPriority::Normal,
        }
    }

    fn live(color: Color) -> Live {
        Live::evenly_spaced(10, NoteType::Tap, Difficulty::Master, 26, 60.0, color)
    }

    #[test]
    fn test_magic_order_and_guard_flag() {
        let formation = formation(
            vec![
                skill(41, SkillFamily::Magic, [0; 5]),
                skill(12, SkillFamily::Guard, [0; 5]),
                skill(39, SkillFamily::Alternate { multiplier: 120 }, [0, 0, -20, 0, 0]),
                skill(42, SkillFamily::Mutual { multiplier: 110 }, [-10, 0, 0, 0, 0]),
                skill(1, SkillFamily::Score, [20, 0, 0, 0, 0]),
            ],
            Color::Cute,
        );
        let live = live(Color::All);
        let config = SimulationConfig::default();
        let mut cache = UnitCache::new(1);
        cache.record(0, BonusKind::Tap, 20, (5, 1));
        cache.record(0, BonusKind::Combo, 15, (5, 1));
        let ctx = ExpansionContext { formation: &formation, live: &live, config: &config, life: 200, cache: &cache, history: &[] };

        let expanded = ctx.expand(&activation(1, 7_000_000)).unwrap();
        let order: Vec<Slot> = expanded.active.copies.iter().map(|c| c.origin_slot).collect();
        assert_eq!(order, vec![2, 5, 3, 4]);
        assert!(expanded.magic_bonus.unwrap().guard);
        assert_eq!(expanded.active.grouping, Grouping::MagicMax);
    }

    #[test]
    fn test_encore_without_history() {
        let formation = formation(vec![skill(16, SkillFamily::Encore, [0; 5]); 5], Color::Cute);
        let live = live(Color::All);
        let config = SimulationConfig::default();
        let cache = UnitCache::new(1);
        let ctx = ExpansionContext { formation: &formation, live: &live, config: &config, life: 200, cache: &cache, history: &[] };
        assert_eq!(ctx.expand(&activation(1, 7_000_000)).unwrap_err(), SkillInact::NoEncoreable);
    }

    #[test]
    fn test_encore_skips_simultaneous() {
        let formation = formation(
            vec![
                skill(16, SkillFamily::Encore, [0; 5]),
                skill(1, SkillFamily::Score, [20, 0, 0, 0, 0]),
                skill(4, SkillFamily::Combo, [0, 0, 15, 0, 0]),
                Skill::none(),
                Skill::none(),
            ],
            Color::Cute,
        );
        let live = live(Color::All);
        let config = SimulationConfig::default();
        let cache = UnitCache::new(1);
        let earlier = ActiveSkill {
            slot: 2,
            serial: 1,
            sub_unit: 0,
            on: 5_000_000,
            off: 9_000_000,
            copies: vec![LiveSkill::new(2, formation.get_card(2).unwrap().skill.clone())],
            grouping: Grouping::Single,
            encore_target: None,
        };
        let same_time = ActiveSkill { slot: 3, on: 7_000_000, copies: vec![LiveSkill::new(3, formation.get_card(3).unwrap().skill.clone())], ..earlier.clone() };
        let history = vec![earlier, same_time];
        let ctx = ExpansionContext { formation: &formation, live: &live, config: &config, life: 200, cache: &cache, history: &history };

        let expanded = ctx.expand(&activation(1, 7_000_000)).unwrap();
        assert_eq!(expanded.active.encore_target, Some(2));
        assert_eq!(expanded.active.copies[0].values.get(BonusKind::Tap), 20);
    }

    #[test]
    fn test_encore_falls_back_only_one_step() {
        let formation = formation(
            vec![
                skill(16, SkillFamily::Encore, [0; 5]),
                skill(1, SkillFamily::Score, [20, 0, 0, 0, 0]),
                skill(4, SkillFamily::Combo, [0, 0, 15, 0, 0]),
                Skill::none(),
                Skill::none(),
            ],
            Color::Cute,
        );
        let live = live(Color::All);
        let config = SimulationConfig::default();
        let cache = UnitCache::new(1);
        let score = ActiveSkill {
            slot: 2,
            serial: 1,
            sub_unit: 0,
            on: 7_000_000,
            off: 11_000_000,
            copies: vec![LiveSkill::new(2, formation.get_card(2).unwrap().skill.clone())],
            grouping: Grouping::Single,
            encore_target: None,
        };
        let combo = ActiveSkill { slot: 3, copies: vec![LiveSkill::new(3, formation.get_card(3).unwrap().skill.clone())], ..score.clone() };
        // both simultaneous with the encore: the second most recent is taken as is
        let history = vec![score, combo];
        let ctx = ExpansionContext { formation: &formation, live: &live, config: &config, life: 200, cache: &cache, history: &history };

        let expanded = ctx.expand(&activation(1, 7_000_000)).unwrap();
        assert_eq!(expanded.active.encore_target, Some(2));
    }

    #[test]
    fn test_encore_amr_cache_choice() {
        let alternate = skill(39, SkillFamily::Alternate { multiplier: 150 }, [0, 0, -20, 0, 0]);
        let formation = formation(
            vec![
                skill(16, SkillFamily::Encore, [0; 5]),
                alternate.clone(),
                Skill::none(),
                Skill::none(),
                Skill::none(),
            ],
            Color::Cute,
        );
        let live = live(Color::All);
        // only the alternate's sub-unit has seen a score bonus
        let mut cache = UnitCache::new(2);
        for kind in BonusKind::SCORE {
            cache.record(1, kind, 20, (7, 1));
        }
        let history = vec![ActiveSkill {
            slot: 2,
            serial: 1,
            sub_unit: 1,
            on: 5_000_000,
            off: 9_000_000,
            copies: vec![LiveSkill::new(2, alternate)],
            grouping: Grouping::Single,
            encore_target: None,
        }];

        let config = SimulationConfig::default();
        let ctx = ExpansionContext { formation: &formation, live: &live, config: &config, life: 200, cache: &cache, history: &history };
        let expanded = ctx.expand(&activation(1, 7_000_000)).unwrap();
        assert_eq!(expanded.active.copies[0].values.get(BonusKind::Tap), 30);
        assert_eq!(expanded.active.copies[0].values.get(BonusKind::Combo), -20);
        assert!(expanded.amr_bonus.is_some());

        let config = SimulationConfig { encore_amr_cache_to_encore_unit: true, ..SimulationConfig::default() };
        let ctx = ExpansionContext { formation: &formation, live: &live, config: &config, life: 200, cache: &cache, history: &history };
        assert_eq!(ctx.expand(&activation(1, 7_000_000)).unwrap_err(), SkillInact::AltNoScore);
    }

    #[test]
    fn test_encored_magic_attribution() {
        let score = skill(1, SkillFamily::Score, [20, 0, 0, 0, 0]);
        let formation = formation(
            vec![skill(16, SkillFamily::Encore, [0; 5]), score.clone(), Skill::none(), Skill::none(), Skill::none()],
            Color::Cute,
        );
        let live = live(Color::All);
        let cache = UnitCache::new(2);
        let history = vec![ActiveSkill {
            slot: 6,
            serial: 1,
            sub_unit: 1,
            on: 5_000_000,
            off: 9_000_000,
            copies: vec![LiveSkill::new(2, score)],
            grouping: Grouping::MagicMax,
            encore_target: None,
        }];
        let expand_with = |config: SimulationConfig| {
            let ctx = ExpansionContext { formation: &formation, live: &live, config: &config, life: 200, cache: &cache, history: &history };
            ctx.expand(&activation(1, 7_000_000)).unwrap()
        };

        let default = expand_with(SimulationConfig::default());
        assert_eq!(default.active.sub_unit, 1);
        assert_eq!(default.active.grouping, Grouping::MagicMax);
        assert_eq!(default.active.encore_target, Some(6));
        assert!(default.magic_bonus.is_some());

        let own_unit = expand_with(SimulationConfig { encore_magic_to_encore_unit: true, ..SimulationConfig::default() });
        assert_eq!(own_unit.active.sub_unit, 0);
        assert_eq!(own_unit.active.grouping, Grouping::MagicMax);

        let escaped = expand_with(SimulationConfig {
            allow_encore_magic_to_escape_max_aggregation: true,
            ..SimulationConfig::default()
        });
        assert_eq!(escaped.active.grouping, Grouping::Escaped);
        assert_eq!(escaped.active.sub_unit, 1);
    }

    #[test]
    fn test_focus_gate() {
        let mut focus = skill(21, SkillFamily::Focus { color: Color::Cute }, [16, 0, 14, 0, 0]);
        focus.requirements = ColorRequirements::monochrome(Color::Cute);
        let formation = formation(vec![focus; 5], Color::Cool);
        let live = live(Color::All);
        let config = SimulationConfig::default();
        let cache = UnitCache::new(1);
        let ctx = ExpansionContext { formation: &formation, live: &live, config: &config, life: 200, cache: &cache, history: &[] };
        assert_eq!(ctx.expand(&activation(1, 7_000_000)).unwrap_err(), SkillInact::FocusColor);
    }

    #[test]
    fn test_overload_life_gate() {
        let mut overload = skill(14, SkillFamily::Overload, [16, 0, 0, 0, 0]);
        overload.life_requirement = 9;
        let formation = formation(vec![overload; 5], Color::Cute);
        let live = live(Color::All);
        let config = SimulationConfig::default();
        let cache = UnitCache::new(1);
        let ctx = ExpansionContext { formation: &formation, live: &live, config: &config, life: 9, cache: &cache, history: &[] };
        assert_eq!(ctx.expand(&activation(1, 7_000_000)).unwrap_err(), SkillInact::LifeTooLow);
    }
}
