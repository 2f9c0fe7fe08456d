//! Bonus resolution over the active skill set
//!
//! Resolution runs in three ordered phases:
//! 1. boost tables (global max, per sub-unit sum, per magic max)
//! 2. life and support payloads
//! 3. score, great and combo payloads
//!
//! Results are memoized on the active set's content, so the loop simply asks
//! for the bonuses of whatever is active and gets cache reuse for free.

use std::collections::BTreeMap;
use std::rc::Rc;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::bonus::live_skill::{ActiveSkill, BonusKind, BoostAttr, Grouping, LiveSkill, SkillValues};
use crate::core::types::{NoteType, Slot};
use crate::skills::tables::sparkle_bonus;
use crate::skills::SkillFamily;

const LIFE_KINDS: [BonusKind; 3] = [BonusKind::Life, BonusKind::PerfectSupport, BonusKind::ComboSupport];

const SCORE_KINDS: [BonusKind; 6] = [
    BonusKind::Tap,
    BonusKind::Long,
    BonusKind::Flick,
    BonusKind::Slide,
    BonusKind::Great,
    BonusKind::Combo,
];

/// One boosted payload of one copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    /// Activating slot
    pub slot: Slot,
    pub serial: u32,
    /// Card whose effect produced the payload
    pub origin_slot: Slot,
    pub sub_unit: usize,
    pub kind: BonusKind,
    pub value: i32,
    /// Copy values were derived (alternate / mutual / refrain)
    pub derived: bool,
    pub boost_chain: Vec<(Slot, i32)>,
}

/// Aggregated bonuses of one active set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bonuses {
    pub values: SkillValues,
    pub guard: bool,
    pub concentration: bool,
    pub contributions: Vec<Contribution>,
}

impl Bonuses {
    pub fn score(&self, note_type: NoteType) -> i32 {
        self.values.get(BonusKind::score_for(note_type))
    }

    pub fn great(&self) -> i32 {
        self.values.get(BonusKind::Great)
    }

    pub fn combo(&self) -> i32 {
        self.values.get(BonusKind::Combo)
    }

    pub fn life(&self) -> i32 {
        self.values.get(BonusKind::Life)
    }

    pub fn perfect_support(&self) -> i32 {
        self.values.get(BonusKind::PerfectSupport)
    }

    pub fn combo_support(&self) -> i32 {
        self.values.get(BonusKind::ComboSupport)
    }
}

/// A boost magnitude and the activations producing it
#[derive(Debug, Clone, Default, PartialEq)]
struct BoostCell {
    percent: i32,
    sources: Vec<(Slot, i32)>,
}

/// Color x attribute boost table
#[derive(Debug, Clone, Default)]
struct BoostTable {
    cells: [[BoostCell; 4]; 3],
}

impl BoostTable {
    fn offer_max(&mut self, color: usize, attr: BoostAttr, percent: i32, slot: Slot) {
        let cell = &mut self.cells[color][attr.index()];
        if percent > cell.percent {
            *cell = BoostCell {
                percent,
                sources: vec![(slot, percent)],
            };
        }
    }

    fn add(&mut self, color: usize, attr: BoostAttr, percent: i32, slot: Slot) {
        if percent == 0 {
            return;
        }
        let cell = &mut self.cells[color][attr.index()];
        cell.percent += percent;
        cell.sources.push((slot, percent));
    }

    fn cell(&self, color: usize, attr: BoostAttr) -> &BoostCell {
        &self.cells[color][attr.index()]
    }
}

struct BoostTables {
    global: BoostTable,
    resonance: Vec<BoostTable>,
    magic: AHashMap<Slot, BoostTable>,
}

type ResolveKey = (Vec<(Slot, u32)>, Option<i32>);

/// Memoizing bonus resolver for one run
#[derive(Debug, Clone)]
pub struct BonusResolver {
    resonance: Vec<bool>,
    grand: bool,
    memo: AHashMap<ResolveKey, Rc<Bonuses>>,
    hits: u64,
}

impl BonusResolver {
    pub fn new(resonance: Vec<bool>, grand: bool) -> Self {
        Self {
            resonance,
            grand,
            memo: AHashMap::new(),
            hits: 0,
        }
    }

    pub fn reset(&mut self) {
        self.memo.clear();
        self.hits = 0;
    }

    /// Memo hits since the last reset
    pub fn hits(&self) -> u64 {
        self.hits
    }

    fn is_resonant(&self, sub_unit: usize) -> bool {
        self.resonance.get(sub_unit).copied().unwrap_or(false)
    }

    /// Bonuses of the active set at the given life
    pub fn resolve(&mut self, active: &BTreeMap<Slot, ActiveSkill>, life: i32) -> Rc<Bonuses> {
        let sparkle = active.values().any(ActiveSkill::has_sparkle);
        let key: ResolveKey = (
            active.values().map(|a| (a.slot, a.serial)).collect(),
            sparkle.then_some(life.max(0) / 10),
        );
        if let Some(hit) = self.memo.get(&key) {
            self.hits += 1;
            return Rc::clone(hit);
        }
        let bonuses = Rc::new(self.compute(active, life));
        self.memo.insert(key, Rc::clone(&bonuses));
        bonuses
    }

    fn compute(&self, active: &BTreeMap<Slot, ActiveSkill>, life: i32) -> Bonuses {
        let tables = self.boost_phase(active);
        let mut bonuses = Bonuses {
            guard: active.values().any(|a| a.has_family(SkillFamily::is_guard)),
            concentration: active.values().any(|a| a.has_family(SkillFamily::is_concentration)),
            ..Default::default()
        };
        self.payload_phase(active, &tables, life, &LIFE_KINDS, &mut bonuses);
        self.payload_phase(active, &tables, life, &SCORE_KINDS, &mut bonuses);
        bonuses
    }

    fn boost_phase(&self, active: &BTreeMap<Slot, ActiveSkill>) -> BoostTables {
        let sub_units = self.resonance.len().max(1);
        let mut tables = BoostTables {
            global: BoostTable::default(),
            resonance: vec![BoostTable::default(); sub_units],
            magic: AHashMap::new(),
        };
        for skill in active.values() {
            for copy in &skill.copies {
                let Some((colors, effect)) = copy.boost_effect() else {
                    continue;
                };
                for color in colors.iter().filter_map(|c| c.index()) {
                    for attr in BoostAttr::ALL {
                        let percent = attr.of(&effect);
                        tables.global.offer_max(color, attr, percent, skill.slot);
                        if let Some(sum) = tables.resonance.get_mut(skill.sub_unit) {
                            sum.add(color, attr, percent, skill.slot);
                        }
                        if skill.grouping == Grouping::MagicMax {
                            tables
                                .magic
                                .entry(skill.slot)
                                .or_default()
                                .offer_max(color, attr, percent, skill.slot);
                        }
                    }
                }
            }
        }
        tables
    }

    /// Boost cell applying to a copy inside an activation
    fn boost_for<'t>(
        &self,
        tables: &'t BoostTables,
        skill: &ActiveSkill,
        copy: &LiveSkill,
        attr: BoostAttr,
    ) -> Option<&'t BoostCell> {
        let color = copy.color().index()?;
        let mut best = tables.global.cell(color, attr);
        if self.is_resonant(skill.sub_unit) {
            if let Some(sum) = tables.resonance.get(skill.sub_unit) {
                let cell = sum.cell(color, attr);
                if cell.percent > best.percent {
                    best = cell;
                }
            }
        }
        if skill.grouping == Grouping::MagicMax {
            if let Some(magic) = tables.magic.get(&skill.slot) {
                let cell = magic.cell(color, attr);
                if cell.percent > best.percent {
                    best = cell;
                }
            }
        }
        (best.percent != 0).then_some(best)
    }

    fn raw_value(&self, copy: &LiveSkill, kind: BonusKind, life: i32) -> i32 {
        if kind == BonusKind::Combo && copy.skill.family == SkillFamily::Sparkle {
            return sparkle_bonus(life, copy.skill.rarity, self.grand);
        }
        copy.values.get(kind)
    }

    fn payload_phase(
        &self,
        active: &BTreeMap<Slot, ActiveSkill>,
        tables: &BoostTables,
        life: i32,
        kinds: &[BonusKind],
        bonuses: &mut Bonuses,
    ) {
        let sub_units = self.resonance.len().max(1);
        for &kind in kinds {
            let mut per_sub_unit: Vec<Option<i32>> = vec![None; sub_units];

            for skill in active.values() {
                let resonant = self.is_resonant(skill.sub_unit);
                let mut magic_max: Option<i32> = None;

                for copy in &skill.copies {
                    let raw = self.raw_value(copy, kind, life);
                    if raw == 0 {
                        continue;
                    }
                    let (value, chain) = match (copy.derived, self.boost_for(tables, skill, copy, kind.boost_attr())) {
                        (false, Some(cell)) => (kind.boosted(raw, cell.percent), cell.sources.clone()),
                        _ => (raw, Vec::new()),
                    };
                    bonuses.contributions.push(Contribution {
                        slot: skill.slot,
                        serial: skill.serial,
                        origin_slot: copy.origin_slot,
                        sub_unit: skill.sub_unit,
                        kind,
                        value,
                        derived: copy.derived,
                        boost_chain: chain,
                    });

                    if skill.grouping == Grouping::MagicMax {
                        magic_max = Some(magic_max.map_or(value, |m| m.max(value)));
                    } else {
                        fold(&mut per_sub_unit, skill.sub_unit, value, resonant);
                    }
                }
                if let Some(value) = magic_max {
                    fold(&mut per_sub_unit, skill.sub_unit, value, resonant);
                }
            }

            let total = per_sub_unit.into_iter().flatten().max().unwrap_or(0);
            bonuses.values.set(kind, total);
        }
    }
}

/// Sum within a resonant sub-unit, max otherwise
fn fold(per_sub_unit: &mut [Option<i32>], sub_unit: usize, value: i32, resonant: bool) {
    let Some(slot) = per_sub_unit.get_mut(sub_unit) else {
        return;
    };
    *slot = Some(match *slot {
        None => value,
        Some(current) if resonant => current + value,
        Some(current) => current.max(value),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Color, Rarity};
    use crate::skills::{BoostEffect, BoostScope, Skill};

    fn live_skill(slot: Slot, family: SkillFamily, values: [i32; 5], color: Color) -> LiveSkill {
        let mut skill = Skill::none();
        skill.family = family;
        skill.values = values;
        skill.interval = 7.0;
        skill.color = color;
        LiveSkill::new(slot, skill)
    }

    fn active(slot: Slot, sub_unit: usize, copies: Vec<LiveSkill>, grouping: Grouping) -> ActiveSkill {
        ActiveSkill {
            slot,
            serial: 1,
            sub_unit,
            on: 0,
            off: 1_000_000,
            copies,
            grouping,
            encore_target: None,
        }
    }

    fn set(skills: Vec<ActiveSkill>) -> BTreeMap<Slot, ActiveSkill> {
        skills.into_iter().map(|s| (s.slot, s)).collect()
    }

    fn boost(slot: Slot, percent: i32) -> ActiveSkill {
        let effect = BoostEffect { score: percent, combo: percent, life: percent, support: 1 };
        active(
            slot,
            0,
            vec![live_skill(slot, SkillFamily::Boost { scope: BoostScope::All, effect }, [0; 5], Color::Cute)],
            Grouping::Single,
        )
    }

    fn score(slot: Slot, value: i32) -> ActiveSkill {
        active(slot, 0, vec![live_skill(slot, SkillFamily::Score, [value, 0, 0, 0, 0], Color::Cute)], Grouping::Single)
    }

    #[test]
    fn test_max_without_resonance() {
        let mut resolver = BonusResolver::new(vec![false], false);
        let bonuses = resolver.resolve(&set(vec![score(1, 17), score(2, 12)]), 100);
        assert_eq!(bonuses.score(NoteType::Tap), 17);
    }

    #[test]
    fn test_sum_with_resonance() {
        let mut resolver = BonusResolver::new(vec![true], false);
        let bonuses = resolver.resolve(&set(vec![score(1, 17), score(2, 12)]), 100);
        assert_eq!(bonuses.score(NoteType::Tap), 29);
    }

    #[test]
    fn test_boost_ceil_positive_only() {
        let mut resolver = BonusResolver::new(vec![false], false);
        let mut alt_penalty = score(2, 0);
        alt_penalty.copies[0].values.set(BonusKind::Combo, -20);
        let bonuses = resolver.resolve(&set(vec![boost(1, 20), score(3, 17), alt_penalty]), 100);
        // ceil(17 * 1.2) = 21
        assert_eq!(bonuses.score(NoteType::Tap), 21);
        assert_eq!(bonuses.combo(), -20);
        let tap = bonuses
            .contributions
            .iter()
            .find(|c| c.kind == BonusKind::Tap)
            .unwrap();
        assert_eq!(tap.boost_chain, vec![(1, 20)]);
    }

    #[test]
    fn test_magic_copies_collapse_to_max() {
        let mut resolver = BonusResolver::new(vec![true], false);
        let magic = active(
            1,
            0,
            vec![
                live_skill(2, SkillFamily::Score, [17, 0, 0, 0, 0], Color::Cute),
                live_skill(3, SkillFamily::Score, [12, 0, 0, 0, 0], Color::Cute),
            ],
            Grouping::MagicMax,
        );
        let bonuses = resolver.resolve(&set(vec![magic.clone()]), 100);
        assert_eq!(bonuses.score(NoteType::Tap), 17);

        let escaped = ActiveSkill { grouping: Grouping::Escaped, ..magic };
        let mut resolver = BonusResolver::new(vec![true], false);
        assert_eq!(resolver.resolve(&set(vec![escaped]), 100).score(NoteType::Tap), 29);
    }

    #[test]
    fn test_cross_sub_unit_max_even_when_resonant() {
        let mut resolver = BonusResolver::new(vec![true, true, true], true);
        let mut b = score(6, 15);
        b.sub_unit = 1;
        let bonuses = resolver.resolve(&set(vec![score(1, 10), b]), 100);
        assert_eq!(bonuses.score(NoteType::Tap), 15);
    }

    #[test]
    fn test_memo_and_sparkle_life_bucket() {
        let mut resolver = BonusResolver::new(vec![false], false);
        let mut sparkle = live_skill(1, SkillFamily::Sparkle, [0; 5], Color::Cute);
        sparkle.skill.rarity = Rarity::Ssr;
        let skills = set(vec![active(1, 0, vec![sparkle], Grouping::Single)]);
        let high = resolver.resolve(&skills, 300);
        let same = resolver.resolve(&skills, 305);
        assert_eq!(resolver.hits(), 1);
        assert_eq!(high.combo(), same.combo());
        let low = resolver.resolve(&skills, 100);
        assert!(low.combo() < high.combo());
    }

    #[test]
    fn test_empty_set_is_zero() {
        let mut resolver = BonusResolver::new(vec![false], false);
        let bonuses = resolver.resolve(&BTreeMap::new(), 100);
        assert!(bonuses.values.is_empty());
        assert!(!bonuses.guard);
    }
}
