//! Unit cache: best bonuses seen so far, per sub-unit
//!
//! Alternate, mutual and refrain skills read these running maxima at the
//! moment they activate.

use ahash::AHashMap;

use crate::bonus::live_skill::BonusKind;
use crate::core::types::Slot;

/// True when no value is nonzero (including the empty case)
pub fn is_all_zero<'a>(values: impl IntoIterator<Item = &'a i32>) -> bool {
    values.into_iter().all(|&v| v == 0)
}

/// A running maximum and the activation that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedBest {
    pub value: i32,
    pub source: (Slot, u32),
}

#[derive(Debug, Clone, Default)]
pub struct SubUnitCache {
    best: AHashMap<BonusKind, CachedBest>,
}

impl SubUnitCache {
    pub fn get(&self, kind: BonusKind) -> Option<CachedBest> {
        self.best.get(&kind).copied()
    }

    pub fn value(&self, kind: BonusKind) -> i32 {
        self.best.get(&kind).map_or(0, |b| b.value)
    }

    fn offer(&mut self, kind: BonusKind, value: i32, source: (Slot, u32)) {
        if value <= 0 {
            return;
        }
        let entry = self.best.entry(kind).or_insert(CachedBest { value, source });
        if value > entry.value {
            *entry = CachedBest { value, source };
        }
    }

    fn values_of(&self, kinds: &[BonusKind]) -> Vec<i32> {
        kinds.iter().map(|k| self.value(*k)).collect()
    }

    /// No score (or great) bonus seen yet
    pub fn no_score(&self) -> bool {
        let mut kinds = BonusKind::SCORE.to_vec();
        kinds.push(BonusKind::Great);
        is_all_zero(&self.values_of(&kinds))
    }

    pub fn no_combo(&self) -> bool {
        is_all_zero(&self.values_of(&[BonusKind::Combo]))
    }
}

/// Per sub-unit caches for one run
#[derive(Debug, Clone)]
pub struct UnitCache {
    sub_units: Vec<SubUnitCache>,
}

impl UnitCache {
    pub fn new(sub_unit_count: usize) -> Self {
        Self {
            sub_units: vec![SubUnitCache::default(); sub_unit_count.max(1)],
        }
    }

    pub fn reset(&mut self) {
        for cache in &mut self.sub_units {
            cache.best.clear();
        }
    }

    pub fn sub_unit(&self, sub_unit: usize) -> &SubUnitCache {
        let idx = sub_unit.min(self.sub_units.len() - 1);
        &self.sub_units[idx]
    }

    /// Feed a boosted contribution; only score, great and combo are tracked
    pub fn record(&mut self, sub_unit: usize, kind: BonusKind, value: i32, source: (Slot, u32)) {
        if !(kind.is_score() || matches!(kind, BonusKind::Great | BonusKind::Combo)) {
            return;
        }
        if let Some(cache) = self.sub_units.get_mut(sub_unit) {
            cache.offer(kind, value, source);
        }
    }
}
