//! Alternate / mutual / refrain derivation from the unit cache

use crate::bonus::cache::{CachedBest, SubUnitCache};
use crate::bonus::live_skill::{BonusKind, LiveSkill};
use crate::results::{AmrBonus, AmrEntry, SkillInact};
use crate::skills::SkillFamily;

fn scaled(best: CachedBest, multiplier: i32) -> i32 {
    let product = best.value as i64 * multiplier as i64;
    ((product + 99) / 100) as i32
}

fn copy_kinds(copy: &mut LiveSkill, cache: &SubUnitCache, kinds: &[BonusKind], multiplier: i32, bonus: &mut AmrBonus) {
    for &kind in kinds {
        let Some(best) = cache.get(kind) else {
            continue;
        };
        let value = scaled(best, multiplier);
        copy.values.set(kind, value);
        bonus.entries.push(AmrEntry {
            kind,
            value,
            source: Some(best.source),
        });
    }
}

const SCORE_AND_GREAT: [BonusKind; 5] = [
    BonusKind::Tap,
    BonusKind::Long,
    BonusKind::Flick,
    BonusKind::Slide,
    BonusKind::Great,
];

/// Overwrite an AMR copy's values from the cache
///
/// The copy keeps its own penalty slot. Fails with the family's inactivation
/// reason when there is nothing to copy.
pub fn derive(copy: &mut LiveSkill, cache: &SubUnitCache) -> Result<AmrBonus, SkillInact> {
    let mut bonus = AmrBonus::default();
    match copy.skill.family {
        SkillFamily::Alternate { multiplier } => {
            if cache.no_score() {
                return Err(SkillInact::AltNoScore);
            }
            copy_kinds(copy, cache, &SCORE_AND_GREAT, multiplier, &mut bonus);
        }
        SkillFamily::Mutual { multiplier } => {
            if cache.no_combo() {
                return Err(SkillInact::MutNoCombo);
            }
            copy_kinds(copy, cache, &[BonusKind::Combo], multiplier, &mut bonus);
        }
        SkillFamily::Refrain => {
            if cache.no_score() && cache.no_combo() {
                return Err(SkillInact::RefNothing);
            }
            copy_kinds(copy, cache, &SCORE_AND_GREAT, 100, &mut bonus);
            copy_kinds(copy, cache, &[BonusKind::Combo], 100, &mut bonus);
        }
        _ => return Ok(bonus),
    }
    copy.derived = true;
    Ok(bonus)
}
