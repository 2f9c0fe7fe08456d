//! Judgement adjustments from support skills and hit offset sampling

use rand::Rng;

use crate::core::types::{Judgement, Micros};
use crate::live::TimingWindow;

/// Highest support level with an effect
pub const MAX_SUPPORT: i32 = 3;

/// Perfect support lifts GREAT (1), NICE (2) and BAD (3) to PERFECT
pub fn apply_perfect_support(judgement: Judgement, support: i32) -> Judgement {
    if judgement == Judgement::Miss {
        return judgement;
    }
    if i32::from(judgement.severity()) <= support.min(MAX_SUPPORT) {
        Judgement::Perfect
    } else {
        judgement
    }
}

/// Does the combo survive this judgement?
///
/// Combo support covers NICE (1), BAD (2) and MISS (3).
pub fn keeps_combo(judgement: Judgement, combo_support: i32) -> bool {
    if judgement.keeps_combo() {
        return true;
    }
    let needed = i32::from(judgement.severity()) - 1;
    combo_support.min(MAX_SUPPORT) >= needed
}

/// Uniform hit offset inside the PERFECT (or GREAT) half-width
pub fn sample_offset<R: Rng>(rng: &mut R, window: &TimingWindow, perfect_only: bool) -> Micros {
    let half = if perfect_only { window.perfect } else { window.great };
    rng.gen_range(-half..=half)
}
