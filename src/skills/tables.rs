//! Numeric lookup tables consumed by skill construction and dynamic skills

use crate::core::types::Rarity;
use crate::skills::family::BoostEffect;

/// Probability bonus (per 10000) by skill potential level 0..=10
pub const POTENTIAL_PROBABILITY_BONUS: [u32; 11] = [0, 100, 200, 300, 400, 600, 800, 1000, 1300, 1600, 2000];

pub fn potential_bonus(level: u8) -> u32 {
    POTENTIAL_PROBABILITY_BONUS[(level as usize).min(POTENTIAL_PROBABILITY_BONUS.len() - 1)]
}

/// Boost rows: raw value -> (score, combo, life, support)
const BOOST_TABLE: [(i32, BoostEffect); 6] = [
    (1100, BoostEffect { score: 10, combo: 10, life: 10, support: 0 }),
    (1150, BoostEffect { score: 15, combo: 15, life: 15, support: 0 }),
    (1200, BoostEffect { score: 20, combo: 20, life: 20, support: 1 }),
    (1300, BoostEffect { score: 30, combo: 30, life: 30, support: 1 }),
    (1500, BoostEffect { score: 50, combo: 50, life: 50, support: 1 }),
    (1600, BoostEffect { score: 60, combo: 60, life: 60, support: 1 }),
];

/// Resolve a raw boost value through the boost table
///
/// Values missing from the table scale linearly from the per-mille raw value.
pub fn boost_lookup(raw: i32) -> BoostEffect {
    if let Some((_, effect)) = BOOST_TABLE.iter().find(|(value, _)| *value == raw) {
        return *effect;
    }
    let percent = (raw / 10 - 100).max(0);
    BoostEffect {
        score: percent,
        combo: percent,
        life: percent,
        support: i32::from(raw >= 1200),
    }
}

/// Harmony boost applied to the primary color when the formation is exactly
/// the harmony's two colors
pub const HARMONY_BOOST: BoostEffect = BoostEffect { score: 50, combo: 50, life: 50, support: 1 };

/// Overload / spike life requirement keyed by interval
const LIFE_REQUIREMENT: [(u32, i32); 8] = [(6, 6), (7, 9), (8, 11), (9, 12), (10, 15), (11, 16), (12, 19), (13, 20)];

pub fn life_requirement(interval: u32) -> i32 {
    LIFE_REQUIREMENT
        .iter()
        .find(|(i, _)| *i == interval)
        .map_or(15, |(_, cost)| *cost)
}

const fn scaled_table<const N: usize>(num: i32, den: i32, cap: i32) -> [i32; N] {
    let mut table = [0; N];
    let mut i = 0;
    while i < N {
        let value = (i as i32) * num / den;
        table[i] = if value > cap { cap } else { value };
        i += 1;
    }
    table
}

pub const SPARKLE_TABLE_LEN: usize = 120;

/// Sparkle combo bonus by `life / 10`, monotonic by construction
pub const SPARKLE_SSR_WIDE: [i32; SPARKLE_TABLE_LEN] = scaled_table(2, 3, 30);
pub const SPARKLE_SR_WIDE: [i32; SPARKLE_TABLE_LEN] = scaled_table(8, 15, 24);
pub const SPARKLE_SSR_GRAND: [i32; SPARKLE_TABLE_LEN] = scaled_table(2, 9, 30);
pub const SPARKLE_SR_GRAND: [i32; SPARKLE_TABLE_LEN] = scaled_table(8, 45, 24);

pub fn sparkle_bonus(life: i32, rarity: Rarity, grand: bool) -> i32 {
    let bucket = ((life.max(0) / 10) as usize).min(SPARKLE_TABLE_LEN - 1);
    let table = match (rarity, grand) {
        (Rarity::Ssr, false) => &SPARKLE_SSR_WIDE,
        (Rarity::Ssr, true) => &SPARKLE_SSR_GRAND,
        (_, false) => &SPARKLE_SR_WIDE,
        (_, true) => &SPARKLE_SR_GRAND,
    };
    table[bucket]
}

/// Appeal granularity of the motif table
pub const MOTIF_STEP: u32 = 1000;
pub const MOTIF_TABLE_LEN: usize = 61;

/// Motif score bonus by trimmed sub-unit stat total
pub const MOTIF_TABLE: [i32; MOTIF_TABLE_LEN] = scaled_table(3, 5, 30);

pub fn motif_bonus(stat_total: u32) -> i32 {
    let idx = ((stat_total / MOTIF_STEP) as usize).min(MOTIF_TABLE_LEN - 1);
    MOTIF_TABLE[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparkle_tables_monotonic() {
        for table in [&SPARKLE_SSR_WIDE, &SPARKLE_SR_WIDE, &SPARKLE_SSR_GRAND, &SPARKLE_SR_GRAND] {
            assert!(table.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_sparkle_lookup_buckets() {
        assert_eq!(sparkle_bonus(0, Rarity::Ssr, false), 0);
        assert_eq!(sparkle_bonus(300, Rarity::Ssr, false), 20);
        assert_eq!(sparkle_bonus(309, Rarity::Ssr, false), 20);
        assert_eq!(sparkle_bonus(5000, Rarity::Ssr, false), 30);
        assert!(sparkle_bonus(300, Rarity::Sr, false) < sparkle_bonus(300, Rarity::Ssr, false));
    }

    #[test]
    fn test_boost_lookup_table_and_fallback() {
        assert_eq!(boost_lookup(1200).support, 1);
        assert_eq!(boost_lookup(1100).support, 0);
        assert_eq!(boost_lookup(1400).score, 40);
    }

    #[test]
    fn test_motif_trimmed_to_step() {
        assert_eq!(motif_bonus(30_999), motif_bonus(30_000));
        assert_eq!(motif_bonus(30_000), 18);
        assert_eq!(motif_bonus(u32::MAX), 30);
    }

    #[test]
    fn test_life_requirement_lookup() {
        assert_eq!(life_requirement(7), 9);
        assert_eq!(life_requirement(99), 15);
    }
}
