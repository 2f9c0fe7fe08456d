//! Skill interaction tests through full perfect runs

mod common;

use common::*;
use stage_sim::core::types::{Color, Judgement};
use stage_sim::engine::CustomRun;
use stage_sim::results::{SkillInact, SkillStatus};
use stage_sim::skills::RawSkill;
use stage_sim::simulator::Simulator;
use stage_sim::unit::Card;

// Note index 50 sits at ~20.3s, inside the first 20s window

fn five_family_cards() -> Vec<Card> {
    vec![
        card_with(1, Color::Cute, raw(100_001, 1, 20, 6.0, 10_000, 120)),
        card_with(2, Color::Cute, raw(100_002, 2, 20, 6.0, 10_000, 115)),
        card_with(3, Color::Cute, raw(100_004, 4, 20, 6.0, 10_000, 118)),
        card_with(4, Color::Cute, raw(100_017, 17, 20, 6.0, 10_000, 3)),
        card_with(5, Color::Cute, raw(100_012, 12, 20, 6.0, 10_000, 0)),
    ]
}

#[test]
fn test_same_kind_bonuses_take_max_without_resonance() {
    let prepared = prepare(wide(five_family_cards()), eighty_second_chart());
    let result = Simulator::run_perfect(&prepared);
    let note = result.detail.note(50).unwrap();
    assert_eq!(note.score_bonus, 20);
    assert_eq!(note.combo_bonus, 18);
}

#[test]
fn test_resonance_sums_same_kind_bonuses() {
    let mut cards = five_family_cards();
    cards[0] = cards[0].clone().with_leader(resonance_leader());
    let prepared = prepare(wide(cards), eighty_second_chart());
    assert_eq!(prepared.resonance(), &[true]);

    let result = Simulator::run_perfect(&prepared);
    let note = result.detail.note(50).unwrap();
    assert_eq!(note.score_bonus, 35);
    assert_eq!(note.combo_bonus, 18);
}

#[test]
fn test_resonance_needs_five_distinct_types() {
    let mut cards = five_family_cards();
    cards[0] = cards[0].clone().with_leader(resonance_leader());
    cards[1] = card_with(2, Color::Cute, raw(100_003, 1, 20, 6.0, 10_000, 115));
    let prepared = prepare(wide(cards), eighty_second_chart());
    assert_eq!(prepared.resonance(), &[false]);

    let note_bonus = Simulator::run_perfect(&prepared).detail.note(50).unwrap().score_bonus;
    assert_eq!(note_bonus, 20);
}

fn magic_cards() -> Vec<Card> {
    vec![
        card_with(1, Color::Cute, raw(100_041, 41, 20, 6.0, 10_000, 0)),
        card_with(2, Color::Cute, raw(100_001, 1, 20, 6.0, 10_000, 120)),
        card_with(3, Color::Cute, raw(100_004, 4, 20, 6.0, 10_000, 118)),
        card_with(4, Color::Cute, raw(100_017, 17, 20, 6.0, 10_000, 3)),
        card_with(5, Color::Cute, raw(100_012, 12, 20, 6.0, 10_000, 0)),
    ]
}

#[test]
fn test_magic_copies_every_sibling() {
    let prepared = prepare(wide(magic_cards()), eighty_second_chart());
    let result = Simulator::run_perfect(&prepared);

    let magic = result.detail.skill(1, 1).unwrap();
    assert_eq!(magic.status, SkillStatus::Active);
    let bonus = magic.magic_bonus.as_ref().unwrap();
    assert_eq!(bonus.copies.len(), 4);
    assert!(bonus.guard);

    let note = result.detail.note(50).unwrap();
    assert_eq!(note.score_bonus, 20);
    assert_eq!(note.combo_bonus, 18);
}

#[test]
fn test_magic_collapses_then_sums_under_resonance() {
    let mut cards = magic_cards();
    cards[0] = cards[0].clone().with_leader(resonance_leader());
    let prepared = prepare(wide(cards), eighty_second_chart());
    let note = Simulator::run_perfect(&prepared).detail.note(50).cloned().unwrap();
    // own score skill + magic's collapsed copy
    assert_eq!(note.score_bonus, 40);
    assert_eq!(note.combo_bonus, 36);
}

#[test]
fn test_encore_without_earlier_activation() {
    let encore = card_with(1, Color::Cute, raw(100_016, 16, 5, 3.0, 10_000, 0));
    let score = card_with(2, Color::Cute, raw(100_001, 1, 20, 6.0, 10_000, 120));
    let cards = vec![encore, score, plain_card(3), plain_card(4), plain_card(5)];
    let prepared = prepare(wide(cards), eighty_second_chart());
    let result = Simulator::run_perfect(&prepared);

    assert_eq!(result.detail.skill(1, 1).unwrap().inact(), Some(SkillInact::NoEncoreable));
    // simultaneous score activation is not a valid target
    assert_eq!(result.detail.skill(1, 4).unwrap().inact(), Some(SkillInact::NoEncoreable));

    let copied = result.detail.skill(1, 5).unwrap();
    assert_eq!(copied.status, SkillStatus::Active);
    assert_eq!(copied.encore_target, Some(2));
}

#[test]
fn test_encore_copies_latest_activation() {
    let encore = card_with(1, Color::Cute, raw(100_016, 16, 20, 6.0, 10_000, 0));
    let score = card_with(2, Color::Cute, raw(100_001, 1, 11, 6.0, 10_000, 120));
    let cards = vec![encore, score, plain_card(3), plain_card(4), plain_card(5)];
    let prepared = prepare(wide(cards), eighty_second_chart());
    let result = Simulator::run_perfect(&prepared);

    for serial in 1..=3 {
        assert_eq!(result.detail.skill(1, serial).unwrap().encore_target, Some(2));
    }
}

#[test]
fn test_focus_needs_monochrome_unit() {
    let focus = card_with(1, Color::Cute, raw(100_021, 21, 20, 6.0, 10_000, 130));
    let mut off_color = plain_card(5);
    off_color.color = Color::Cool;
    let cards = vec![focus, plain_card(2), plain_card(3), plain_card(4), off_color];
    let prepared = prepare(wide(cards), eighty_second_chart());
    let result = Simulator::run_perfect(&prepared);
    assert_eq!(result.detail.skill(1, 1).unwrap().inact(), Some(SkillInact::FocusColor));
    assert_eq!(result.detail.note(50).unwrap().score_bonus, 0);
}

#[test]
fn test_full_roll_chance_is_product_of_probabilities() {
    let half = |id| card_with(id, Color::Cute, raw(100_001, 1, 20, 6.0, 5_000, 120));
    let cards = vec![half(1), half(2), plain_card(3), plain_card(4), plain_card(5)];
    let prepared = prepare(wide(cards), eighty_second_chart());
    let result = Simulator::run_perfect(&prepared);
    assert!((result.detail.full_roll_chance - 0.5f64.powi(6)).abs() < 1e-12);
}

#[test]
fn test_grand_sub_units_stagger() {
    let mut cards = Vec::new();
    for unit in 0..3u32 {
        cards.push(Some(score_card(unit * 5 + 1)));
        cards.extend((2..=5).map(|i| Some(plain_card(unit * 5 + i))));
    }
    let formation = stage_sim::unit::Formation::from_cards(cards).unwrap();
    let prepared = prepare(formation, eighty_second_chart());

    // interval 20 over 80s: indices 1..=3 split across offsets 0, 1 and 2
    let ons: Vec<(usize, i64)> = prepared
        .timeline()
        .activations()
        .iter()
        .map(|a| (a.slot, a.on))
        .collect();
    assert_eq!(ons, vec![(1, 20_000_000), (6, 40_000_000), (11, 60_000_000)]);
}

// Note index 55 sits at ~22.3s, inside the 20s..26s window

fn combo_support_cards(boosted: bool) -> Vec<Card> {
    let support = card_with(1, Color::Cute, raw(100_009, 9, 20, 6.0, 10_000, 0));
    let second = if boosted {
        // +1 support level from a 1200 boost
        card_with(2, Color::Cute, raw(100_020, 20, 20, 6.0, 10_000, 1200))
    } else {
        plain_card(2)
    };
    vec![support, second, plain_card(3), plain_card(4), plain_card(5)]
}

#[test]
fn test_boosted_combo_support_covers_miss() {
    let prepared = prepare(wide(combo_support_cards(true)), eighty_second_chart());
    let result = Simulator::run_custom(&prepared, &CustomRun::new().miss(55));
    let missed = result.detail.note(55).unwrap();
    assert_eq!(missed.judgement, Judgement::Miss);
    assert_eq!(missed.score, 0);
    assert_eq!(missed.combo, 56);
}

#[test]
fn test_combo_support_alone_does_not_cover_miss() {
    let prepared = prepare(wide(combo_support_cards(false)), eighty_second_chart());
    let result = Simulator::run_custom(&prepared, &CustomRun::new().miss(55));
    assert_eq!(result.detail.note(55).unwrap().combo, 0);
    assert_eq!(result.detail.note(56).unwrap().combo, 1);
}

#[test]
fn test_guard_blocks_drain() {
    let guard = card_with(1, Color::Cute, raw(100_012, 12, 20, 6.0, 10_000, 0));
    let custom = CustomRun::new().miss(10).miss(55);

    let guarded = prepare(single_skill(guard), eighty_second_chart());
    let detail = Simulator::run_custom(&guarded, &custom).detail;
    assert_eq!(detail.note(10).unwrap().life, 180);
    assert_eq!(detail.note(55).unwrap().life, 180);

    let unguarded = prepare(single_skill(plain_card(1)), eighty_second_chart());
    let detail = Simulator::run_custom(&unguarded, &custom).detail;
    assert_eq!(detail.note(10).unwrap().life, 180);
    assert_eq!(detail.note(55).unwrap().life, 160);
}

#[test]
fn test_alternate_scales_earlier_score_in_run() {
    // x1.5 of the best score bonus seen so far, combo -20
    let alternate = RawSkill {
        value_2: 150,
        ..raw(100_039, 39, 30, 6.0, 10_000, 80)
    };
    let cards = vec![
        card_with(1, Color::Cute, alternate),
        score_card(2),
        plain_card(3),
        plain_card(4),
        plain_card(5),
    ];
    let prepared = prepare(wide(cards), eighty_second_chart());
    let result = Simulator::run_perfect(&prepared);

    let first = result.detail.skill(1, 1).unwrap();
    assert_eq!(first.status, SkillStatus::Active);
    assert!(first.amr_bonus.is_some());

    // ~32.2s: alternate active, score card idle until 40s
    let note = result.detail.note(80).unwrap();
    assert_eq!(note.score_bonus, 30);
    assert_eq!(note.combo_bonus, -20);
}
