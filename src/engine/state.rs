//! Event-driven scoring state machine
//!
//! One machine runs one live: `reset` picks a mode and fills the note and
//! skill event queues, `run` pops whichever is chronologically first until
//! both are empty.

use std::collections::BTreeMap;
use std::rc::Rc;

use ahash::AHashSet;
use rand::Rng;

use crate::bonus::{ActiveSkill, BonusKind, BonusResolver, Bonuses, ExpansionContext, UnitCache};
use crate::core::types::{Judgement, Micros, NoteType, Slot};
use crate::engine::judgement::{apply_perfect_support, keeps_combo, sample_offset};
use crate::engine::mode::RunMode;
use crate::live::life_drain;
use crate::results::{LiveDetail, NoteDetail, NoteDetailSkill, SkillDetail, SkillInact, SkillStatus};
use crate::simulator::PreparedSimulation;
use crate::timeline::{EventKind, RollOutcome, SkillEvent};

/// Score of one note
pub fn note_score(base: f64, weight: f64, judgement: Judgement, score_bonus: i32, combo_bonus: i32) -> u64 {
    let raw = base
        * weight
        * judgement.multiplier()
        * (1.0 + score_bonus as f64 / 100.0)
        * (1.0 + combo_bonus as f64 / 100.0);
    raw.round().max(0.0) as u64
}

/// Score bonus a judgement earns
pub fn score_bonus_for(bonuses: &Bonuses, judgement: Judgement, note_type: NoteType) -> i32 {
    match judgement {
        Judgement::Perfect => bonuses.score(note_type),
        Judgement::Great => bonuses.great(),
        _ => 0,
    }
}

/// What happened to one note
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteOutcome {
    pub judgement: Judgement,
    /// Combo after the note
    pub combo: usize,
    /// Life when the note was judged
    pub life_before: i32,
    pub score: u64,
}

/// Active set after one skill event
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub time: Micros,
    pub before_notes: bool,
    pub active: BTreeMap<Slot, ActiveSkill>,
}

pub struct StateMachine<'p> {
    pub(super) prepared: &'p PreparedSimulation,
    pub(super) mode: RunMode,

    hit_times: Vec<Micros>,
    order: Vec<usize>,
    events: Vec<SkillEvent>,
    roll: RollOutcome,

    active: BTreeMap<Slot, ActiveSkill>,
    history: Vec<ActiveSkill>,
    cache: UnitCache,
    pub(super) resolver: BonusResolver,

    life: i32,
    max_life: i32,
    combo: usize,
    max_combo: usize,
    lowest_life: i32,
    lowest_life_time: Micros,
    broken_groups: AHashSet<u32>,

    pub(super) outcomes: Vec<Option<NoteOutcome>>,
    pub(super) snapshots: Vec<Snapshot>,
    total: u64,
    detail: LiveDetail,
}

impl<'p> StateMachine<'p> {
    pub fn new(prepared: &'p PreparedSimulation) -> Self {
        let sub_units = prepared.formation().sub_unit_count();
        Self {
            prepared,
            mode: RunMode::Perfect,
            hit_times: Vec::new(),
            order: Vec::new(),
            events: Vec::new(),
            roll: RollOutcome {
                activated: Vec::new(),
                chance: 1.0,
            },
            active: BTreeMap::new(),
            history: Vec::new(),
            cache: UnitCache::new(sub_units),
            resolver: BonusResolver::new(prepared.resonance().to_vec(), prepared.live().grand),
            life: 0,
            max_life: 0,
            combo: 0,
            max_combo: 0,
            lowest_life: 0,
            lowest_life_time: 0,
            broken_groups: AHashSet::new(),
            outcomes: Vec::new(),
            snapshots: Vec::new(),
            total: 0,
            detail: LiveDetail::default(),
        }
    }

    /// Prepare queues and state for a fresh run
    pub fn reset<R: Rng>(&mut self, mode: RunMode, rng: &mut R) {
        let prepared = self.prepared;
        let live = prepared.live();
        let config = prepared.config();

        self.roll = match mode {
            RunMode::Probabilistic { .. } if config.fail_simulate => prepared.timeline().roll(rng),
            _ => prepared.timeline().all_activate(),
        };

        self.hit_times = live
            .notes
            .iter()
            .enumerate()
            .map(|(idx, note)| {
                let offset = match &mode {
                    RunMode::Perfect | RunMode::Abuse => 0,
                    RunMode::Probabilistic { perfect_only } => {
                        if note.is_scored() {
                            sample_offset(&mut *rng, &prepared.window(idx), *perfect_only)
                        } else {
                            0
                        }
                    }
                    RunMode::Autoplay { time_offset, special_offset } => {
                        if note.is_flick() || note.is_long() || note.is_slide() {
                            *special_offset
                        } else {
                            *time_offset
                        }
                    }
                    RunMode::Custom(custom) => custom.note_offsets.get(&idx).copied().unwrap_or(0),
                };
                note.time_us + offset
            })
            .collect();

        let mut order: Vec<usize> = (0..live.notes.len()).collect();
        order.sort_by_key(|&idx| (self.hit_times[idx], idx));
        self.order = order;

        self.events = prepared.timeline().events(&self.roll.activated, config);

        self.active.clear();
        self.history.clear();
        self.cache.reset();
        self.resolver.reset();
        self.broken_groups.clear();

        let base_life = prepared.stats().life;
        self.max_life = base_life * 2;
        self.life = if config.doublelife { self.max_life } else { base_life };
        self.lowest_life = self.life;
        self.lowest_life_time = 0;
        self.combo = 0;
        self.max_combo = 0;
        self.total = 0;
        self.outcomes = vec![None; live.notes.len()];
        self.snapshots.clear();

        self.detail = LiveDetail {
            notes: Vec::new(),
            skills: Vec::new(),
            full_roll_chance: self.roll.chance,
            max_life: self.max_life,
        };
        if config.record_details {
            self.detail.notes = vec![None; live.notes.len()];
            self.detail.skills = prepared
                .timeline()
                .activations()
                .iter()
                .zip(&self.roll.activated)
                .map(|(activation, &rolled)| SkillDetail {
                    slot: activation.slot,
                    serial: activation.serial,
                    on: activation.on,
                    off: activation.off,
                    probability: activation.probability,
                    status: if rolled {
                        SkillStatus::Active
                    } else {
                        SkillStatus::Inactive(SkillInact::NotRolled)
                    },
                    encore_target: None,
                    amr_bonus: None,
                    magic_bonus: None,
                })
                .collect();
        }

        self.mode = mode;
    }

    /// Process every note and skill event
    pub fn run(&mut self) {
        let mut note_cursor = 0;
        let mut event_cursor = 0;
        loop {
            let next_note = self.order.get(note_cursor).copied();
            let next_event = self.events.get(event_cursor).copied();
            match (next_note, next_event) {
                (None, None) => break,
                (Some(note), Some(event)) => {
                    let note_time = self.hit_times[note];
                    if event.time < note_time || (event.time == note_time && event.before_notes) {
                        self.handle_event(event);
                        event_cursor += 1;
                    } else {
                        self.handle_note(note);
                        note_cursor += 1;
                    }
                }
                (Some(note), None) => {
                    self.handle_note(note);
                    note_cursor += 1;
                }
                (None, Some(event)) => {
                    self.handle_event(event);
                    event_cursor += 1;
                }
            }
        }
    }

    fn set_status(&mut self, activation: usize, status: SkillStatus) {
        if let Some(detail) = self.detail.skills.get_mut(activation) {
            detail.status = status;
        }
    }

    fn handle_event(&mut self, event: SkillEvent) {
        match event.kind {
            EventKind::Activate => self.activate(event),
            EventKind::Deactivate => {
                if self.active.get(&event.slot).map(|a| a.serial) == Some(event.serial) {
                    self.active.remove(&event.slot);
                }
            }
        }
        if matches!(self.mode, RunMode::Abuse) {
            self.snapshots.push(Snapshot {
                time: event.time,
                before_notes: event.before_notes,
                active: self.active.clone(),
            });
        }
    }

    fn activate(&mut self, event: SkillEvent) {
        if let RunMode::Custom(custom) = &self.mode {
            if custom.is_disabled(event.slot, event.serial) {
                self.set_status(event.activation, SkillStatus::Deactivated);
                return;
            }
        }

        let prepared = self.prepared;
        let activation = &prepared.timeline().activations()[event.activation];
        let ctx = ExpansionContext {
            formation: prepared.formation(),
            live: prepared.live(),
            config: prepared.config(),
            life: self.life,
            cache: &self.cache,
            history: &self.history,
        };

        let expanded = match ctx.expand(activation) {
            Ok(expanded) => expanded,
            Err(reason) => {
                tracing::debug!(
                    "Slot {} activation {} at {}us inactive: {:?}",
                    event.slot,
                    event.serial,
                    event.time,
                    reason
                );
                self.set_status(event.activation, SkillStatus::Inactive(reason));
                return;
            }
        };

        let cost = expanded.active.life_cost();
        if cost > 0 {
            self.life = (self.life - cost).max(0);
            self.track_life(event.time);
        }

        tracing::debug!(
            "Slot {} activation {} at {}us with {} copies",
            event.slot,
            event.serial,
            event.time,
            expanded.active.copies.len()
        );
        if let Some(detail) = self.detail.skills.get_mut(event.activation) {
            detail.status = SkillStatus::Active;
            detail.encore_target = expanded.active.encore_target;
            detail.amr_bonus = expanded.amr_bonus.clone();
            detail.magic_bonus = expanded.magic_bonus.clone();
        }

        self.history.push(expanded.active.clone());
        self.active.insert(event.slot, expanded.active);

        let bonuses = self.resolver.resolve(&self.active, self.life);
        for contribution in bonuses.contributions.iter().filter(|c| !c.derived) {
            self.cache.record(
                contribution.sub_unit,
                contribution.kind,
                contribution.value,
                (contribution.slot, contribution.serial),
            );
        }
    }

    fn track_life(&mut self, time: Micros) {
        if self.life < self.lowest_life {
            self.lowest_life = self.life;
            self.lowest_life_time = time;
        }
    }

    fn judge(&mut self, idx: usize, bonuses: &Bonuses) -> Judgement {
        let prepared = self.prepared;
        let note = &prepared.live().notes[idx];
        match &self.mode {
            RunMode::Perfect | RunMode::Abuse => return Judgement::Perfect,
            RunMode::Custom(custom) if custom.forced_misses.contains(&idx) => return Judgement::Miss,
            RunMode::Autoplay { .. } if note.is_held() && self.broken_groups.contains(&note.group_id) => {
                return Judgement::Miss;
            }
            _ => {}
        }

        let delta = self.hit_times[idx] - note.time_us;
        let raw = prepared.window(idx).judge(delta, bonuses.concentration);
        let judgement = apply_perfect_support(raw, bonuses.perfect_support());

        if matches!(self.mode, RunMode::Autoplay { .. }) && note.is_held() {
            let breaks = (note.group_head && matches!(judgement, Judgement::Bad | Judgement::Miss))
                || (note.checkpoint && judgement == Judgement::Miss);
            if breaks {
                self.broken_groups.insert(note.group_id);
            }
        }
        judgement
    }

    fn handle_note(&mut self, idx: usize) {
        let prepared = self.prepared;
        let note = &prepared.live().notes[idx];
        if !note.is_scored() {
            return;
        }

        let bonuses: Rc<Bonuses> = self.resolver.resolve(&self.active, self.life);
        let judgement = self.judge(idx, &bonuses);
        let life_before = self.life;

        if keeps_combo(judgement, bonuses.combo_support()) {
            self.combo += 1;
            self.max_combo = self.max_combo.max(self.combo);
        } else {
            self.combo = 0;
        }

        match judgement {
            Judgement::Perfect => {
                self.life = (self.life + bonuses.life()).min(self.max_life);
            }
            Judgement::Bad | Judgement::Miss if !bonuses.guard => {
                let drain = life_drain(prepared.live().difficulty, judgement, note.checkpoint);
                self.life = (self.life - drain).max(0);
            }
            _ => {}
        }
        self.track_life(self.hit_times[idx]);

        let score_bonus = score_bonus_for(&bonuses, judgement, note.note_type);
        let combo_bonus = bonuses.combo();
        let score = note_score(
            prepared.base_score(),
            prepared.weight(self.combo),
            judgement,
            score_bonus,
            combo_bonus,
        );
        self.total += score;
        self.outcomes[idx] = Some(NoteOutcome {
            judgement,
            combo: self.combo,
            life_before,
            score,
        });

        if prepared.config().record_details {
            self.record_note(idx, judgement, &bonuses, score_bonus, combo_bonus, score);
        }
    }

    fn record_note(
        &mut self,
        idx: usize,
        judgement: Judgement,
        bonuses: &Bonuses,
        score_bonus: i32,
        combo_bonus: i32,
        score: u64,
    ) {
        let prepared = self.prepared;
        let live = prepared.live();
        let note = &live.notes[idx];
        let score_kind = match judgement {
            Judgement::Perfect => Some(BonusKind::score_for(note.note_type)),
            Judgement::Great => Some(BonusKind::Great),
            _ => None,
        };
        let skills = bonuses
            .contributions
            .iter()
            .filter(|c| {
                Some(c.kind) == score_kind
                    || matches!(
                        c.kind,
                        BonusKind::Combo | BonusKind::PerfectSupport | BonusKind::ComboSupport
                    )
                    || (c.kind == BonusKind::Life && judgement == Judgement::Perfect)
            })
            .map(|c| NoteDetailSkill {
                slot: c.slot,
                lane: c.origin_slot as u8,
                kind: c.kind,
                value: c.value,
                boost_chain: c.boost_chain.clone(),
            })
            .collect();
        let lane = if prepared.config().mirror {
            note.mirrored_lane(live.lanes())
        } else {
            note.lane
        };
        if let Some(entry) = self.detail.notes.get_mut(idx) {
            *entry = Some(NoteDetail {
                index: idx,
                time: self.hit_times[idx],
                note_type: note.note_type,
                lane,
                judgement,
                life: self.life,
                combo: self.combo,
                score_bonus,
                combo_bonus,
                score,
                cumulative_score: self.total,
                skills,
            });
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Per-note scores indexed by chart position
    pub fn note_scores(&self) -> Vec<u64> {
        self.outcomes.iter().map(|o| o.map_or(0, |o| o.score)).collect()
    }

    pub fn outcomes(&self) -> &[Option<NoteOutcome>] {
        &self.outcomes
    }

    pub fn life(&self) -> i32 {
        self.life
    }

    pub fn max_combo(&self) -> usize {
        self.max_combo
    }

    pub fn lowest_life(&self) -> (i32, Micros) {
        (self.lowest_life, self.lowest_life_time)
    }

    pub fn full_roll_chance(&self) -> f64 {
        self.roll.chance
    }

    pub fn detail(&self) -> &LiveDetail {
        &self.detail
    }

    pub fn take_detail(&mut self) -> LiveDetail {
        std::mem::take(&mut self.detail)
    }
}
