//! Abuse probing over a recorded perfect baseline
//!
//! Every note is re-judged at synthetic hit times: its window boundaries and
//! every skill event inside its GREAT window, nudged by epsilon to either
//! side. Only judgements that keep combo under the active combo support are
//! considered, so the baseline combo weights stay valid.

use std::collections::BTreeMap;

use crate::bonus::ActiveSkill;
use crate::core::types::{Judgement, Micros, Slot};
use crate::engine::judgement::{apply_perfect_support, keeps_combo};
use crate::engine::mode::RunMode;
use crate::engine::state::{note_score, score_bonus_for, Snapshot, StateMachine};
use crate::results::{AbuseData, AbuseNote};

/// Active set a note at `time` would see
fn snapshot_at(snapshots: &[Snapshot], time: Micros) -> Option<&BTreeMap<Slot, ActiveSkill>> {
    let idx = snapshots.partition_point(|s| s.time < time || (s.time == time && s.before_notes));
    idx.checked_sub(1).map(|i| &snapshots[i].active)
}

impl<'p> StateMachine<'p> {
    /// Probe every note of a finished abuse-mode run
    pub fn probe_abuse(&mut self) -> AbuseData {
        if !matches!(self.mode, RunMode::Abuse) {
            tracing::warn!("Abuse probing requested on a run that did not record snapshots");
        }
        let prepared = self.prepared;
        let live = prepared.live();
        let epsilon = prepared.config().abuse_epsilon_us;
        let empty = BTreeMap::new();
        let mut notes = Vec::with_capacity(live.notes.len());

        for (idx, note) in live.notes.iter().enumerate() {
            let Some(baseline) = self.outcomes[idx] else {
                continue;
            };
            let window = prepared.window(idx);
            let weight = prepared.weight(baseline.combo);
            let time = note.time_us;

            let mut offsets: Vec<Micros> = vec![
                -window.great,
                -window.perfect,
                -window.perfect / 2,
                0,
                window.perfect / 2,
                window.perfect,
                window.great,
            ];
            for snapshot in &self.snapshots {
                let distance = snapshot.time - time;
                if distance.abs() <= window.great {
                    offsets.push(distance - epsilon);
                    offsets.push(distance + epsilon);
                }
            }
            offsets.retain(|d| d.abs() <= window.great);
            offsets.sort_unstable();
            offsets.dedup();

            let mut best = (baseline.score, Judgement::Perfect);
            let mut best_offsets: Vec<Micros> = Vec::new();
            let mut worst = baseline.score;

            for &offset in &offsets {
                let active = snapshot_at(&self.snapshots, time + offset).unwrap_or(&empty);
                let bonuses = self.resolver.resolve(active, baseline.life_before);
                let raw = window.judge(offset, bonuses.concentration);
                let judgement = apply_perfect_support(raw, bonuses.perfect_support());
                if !keeps_combo(judgement, bonuses.combo_support()) {
                    continue;
                }
                let score = note_score(
                    prepared.base_score(),
                    weight,
                    judgement,
                    score_bonus_for(&bonuses, judgement, note.note_type),
                    bonuses.combo(),
                );
                worst = worst.min(score);
                if score > best.0 {
                    best = (score, judgement);
                    best_offsets.clear();
                }
                if score == best.0 {
                    best_offsets.push(offset);
                }
            }

            let left = best_offsets.iter().copied().min().unwrap_or(0);
            let right = best_offsets.iter().copied().max().unwrap_or(0);
            let improved = best.0 > baseline.score;
            let crosses_center = left < 0 && right > 0;

            let entry = if improved && !crosses_center {
                AbuseNote {
                    index: idx,
                    time,
                    baseline_score: baseline.score,
                    score_delta: (best.0 - baseline.score) as i64,
                    window_left: left,
                    window_right: right,
                    judgement: best.1,
                    worst_score: worst,
                }
            } else {
                AbuseNote {
                    index: idx,
                    time,
                    baseline_score: baseline.score,
                    score_delta: 0,
                    window_left: 0,
                    window_right: 0,
                    judgement: baseline.judgement,
                    worst_score: worst,
                }
            };
            notes.push(entry);
        }

        tracing::debug!("Abuse probing done, memo hits {}", self.resolver.hits());
        AbuseData { notes }
    }
}
