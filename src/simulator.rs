//! Simulator facade
//!
//! `setup` validates inputs and builds everything that does not change
//! between runs. Each `run_*` then constructs a fresh state machine over the
//! shared, immutable `PreparedSimulation`.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::Micros;
use crate::engine::{CustomRun, RunMode, StateMachine};
use crate::live::{combo_weights, level_multiplier, timing_window, Live, TimingWindow};
use crate::results::{AbuseData, AutoplayResult, LiveDetail};
use crate::timeline::ActivationTimeline;
use crate::unit::{Formation, StageStats};

/// Inputs and derived tables shared by every run
#[derive(Debug, Clone)]
pub struct PreparedSimulation {
    formation: Formation,
    live: Live,
    config: SimulationConfig,
    stats: StageStats,
    timeline: ActivationTimeline,
    windows: Vec<TimingWindow>,
    weights: Vec<f64>,
    base_score: f64,
    resonance: Vec<bool>,
}

impl PreparedSimulation {
    pub fn formation(&self) -> &Formation {
        &self.formation
    }

    pub fn live(&self) -> &Live {
        &self.live
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn stats(&self) -> StageStats {
        self.stats
    }

    pub fn timeline(&self) -> &ActivationTimeline {
        &self.timeline
    }

    pub fn window(&self, note: usize) -> TimingWindow {
        self.windows[note]
    }

    /// Combo weight for a combo count (after the note)
    pub fn weight(&self, combo: usize) -> f64 {
        self.weights[combo.min(self.weights.len() - 1)]
    }

    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    pub fn resonance(&self) -> &[bool] {
        &self.resonance
    }

    /// Replace the stage totals (e.g. a caller-computed appeal)
    pub fn with_stats(mut self, stats: StageStats) -> Self {
        self.stats = stats;
        self.base_score = base_score(&self.live, &self.config, stats.total_appeal());
        self
    }

    pub fn with_appeals(self, appeals: f64) -> Self {
        let stats = StageStats { appeals, ..self.stats };
        self.with_stats(stats)
    }

    pub fn with_life(mut self, life: i32) -> Self {
        self.stats.life = life;
        self
    }
}

fn base_score(live: &Live, config: &SimulationConfig, appeals: f64) -> f64 {
    let multiplier = config
        .level_multiplier_override
        .unwrap_or_else(|| level_multiplier(live.level));
    appeals * multiplier / live.scored_note_count().max(1) as f64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerfectResult {
    pub total: u64,
    pub note_scores: Vec<u64>,
    pub detail: LiveDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbuseResult {
    /// Perfect baseline plus every note's best delta
    pub total: u64,
    pub baseline: u64,
    pub data: AbuseData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomResult {
    pub total: u64,
    pub note_scores: Vec<u64>,
    pub detail: LiveDetail,
}

pub struct Simulator;

impl Simulator {
    /// Validate inputs and build the shared run data
    pub fn setup(formation: Formation, mut live: Live, config: SimulationConfig) -> Result<PreparedSimulation> {
        config.validate()?;
        live.notes.sort_by(|a, b| a.time.total_cmp(&b.time));
        live.derive_flags();
        if live.scored_note_count() == 0 {
            return Err(SimError::EmptyChart);
        }
        if !live.duration.is_finite() || live.duration <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "live duration ({}) must be a positive number",
                live.duration
            )));
        }

        let stats = formation.stage_stats(&live);
        let timeline = ActivationTimeline::build(&formation, &live);
        let windows = live
            .notes
            .iter()
            .map(|note| timing_window(live.difficulty, note.note_type))
            .collect();
        let weights = combo_weights(live.scored_note_count());
        let resonance = (0..formation.sub_unit_count()).map(|u| formation.resonance(u)).collect();
        let base = base_score(&live, &config, stats.total_appeal());

        tracing::info!(
            "Prepared {} notes, {} activations, appeals {:.0} (support {:.0}), life {}",
            live.notes.len(),
            timeline.len(),
            stats.total_appeal(),
            stats.support,
            stats.life
        );

        Ok(PreparedSimulation {
            formation,
            live,
            config,
            stats,
            timeline,
            windows,
            weights,
            base_score: base,
            resonance,
        })
    }

    /// Every note PERFECT, every activation taken
    pub fn run_perfect(prepared: &PreparedSimulation) -> PerfectResult {
        let mut machine = StateMachine::new(prepared);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        machine.reset(RunMode::Perfect, &mut rng);
        machine.run();
        tracing::info!("Perfect run total {}", machine.total());
        PerfectResult {
            total: machine.total(),
            note_scores: machine.note_scores(),
            detail: machine.take_detail(),
        }
    }

    /// One probabilistic trial with an explicit generator
    pub fn run_trial(prepared: &PreparedSimulation, perfect_only: bool, rng: &mut ChaCha8Rng) -> u64 {
        let mut machine = StateMachine::new(prepared);
        machine.reset(RunMode::Probabilistic { perfect_only }, rng);
        machine.run();
        machine.total()
    }

    /// Independent trials in parallel; trial `i` is seeded with `seed + i`
    pub fn run_probabilistic(prepared: &PreparedSimulation, trials: usize, perfect_only: bool, seed: u64) -> Vec<u64> {
        let config = SimulationConfig {
            record_details: false,
            ..prepared.config.clone()
        };
        let quiet = PreparedSimulation {
            config,
            ..prepared.clone()
        };
        let scores: Vec<u64> = (0..trials as u64)
            .into_par_iter()
            .map(|trial| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(trial));
                Self::run_trial(&quiet, perfect_only, &mut rng)
            })
            .collect();
        tracing::info!("Ran {} probabilistic trials", scores.len());
        scores
    }

    /// Fixed input lag in milliseconds; special offset applies to flick / long / slide
    pub fn run_autoplay(prepared: &PreparedSimulation, time_offset_ms: i64, special_offset_ms: i64) -> AutoplayResult {
        let mut machine = StateMachine::new(prepared);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        machine.reset(
            RunMode::Autoplay {
                time_offset: ms_to_micros(time_offset_ms),
                special_offset: ms_to_micros(special_offset_ms),
            },
            &mut rng,
        );
        machine.run();

        let (perfects, misses) = AutoplayResult::count(machine.outcomes().iter().flatten().map(|o| o.judgement));
        let (lowest_life, lowest_life_time) = machine.lowest_life();
        let all_100 = prepared.timeline().all_activate().chance >= 1.0;
        tracing::info!(
            "Autoplay total {}: {} perfect, {} miss, lowest life {}",
            machine.total(),
            perfects,
            misses,
            lowest_life
        );
        AutoplayResult {
            total: machine.total(),
            perfects,
            misses,
            max_combo: machine.max_combo(),
            lowest_life,
            lowest_life_time,
            all_100,
            detail: machine.take_detail(),
        }
    }

    /// Best achievable timing per note over a perfect baseline
    pub fn run_abuse(prepared: &PreparedSimulation) -> AbuseResult {
        let mut machine = StateMachine::new(prepared);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        machine.reset(RunMode::Abuse, &mut rng);
        machine.run();
        let baseline = machine.total();
        let data = machine.probe_abuse();
        let total = baseline + data.total_delta().max(0) as u64;
        tracing::info!("Abuse total {} over baseline {}", total, baseline);
        AbuseResult { total, baseline, data }
    }

    /// What-if run: disabled activations, shifted notes, forced misses
    pub fn run_custom(prepared: &PreparedSimulation, custom: &CustomRun) -> CustomResult {
        let mut machine = StateMachine::new(prepared);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        machine.reset(RunMode::Custom(custom.clone()), &mut rng);
        machine.run();
        CustomResult {
            total: machine.total(),
            note_scores: machine.note_scores(),
            detail: machine.take_detail(),
        }
    }
}

fn ms_to_micros(ms: i64) -> Micros {
    ms * 1_000
}

/// Notes per judgement, indexed by severity (PERFECT first)
pub fn judgement_counts(detail: &LiveDetail) -> [usize; 5] {
    let mut counts = [0; 5];
    for note in detail.notes.iter().flatten() {
        counts[note.judgement.severity() as usize] += 1;
    }
    counts
}
