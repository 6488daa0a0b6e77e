//! Outcome Simulation
//!
//! Monte Carlo forward simulation of the weekly plans. Every trial starts at
//! the current score and, for each topic allocation of each week, adds
//!
//! ```text
//! hours × 0.5 × (1 + 2 × (1 − mastery)) + (r − 0.5) × 2,   r ~ U[0, 1)
//! ```
//!
//! Trials run in parallel batches. Each trial owns a ChaCha8 generator seeded
//! from `(seed, trial index)`, so the sorted result set depends only on the
//! seed and the inputs, not on thread scheduling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::config::PlannerConfig;
use crate::error::{PlanError, PlanResult};
use crate::sanitize::{safe_ratio, unit_interval};
use crate::types::{FocusArea, Outcome, ProbabilityRange, WeeklyPlan};

const STD_DEV_SCALE: f64 = 10.0;
const RANGE_SCALE: f64 = 50.0;
const SHORT_HORIZON_WEEKS: u32 = 8;
const STRENGTH_MASTERY: f64 = 0.7;
const RISK_GAP: f64 = 0.4;

/// Cooperative cancellation signal, checked between trial batches
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Score change contributed by one topic allocation in one week
pub fn simulate_improvement(mastery: f64, hours: f64, r: f64) -> f64 {
    hours * 0.5 * (1.0 + 2.0 * (1.0 - mastery)) + (r - 0.5) * 2.0
}

/// Per-trial seed
pub fn derive_seed(base_seed: u64, trial: u64) -> u64 {
    splitmix64(base_seed ^ trial.wrapping_mul(0x9E3779B97F4A7C15))
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Linear-interpolated percentile of an ascending slice (0 for empty input)
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = (p.clamp(0.0, 100.0) / 100.0) * (n as f64 - 1.0);
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            if lower == upper {
                sorted[lower]
            } else {
                let w = rank - lower as f64;
                sorted[lower] * (1.0 - w) + sorted[upper] * w
            }
        }
    }
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Plan-level confidence from the outcome spread and its distance to the trajectory end.
///
/// A trajectory ending at or below zero has no meaningful relative distance,
/// so the whole score falls back to 0.
pub fn plan_confidence(range: &ProbabilityRange, final_expected_progress: f64) -> f64 {
    if final_expected_progress <= 0.0 {
        return 0.0;
    }
    let Some(ratio) = safe_ratio(
        (range.median - final_expected_progress).abs(),
        final_expected_progress,
    ) else {
        return 0.0;
    };

    let range_factor = 1.0 - (range.max - range.min) / RANGE_SCALE;
    let distance_factor = 1.0 - ratio;
    unit_interval(0.5 * range_factor + 0.5 * distance_factor)
}

pub struct OutcomeSimulator {
    trials: usize,
    batch_size: usize,
}

impl Default for OutcomeSimulator {
    fn default() -> Self {
        Self::from_config(&PlannerConfig::default())
    }
}

impl OutcomeSimulator {
    pub fn new(trials: usize, batch_size: usize) -> Self {
        Self {
            trials: trials.max(1),
            batch_size: batch_size.max(1),
        }
    }

    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(config.simulation_trials, config.simulation_batch_size)
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Final scores of every trial, ascending
    pub fn run_trials(
        &self,
        weekly_plans: &[WeeklyPlan],
        current_score: f64,
        seed: u64,
        cancel: &CancellationFlag,
    ) -> PlanResult<Vec<f64>> {
        let mut results = Vec::with_capacity(self.trials);
        let mut start = 0;

        while start < self.trials {
            if cancel.is_cancelled() {
                tracing::info!(completed = start, "outcome simulation cancelled");
                return Err(PlanError::Cancelled);
            }
            let end = (start + self.batch_size).min(self.trials);
            let batch: Vec<f64> = (start..end)
                .into_par_iter()
                .map(|trial| {
                    run_trial(weekly_plans, current_score, derive_seed(seed, trial as u64))
                })
                .collect();
            results.extend(batch);
            start = end;
        }

        results.sort_by(|a, b| a.total_cmp(b));
        Ok(results)
    }

    pub fn simulate(
        &self,
        weekly_plans: &[WeeklyPlan],
        focus_areas: &[FocusArea],
        current_score: f64,
        total_weeks: u32,
        seed: u64,
        cancel: &CancellationFlag,
    ) -> PlanResult<Outcome> {
        let results = self.run_trials(weekly_plans, current_score, seed, cancel)?;

        let probability_range = ProbabilityRange {
            min: percentile(&results, 10.0),
            median: percentile(&results, 50.0),
            max: percentile(&results, 90.0),
        };
        let spread = std_dev(&results);
        let confidence = unit_interval(1.0 - spread / STD_DEV_SCALE);

        let strengths = focus_areas
            .iter()
            .filter(|a| a.current_mastery > STRENGTH_MASTERY)
            .map(|a| a.topic_name.clone())
            .collect();

        let mut risks = Vec::new();
        if total_weeks < SHORT_HORIZON_WEEKS {
            risks.push("Limited preparation time".to_string());
        }
        let large_gaps: Vec<&str> = focus_areas
            .iter()
            .filter(|a| a.gap() > RISK_GAP)
            .map(|a| a.topic_name.as_str())
            .collect();
        if !large_gaps.is_empty() {
            risks.push(format!("Large mastery gaps in: {}", large_gaps.join(", ")));
        }

        tracing::debug!(
            trials = results.len(),
            median = probability_range.median,
            std_dev = spread,
            "outcome simulation complete"
        );

        Ok(Outcome {
            predicted_score: probability_range.median,
            confidence,
            probability_range,
            strengths,
            risks,
        })
    }
}

fn run_trial(weekly_plans: &[WeeklyPlan], current_score: f64, seed: u64) -> f64 {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut score = current_score;
    for week in weekly_plans {
        for topic in &week.topics {
            let r: f64 = rng.gen();
            score += simulate_improvement(topic.mastery.current, topic.hours, r);
        }
    }
    score
}
