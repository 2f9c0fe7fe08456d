//! Score distribution summaries over repeated trials

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Percentiles reported by default
pub const DEFAULT_PERCENTILES: [f64; 5] = [5.0, 25.0, 50.0, 75.0, 95.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreStatistics {
    pub trials: usize,
    pub mean: f64,
    pub min: u64,
    pub max: u64,
    pub stddev: f64,
    /// (percentile, score) pairs
    pub percentiles: Vec<(f64, f64)>,
}

impl ScoreStatistics {
    /// Summarise trial scores; `None` when there are no trials
    pub fn from_scores(scores: &[u64]) -> Option<Self> {
        Self::with_percentiles(scores, &DEFAULT_PERCENTILES)
    }

    pub fn with_percentiles(scores: &[u64], percentiles: &[f64]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        let n = scores.len() as f64;
        let mean = scores.iter().map(|&s| s as f64).sum::<f64>() / n;
        let variance = scores.iter().map(|&s| (s as f64 - mean).powi(2)).sum::<f64>() / n;

        let mut sorted: Vec<OrderedFloat<f64>> = scores.iter().map(|&s| OrderedFloat(s as f64)).collect();
        sorted.sort_unstable();

        Some(Self {
            trials: scores.len(),
            mean,
            min: scores.iter().copied().min().unwrap_or(0),
            max: scores.iter().copied().max().unwrap_or(0),
            stddev: variance.sqrt(),
            percentiles: percentiles.iter().map(|&p| (p, percentile(&sorted, p))).collect(),
        })
    }

    pub fn percentile(&self, p: f64) -> Option<f64> {
        self.percentiles
            .iter()
            .find(|(q, _)| OrderedFloat(*q) == OrderedFloat(p))
            .map(|(_, v)| *v)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} trials: mean {:.0}, min {}, max {}, stddev {:.1}",
            self.trials, self.mean, self.min, self.max, self.stddev
        )
    }
}

/// Linear interpolation between closest ranks
fn percentile(sorted: &[OrderedFloat<f64>], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    sorted[lower].0 + (sorted[upper].0 - sorted[lower].0) * fraction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_none() {
        assert!(ScoreStatistics::from_scores(&[]).is_none());
    }

    #[test]
    fn test_basic_statistics() {
        let stats = ScoreStatistics::from_scores(&[100, 200, 300, 400, 500]).unwrap();
        assert_eq!(stats.mean, 300.0);
        assert_eq!(stats.min, 100);
        assert_eq!(stats.max, 500);
        assert_eq!(stats.percentile(50.0), Some(300.0));
        assert_eq!(stats.percentile(25.0), Some(200.0));
    }

    #[test]
    fn test_single_trial() {
        let stats = ScoreStatistics::from_scores(&[42]).unwrap();
        assert_eq!(stats.stddev, 0.0);
        assert_eq!(stats.percentile(95.0), Some(42.0));
    }
}
