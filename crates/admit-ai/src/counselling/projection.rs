use serde::{Deserialize, Serialize};

use super::domain::YearlyCutoff;

/// Tunable knobs for the trend projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Recency weights, newest year first. The window size is the table length.
    pub recency_weights: Vec<f64>,
    /// Weight applied to any entry past the table.
    pub overflow_weight: f64,
    /// Minimum |relative change| between the two latest years before the
    /// momentum term engages.
    pub momentum_trigger: f64,
    /// Fraction of the observed relative change carried into the adjustment.
    pub momentum_damping: f64,
    /// Bound on the adjustment as a fraction of the base projection.
    pub momentum_cap: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            recency_weights: vec![1.0, 0.85, 0.7, 0.55, 0.4],
            overflow_weight: 0.3,
            momentum_trigger: 0.03,
            momentum_damping: 0.5,
            momentum_cap: 0.10,
        }
    }
}

impl ProjectionConfig {
    pub fn window(&self) -> usize {
        self.recency_weights.len()
    }

    fn weight(&self, index: usize) -> f64 {
        self.recency_weights
            .get(index)
            .copied()
            .unwrap_or(self.overflow_weight)
    }
}

/// Project the next cycle's closing rank from a year-descending series.
///
/// Recency-weighted mean over the most recent window, then a momentum nudge:
/// a sharp move between the two latest years shifts the projection by half
/// the relative change, clamped to ±`momentum_cap` of the base. Returns
/// `None` when the series carries no usable weight.
pub fn project_closing_rank(series: &[YearlyCutoff], config: &ProjectionConfig) -> Option<u32> {
    let window = &series[..series.len().min(config.window())];

    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    for (index, entry) in window.iter().enumerate() {
        let weight = config.weight(index);
        weighted_sum += weight * f64::from(entry.closing_rank);
        total_weight += weight;
    }
    if total_weight <= 0.0 {
        return None;
    }

    let base = weighted_sum / total_weight;
    let adjusted = base + momentum_adjustment(window, base, config).unwrap_or(0.0);

    Some(adjusted.max(1.0).round() as u32)
}

fn momentum_adjustment(
    window: &[YearlyCutoff],
    base: f64,
    config: &ProjectionConfig,
) -> Option<f64> {
    let latest = f64::from(window.first()?.closing_rank);
    let previous = f64::from(window.get(1)?.closing_rank);
    if previous <= 0.0 {
        return None;
    }

    let relative_change = (latest - previous) / previous;
    if relative_change.abs() <= config.momentum_trigger {
        return None;
    }

    let damped = relative_change * config.momentum_damping;
    // A tightening trend (latest below previous) pulls the projection down,
    // a loosening one pushes it up; either way at most `momentum_cap`.
    let bounded = if latest < previous {
        damped.max(-config.momentum_cap)
    } else {
        damped.min(config.momentum_cap)
    };

    Some(base * bounded)
}
