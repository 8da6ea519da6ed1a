use std::collections::HashMap;

use super::aggregate::yearly_series;
use super::category::classify_institute;
use super::confidence::{relative_std_dev, score_confidence};
use super::domain::{Candidate, Confidence, CutoffRecord, PredictionResult, ProgramKey, YearlyCutoff};
use super::probability::admission_probability;
use super::projection::{project_closing_rank, ProjectionConfig};
use super::ranking::rank_candidates;

/// Stateless prediction engine parameterized by the projection tuning. Every
/// method is a pure transformation of its inputs.
pub struct PredictionEngine {
    config: ProjectionConfig,
}

impl Default for PredictionEngine {
    fn default() -> Self {
        Self::new(ProjectionConfig::default())
    }
}

impl PredictionEngine {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    /// Project the next cycle's cutoff from raw history rows and derive
    /// probability and confidence for one program.
    pub fn predict(&self, candidate_rank: u32, history: &[CutoffRecord]) -> PredictionResult {
        let series = yearly_series(history);
        self.predict_from_series(candidate_rank, &series)
    }

    fn predict_from_series(&self, candidate_rank: u32, series: &[YearlyCutoff]) -> PredictionResult {
        if series.is_empty() {
            return PredictionResult {
                projected_rank: None,
                probability: 0.0,
                confidence: Confidence::None,
                message: "no historical cutoff data for this program".to_string(),
            };
        }

        let Some(projected_rank) = project_closing_rank(series, &self.config) else {
            return PredictionResult {
                projected_rank: None,
                probability: 0.0,
                confidence: Confidence::VeryLow,
                message: "historical cutoffs carry no usable weight".to_string(),
            };
        };

        let window = &series[..series.len().min(self.config.window())];
        let points: Vec<u32> = window.iter().map(|entry| entry.closing_rank).collect();
        let probability = admission_probability(candidate_rank, projected_rank);
        let confidence = score_confidence(points.len(), relative_std_dev(&points, projected_rank));

        PredictionResult {
            projected_rank: Some(projected_rank),
            probability,
            confidence,
            message: describe(candidate_rank, projected_rank, probability, points.len()),
        }
    }

    /// Join current-cycle rows with their history, predict per program when a
    /// candidate rank is present, and impose the authoritative order.
    pub fn predict_and_rank(
        &self,
        candidates: Vec<CutoffRecord>,
        history: &HashMap<ProgramKey, Vec<CutoffRecord>>,
        candidate_rank: Option<u32>,
    ) -> Vec<Candidate> {
        let mut entries: Vec<Candidate> = candidates
            .into_iter()
            .map(|record| {
                let category = classify_institute(&record.key.institute);
                let prediction = candidate_rank.map(|rank| {
                    let rows = history.get(&record.key).map(Vec::as_slice).unwrap_or(&[]);
                    self.predict(rank, rows)
                });
                Candidate {
                    record,
                    category,
                    prediction,
                }
            })
            .collect();

        rank_candidates(&mut entries, candidate_rank);
        entries
    }
}

fn describe(candidate_rank: u32, projected_rank: u32, probability: f64, cycles: usize) -> String {
    let relation = if candidate_rank <= projected_rank {
        "within"
    } else if probability >= 0.50 {
        "near"
    } else {
        "outside"
    };
    let suffix = if cycles == 1 { "" } else { "s" };
    format!(
        "rank {candidate_rank} is {relation} the projected cutoff of ~{projected_rank} ({cycles} cycle{suffix} of data)"
    )
}
