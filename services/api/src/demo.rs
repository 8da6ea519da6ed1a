use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use admit_ai::counselling::{
    CandidateFilters, ProjectionConfig, RecommendationQuery, RecommendationService,
};
use admit_ai::error::AppError;
use chrono::Local;
use clap::Args;

use crate::infra::{load_records, InMemoryCutoffRepository, InMemoryResponseCache};

#[derive(Args, Debug, Default)]
pub(crate) struct PredictArgs {
    /// Candidate rank; omit for a name-ordered catalogue without probabilities
    #[arg(long)]
    pub(crate) rank: Option<u32>,
    /// Admission year (defaults to the latest in the data)
    #[arg(long)]
    pub(crate) year: Option<u16>,
    /// Counselling round (defaults to the latest for the year)
    #[arg(long)]
    pub(crate) round: Option<u8>,
    /// Institute name filter (substring match)
    #[arg(long)]
    pub(crate) institute: Option<String>,
    /// Program name filter (substring match)
    #[arg(long)]
    pub(crate) program: Option<String>,
    /// Quota filter (exact match)
    #[arg(long)]
    pub(crate) quota: Option<String>,
    /// Seat type filter (exact match)
    #[arg(long)]
    pub(crate) seat_type: Option<String>,
    /// Gender pool filter (exact match)
    #[arg(long)]
    pub(crate) gender: Option<String>,
    /// Institute tier filter (IIT, NIT, IIIT, GFTI)
    #[arg(long)]
    pub(crate) category: Option<String>,
    /// Maximum number of rows to display
    #[arg(long, default_value_t = 25)]
    pub(crate) limit: usize,
    /// Cutoff matrix CSV to load; falls back to the bundled sample data
    #[arg(long)]
    pub(crate) data: Option<PathBuf>,
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let PredictArgs {
        rank,
        year,
        round,
        institute,
        program,
        quota,
        seat_type,
        gender,
        category,
        limit,
        data,
    } = args;

    let records = load_records(data.as_deref())?;
    let repository = Arc::new(InMemoryCutoffRepository::new(records));
    let cache = Arc::new(InMemoryResponseCache::default());
    let service = RecommendationService::new(
        repository,
        cache,
        ProjectionConfig::default(),
        Duration::from_secs(0),
        limit.max(1),
    );

    let query = RecommendationQuery {
        candidate_rank: rank,
        year,
        round,
        limit: Some(limit.max(1)),
        filters: CandidateFilters {
            institute,
            program,
            quota,
            seat_type,
            gender,
            institute_category: category,
        },
    };

    let shortlist = service.recommend(&query)?;

    println!(
        "Admission shortlist ({})",
        Local::now().date_naive()
    );
    match shortlist.candidate_rank {
        Some(rank) => println!("Candidate rank {rank}, cycle {} round {}", shortlist.year, shortlist.round),
        None => println!(
            "No candidate rank supplied; cycle {} round {} listed by institute tier",
            shortlist.year, shortlist.round
        ),
    }
    println!();
    println!(
        "{:<42} {:<34} {:>7} {:>9} {:>6}  {:<5} {}",
        "Institute", "Program", "Close", "Projected", "Prob", "Tier", "Confidence"
    );

    for entry in &shortlist.entries {
        let closing = entry
            .record
            .closing_rank
            .map(|closing| closing.to_string())
            .unwrap_or_else(|| "-".to_string());
        let (projected, probability, confidence) = match &entry.prediction {
            Some(prediction) => (
                prediction
                    .projected_rank
                    .map(|rank| rank.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                format!("{:.3}", prediction.probability),
                prediction.confidence.label(),
            ),
            None => ("-".to_string(), "-".to_string(), "-"),
        };

        println!(
            "{:<42} {:<34} {:>7} {:>9} {:>6}  {:<5} {}",
            clip(&entry.record.key.institute, 42),
            clip(&entry.record.key.program, 34),
            closing,
            projected,
            probability,
            entry.category.label(),
            confidence,
        );
    }

    if shortlist.entries.is_empty() {
        println!("No programs matched the requested cycle and filters.");
    }

    Ok(())
}

fn clip(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let truncated: String = value.chars().take(width.saturating_sub(1)).collect();
    format!("{truncated}\u{2026}")
}
