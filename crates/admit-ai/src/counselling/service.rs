use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use super::domain::{CutoffRecord, ProgramKey, RankedShortlist};
use super::engine::PredictionEngine;
use super::projection::ProjectionConfig;
use super::repository::{CandidateFilters, CutoffRepository, RepositoryError, ResponseCache};

/// Versioned key prefix so stale entries die with response-format changes.
const CACHE_KEY_VERSION: &str = "shortlist-v2";

/// Query accepted by the recommendation facade. An unset cycle defaults to
/// the latest (year, round) the repository has seen.
#[derive(Debug, Clone, Default)]
pub struct RecommendationQuery {
    pub candidate_rank: Option<u32>,
    pub year: Option<u16>,
    pub round: Option<u8>,
    pub filters: CandidateFilters,
    pub limit: Option<usize>,
}

/// Service composing the storage boundary, the response cache, and the
/// prediction engine. The cache is strictly fail-open: a read or write
/// failure degrades to recomputing, never to a wrong answer.
pub struct RecommendationService<R, C> {
    repository: Arc<R>,
    cache: Arc<C>,
    engine: PredictionEngine,
    cache_ttl: Duration,
    default_limit: usize,
}

impl<R, C> RecommendationService<R, C>
where
    R: CutoffRepository + 'static,
    C: ResponseCache + 'static,
{
    pub fn new(
        repository: Arc<R>,
        cache: Arc<C>,
        config: ProjectionConfig,
        cache_ttl: Duration,
        default_limit: usize,
    ) -> Self {
        Self {
            repository,
            cache,
            engine: PredictionEngine::new(config),
            cache_ttl,
            default_limit,
        }
    }

    /// Produce the ranked shortlist for one query.
    pub fn recommend(
        &self,
        query: &RecommendationQuery,
    ) -> Result<RankedShortlist, RecommendationError> {
        if query.candidate_rank == Some(0) {
            return Err(RecommendationError::InvalidRank);
        }

        let year = match query.year {
            Some(year) => year,
            None => self.repository.max_year()?.ok_or(RepositoryError::Empty)?,
        };
        let round = match query.round {
            Some(round) => round,
            None => self
                .repository
                .max_round(year)?
                .ok_or(RepositoryError::Empty)?,
        };
        let limit = query.limit.unwrap_or(self.default_limit);

        let key = cache_key(&query.filters, year, round, query.candidate_rank, limit);
        if let Some(cached) = self.cache_lookup(&key) {
            debug!(%key, "serving shortlist from cache");
            return Ok(cached);
        }

        let candidates = self.repository.fetch_candidates(
            &query.filters,
            year,
            round,
            query.candidate_rank,
            limit,
        )?;
        let keys = distinct_keys(&candidates);
        let history = group_by_key(self.repository.fetch_history(&keys)?);
        let entries = self
            .engine
            .predict_and_rank(candidates, &history, query.candidate_rank);

        let shortlist = RankedShortlist {
            year,
            round,
            candidate_rank: query.candidate_rank,
            generated_at: Utc::now(),
            entries,
        };
        self.cache_store(&key, &shortlist);
        Ok(shortlist)
    }

    fn cache_lookup(&self, key: &str) -> Option<RankedShortlist> {
        match self.cache.get(key) {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(shortlist) => Some(shortlist),
                Err(err) => {
                    warn!(%key, %err, "discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!(%key, %err, "cache read failed, recomputing");
                None
            }
        }
    }

    fn cache_store(&self, key: &str, shortlist: &RankedShortlist) {
        match serde_json::to_value(shortlist) {
            Ok(value) => {
                if let Err(err) = self.cache.set(key, value, self.cache_ttl) {
                    warn!(%key, %err, "cache write failed, response served uncached");
                }
            }
            Err(err) => warn!(%key, %err, "shortlist not serializable for cache"),
        }
    }
}

/// Deterministic key over the version tag, resolved cycle, normalized filter
/// set, rank, and limit. Concurrent identical requests may race to recompute
/// the same key; last write wins and the value is identical.
fn cache_key(
    filters: &CandidateFilters,
    year: u16,
    round: u8,
    candidate_rank: Option<u32>,
    limit: usize,
) -> String {
    let norm = |field: &Option<String>| {
        field
            .as_deref()
            .map(|value| value.trim().to_lowercase())
            .unwrap_or_default()
    };
    let rank = candidate_rank.map(|rank| rank.to_string()).unwrap_or_default();
    format!(
        "{CACHE_KEY_VERSION}:{year}:{round}:{rank}:{}:{}:{}:{}:{}:{}:{limit}",
        norm(&filters.institute),
        norm(&filters.program),
        norm(&filters.quota),
        norm(&filters.seat_type),
        norm(&filters.gender),
        norm(&filters.institute_category),
    )
}

fn distinct_keys(records: &[CutoffRecord]) -> Vec<ProgramKey> {
    let mut seen: HashSet<&ProgramKey> = HashSet::new();
    let mut keys = Vec::new();
    for record in records {
        if seen.insert(&record.key) {
            keys.push(record.key.clone());
        }
    }
    keys
}

fn group_by_key(rows: Vec<CutoffRecord>) -> HashMap<ProgramKey, Vec<CutoffRecord>> {
    let mut grouped: HashMap<ProgramKey, Vec<CutoffRecord>> = HashMap::new();
    for row in rows {
        grouped.entry(row.key.clone()).or_default().push(row);
    }
    grouped
}

/// Error raised by the recommendation facade.
#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error("candidate rank must be a positive integer")]
    InvalidRank,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
