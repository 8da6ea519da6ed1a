use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::{CutoffRecord, ProgramKey};

/// Optional filters applied while assembling the current-cycle candidate set.
/// Institute and program match by substring, the rest by equality; all are
/// case-insensitive at the storage implementation's discretion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFilters {
    pub institute: Option<String>,
    pub program: Option<String>,
    pub quota: Option<String>,
    pub seat_type: Option<String>,
    pub gender: Option<String>,
    pub institute_category: Option<String>,
}

/// Storage abstraction over the cutoff matrix. Any ordering applied by an
/// implementation is only a bound on the candidate set; the authoritative
/// display order is always re-established in memory by the ranker.
pub trait CutoffRepository: Send + Sync {
    /// Rows matching the filters for one (year, round) cycle, bounded by
    /// `limit`. When a candidate rank is given, implementations should prefer
    /// rows whose closing rank is near it.
    fn fetch_candidates(
        &self,
        filters: &CandidateFilters,
        year: u16,
        round: u8,
        candidate_rank: Option<u32>,
        limit: usize,
    ) -> Result<Vec<CutoffRecord>, RepositoryError>;

    /// Every historical row (all years and rounds) for the given program
    /// identities, batched in one call.
    fn fetch_history(&self, keys: &[ProgramKey]) -> Result<Vec<CutoffRecord>, RepositoryError>;

    fn max_year(&self) -> Result<Option<u16>, RepositoryError>;

    fn max_round(&self, year: u16) -> Result<Option<u8>, RepositoryError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("no cutoff data available")]
    Empty,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Best-effort response cache. Both operations are fire-and-forget safe:
/// the caller logs failures and treats them as a miss or no-op.
pub trait ResponseCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;
    fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError>;
}

/// Cache transport error.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Transport(String),
}
