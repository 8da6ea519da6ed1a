use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use admit_ai::counselling::{
    classify_institute, CacheError, CandidateFilters, CutoffCsvImporter, CutoffRecord,
    CutoffRepository, ProgramKey, RepositoryError, ResponseCache,
};
use admit_ai::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Cutoff matrix held fully in memory. The SQL-backed deployment applies the
/// same contract: its ORDER BY is only a pre-filter bound, never the
/// authoritative order.
pub(crate) struct InMemoryCutoffRepository {
    records: Vec<CutoffRecord>,
}

impl InMemoryCutoffRepository {
    pub(crate) fn new(records: Vec<CutoffRecord>) -> Self {
        Self { records }
    }
}

fn matches(filters: &CandidateFilters, record: &CutoffRecord) -> bool {
    let contains = |needle: &Option<String>, hay: &str| {
        needle
            .as_deref()
            .map_or(true, |n| hay.to_lowercase().contains(&n.trim().to_lowercase()))
    };
    let equals = |needle: &Option<String>, hay: &str| {
        needle
            .as_deref()
            .map_or(true, |n| hay.eq_ignore_ascii_case(n.trim()))
    };

    contains(&filters.institute, &record.key.institute)
        && contains(&filters.program, &record.key.program)
        && equals(&filters.quota, &record.key.quota)
        && equals(&filters.seat_type, &record.key.seat_type)
        && equals(&filters.gender, &record.key.gender)
        && equals(
            &filters.institute_category,
            classify_institute(&record.key.institute).label(),
        )
}

impl CutoffRepository for InMemoryCutoffRepository {
    fn fetch_candidates(
        &self,
        filters: &CandidateFilters,
        year: u16,
        round: u8,
        candidate_rank: Option<u32>,
        limit: usize,
    ) -> Result<Vec<CutoffRecord>, RepositoryError> {
        let mut rows: Vec<CutoffRecord> = self
            .records
            .iter()
            .filter(|record| record.year == year && record.round == round)
            .filter(|record| matches(filters, record))
            .cloned()
            .collect();

        match candidate_rank {
            Some(rank) => rows.sort_by_key(|record| {
                record
                    .closing_rank
                    .map_or(u32::MAX, |closing| closing.abs_diff(rank))
            }),
            None => rows.sort_by(|a, b| {
                a.key
                    .institute
                    .cmp(&b.key.institute)
                    .then_with(|| a.key.program.cmp(&b.key.program))
            }),
        }
        rows.truncate(limit);
        Ok(rows)
    }

    fn fetch_history(&self, keys: &[ProgramKey]) -> Result<Vec<CutoffRecord>, RepositoryError> {
        Ok(self
            .records
            .iter()
            .filter(|record| keys.contains(&record.key))
            .cloned()
            .collect())
    }

    fn max_year(&self) -> Result<Option<u16>, RepositoryError> {
        Ok(self.records.iter().map(|record| record.year).max())
    }

    fn max_round(&self, year: u16) -> Result<Option<u8>, RepositoryError> {
        Ok(self
            .records
            .iter()
            .filter(|record| record.year == year)
            .map(|record| record.round)
            .max())
    }
}

struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// TTL cache over a mutex-guarded map. Entries are immutable once written
/// and expire on read; concurrent writers of the same key simply overwrite
/// each other with identical values.
#[derive(Default)]
pub(crate) struct InMemoryResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache for InMemoryResponseCache {
    fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| CacheError::Transport("cache mutex poisoned".to_string()))?;

        match guard.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                guard.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| CacheError::Transport("cache mutex poisoned".to_string()))?;

        guard.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }
}

/// Load the cutoff matrix from a CSV export, or fall back to the bundled
/// sample so `serve` and `predict` work out of the box.
pub(crate) fn load_records(data: Option<&Path>) -> Result<Vec<CutoffRecord>, AppError> {
    match data {
        Some(path) => Ok(CutoffCsvImporter::from_path(path)?),
        None => Ok(sample_records()),
    }
}

fn sample_row(
    institute: &str,
    program: &str,
    year: u16,
    round: u8,
    opening_rank: u32,
    closing_rank: u32,
) -> CutoffRecord {
    CutoffRecord {
        key: ProgramKey {
            institute: institute.to_string(),
            program: program.to_string(),
            quota: "AI".to_string(),
            seat_type: "OPEN".to_string(),
            gender: "Gender-Neutral".to_string(),
        },
        year,
        round,
        opening_rank: Some(opening_rank),
        closing_rank: Some(closing_rank),
    }
}

/// Small slice of a real counselling season, enough to exercise every tier.
pub(crate) fn sample_records() -> Vec<CutoffRecord> {
    vec![
        sample_row("Indian Institute of Technology Bombay", "Computer Science and Engineering", 2023, 6, 1, 67),
        sample_row("Indian Institute of Technology Bombay", "Computer Science and Engineering", 2022, 6, 1, 63),
        sample_row("Indian Institute of Technology Bombay", "Computer Science and Engineering", 2021, 6, 2, 66),
        sample_row("Indian Institute of Technology Delhi", "Electrical Engineering", 2023, 6, 104, 575),
        sample_row("Indian Institute of Technology Delhi", "Electrical Engineering", 2022, 6, 98, 540),
        sample_row("Indian Institute of Technology Delhi", "Electrical Engineering", 2021, 6, 113, 610),
        sample_row("Indian Institute of Technology Kanpur", "Metallurgical Engineering", 2023, 6, 2_410, 4_000),
        sample_row("Indian Institute of Technology Kanpur", "Metallurgical Engineering", 2022, 6, 2_650, 4_500),
        sample_row("Indian Institute of Technology Kanpur", "Metallurgical Engineering", 2021, 6, 2_980, 5_200),
        sample_row("National Institute of Technology Tiruchirappalli", "Computer Science and Engineering", 2023, 6, 410, 3_000),
        sample_row("National Institute of Technology Tiruchirappalli", "Computer Science and Engineering", 2022, 6, 395, 2_900),
        sample_row("National Institute of Technology Tiruchirappalli", "Computer Science and Engineering", 2021, 6, 430, 3_100),
        sample_row("National Institute of Technology Warangal", "Computer Science and Engineering", 2023, 6, 620, 3_500),
        sample_row("National Institute of Technology Warangal", "Computer Science and Engineering", 2022, 6, 600, 3_400),
        sample_row("Indian Institute of Information Technology Allahabad", "Information Technology", 2023, 6, 1_800, 4_600),
        sample_row("Indian Institute of Information Technology Allahabad", "Information Technology", 2022, 6, 1_750, 4_400),
        sample_row("Birla Institute of Technology Mesra", "Computer Science and Engineering", 2023, 6, 6_500, 11_000),
        sample_row("Birla Institute of Technology Mesra", "Computer Science and Engineering", 2022, 6, 6_100, 10_400),
    ]
}
