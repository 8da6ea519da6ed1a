//! Integration specifications for the prediction-and-ranking workflow.
//!
//! Scenarios drive the public service facade and the HTTP router end to end
//! with in-memory storage and cache implementations, so projection,
//! probability, confidence, and ordering are validated together without
//! reaching into private modules.

mod common {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use serde_json::Value;

    use admit_ai::counselling::{
        CacheError, CandidateFilters, CutoffRecord, CutoffRepository, ProgramKey, ProjectionConfig,
        RecommendationService, RepositoryError, ResponseCache,
    };

    pub(super) fn key(institute: &str, program: &str) -> ProgramKey {
        ProgramKey {
            institute: institute.to_string(),
            program: program.to_string(),
            quota: "AI".to_string(),
            seat_type: "OPEN".to_string(),
            gender: "Gender-Neutral".to_string(),
        }
    }

    pub(super) fn row(
        institute: &str,
        program: &str,
        year: u16,
        round: u8,
        closing_rank: Option<u32>,
    ) -> CutoffRecord {
        CutoffRecord {
            key: key(institute, program),
            year,
            round,
            opening_rank: closing_rank.map(|rank| rank / 10 + 1),
            closing_rank,
        }
    }

    /// Cutoff matrix used across scenarios: 2023 round 6 is the current
    /// cycle; earlier years feed the projections.
    pub(super) fn dataset() -> Vec<CutoffRecord> {
        vec![
            row("Indian Institute of Technology Bombay", "Computer Science and Engineering", 2023, 6, Some(67)),
            row("Indian Institute of Technology Bombay", "Computer Science and Engineering", 2022, 6, Some(63)),
            row("Indian Institute of Technology Bombay", "Computer Science and Engineering", 2021, 6, Some(66)),
            row("Indian Institute of Technology Kanpur", "Metallurgical Engineering", 2023, 6, Some(4_000)),
            row("Indian Institute of Technology Kanpur", "Metallurgical Engineering", 2022, 6, Some(4_500)),
            row("Indian Institute of Technology Kanpur", "Metallurgical Engineering", 2021, 6, Some(5_200)),
            row("National Institute of Technology Tiruchirappalli", "Computer Science and Engineering", 2023, 6, Some(3_000)),
            row("National Institute of Technology Tiruchirappalli", "Computer Science and Engineering", 2022, 6, Some(2_900)),
            row("National Institute of Technology Warangal", "Computer Science and Engineering", 2023, 6, Some(3_500)),
            row("National Institute of Technology Warangal", "Computer Science and Engineering", 2022, 6, Some(3_400)),
            row("National Institute of Technology Agartala", "Civil Engineering", 2023, 6, Some(20_000)),
            row("Punjab Engineering College", "Computer Science and Engineering", 2023, 6, None),
        ]
    }

    #[derive(Default)]
    pub(super) struct MemoryRepository {
        records: Vec<CutoffRecord>,
        candidate_calls: AtomicUsize,
    }

    impl MemoryRepository {
        pub(super) fn new(records: Vec<CutoffRecord>) -> Self {
            Self {
                records,
                candidate_calls: AtomicUsize::new(0),
            }
        }

        pub(super) fn candidate_calls(&self) -> usize {
            self.candidate_calls.load(Ordering::Relaxed)
        }
    }

    fn matches(filters: &CandidateFilters, record: &CutoffRecord) -> bool {
        let contains = |needle: &Option<String>, hay: &str| {
            needle
                .as_deref()
                .map_or(true, |n| hay.to_lowercase().contains(&n.to_lowercase()))
        };
        let equals = |needle: &Option<String>, hay: &str| {
            needle.as_deref().map_or(true, |n| hay.eq_ignore_ascii_case(n))
        };
        contains(&filters.institute, &record.key.institute)
            && contains(&filters.program, &record.key.program)
            && equals(&filters.quota, &record.key.quota)
            && equals(&filters.seat_type, &record.key.seat_type)
            && equals(&filters.gender, &record.key.gender)
    }

    impl CutoffRepository for MemoryRepository {
        fn fetch_candidates(
            &self,
            filters: &CandidateFilters,
            year: u16,
            round: u8,
            candidate_rank: Option<u32>,
            limit: usize,
        ) -> Result<Vec<CutoffRecord>, RepositoryError> {
            self.candidate_calls.fetch_add(1, Ordering::Relaxed);
            let mut rows: Vec<CutoffRecord> = self
                .records
                .iter()
                .filter(|record| record.year == year && record.round == round)
                .filter(|record| matches(filters, record))
                .cloned()
                .collect();
            if let Some(rank) = candidate_rank {
                rows.sort_by_key(|record| {
                    record.closing_rank.map_or(u32::MAX, |closing| closing.abs_diff(rank))
                });
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

    #[derive(Default)]
    pub(super) struct MemoryCache {
        entries: Mutex<HashMap<String, Value>>,
    }

    impl ResponseCache for MemoryCache {
        fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
            Ok(self.entries.lock().expect("cache lock").get(key).cloned())
        }

        fn set(&self, key: &str, value: Value, _ttl: Duration) -> Result<(), CacheError> {
            self.entries
                .lock()
                .expect("cache lock")
                .insert(key.to_string(), value);
            Ok(())
        }
    }

    /// Cache stub whose every operation fails, to exercise fail-open reads
    /// and writes.
    #[derive(Default)]
    pub(super) struct OfflineCache;

    impl ResponseCache for OfflineCache {
        fn get(&self, _key: &str) -> Result<Option<Value>, CacheError> {
            Err(CacheError::Transport("cache offline".to_string()))
        }

        fn set(&self, _key: &str, _value: Value, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Transport("cache offline".to_string()))
        }
    }

    pub(super) fn build_service<C>(
        cache: Arc<C>,
    ) -> (
        Arc<RecommendationService<MemoryRepository, C>>,
        Arc<MemoryRepository>,
    )
    where
        C: ResponseCache + 'static,
    {
        let repository = Arc::new(MemoryRepository::new(dataset()));
        let service = Arc::new(RecommendationService::new(
            repository.clone(),
            cache,
            ProjectionConfig::default(),
            Duration::from_secs(600),
            500,
        ));
        (service, repository)
    }
}

mod prediction {
    use std::sync::Arc;

    use super::common::*;
    use admit_ai::counselling::{Candidate, Confidence, RecommendationQuery};

    fn entry_for<'a>(entries: &'a [Candidate], institute: &str) -> &'a Candidate {
        entries
            .iter()
            .find(|entry| entry.record.key.institute == institute)
            .unwrap_or_else(|| panic!("{institute} missing from shortlist"))
    }

    #[test]
    fn tightening_history_projects_below_the_weighted_mean() {
        let (service, _) = build_service(Arc::new(MemoryCache::default()));
        let query = RecommendationQuery {
            candidate_rank: Some(5_000),
            ..Default::default()
        };
        let shortlist = service.recommend(&query).expect("shortlist builds");

        let kanpur = entry_for(&shortlist.entries, "Indian Institute of Technology Kanpur");
        let prediction = kanpur.prediction.as_ref().expect("prediction attached");
        assert_eq!(prediction.projected_rank, Some(4_246));
        assert!((prediction.probability - 0.442).abs() < 5e-4);
        assert_eq!(prediction.confidence, Confidence::High);
    }

    #[test]
    fn single_history_point_far_from_rank_hits_the_floor() {
        let (service, _) = build_service(Arc::new(MemoryCache::default()));
        let query = RecommendationQuery {
            candidate_rank: Some(100_000),
            ..Default::default()
        };
        let shortlist = service.recommend(&query).expect("shortlist builds");

        let agartala = entry_for(&shortlist.entries, "National Institute of Technology Agartala");
        let prediction = agartala.prediction.as_ref().expect("prediction attached");
        assert_eq!(prediction.projected_rank, Some(20_000));
        assert_eq!(prediction.probability, 0.01);
        assert_eq!(prediction.confidence, Confidence::VeryLow);
    }

    #[test]
    fn program_with_no_usable_history_gets_a_defined_empty_prediction() {
        let (service, _) = build_service(Arc::new(MemoryCache::default()));
        let query = RecommendationQuery {
            candidate_rank: Some(5_000),
            ..Default::default()
        };
        let shortlist = service.recommend(&query).expect("shortlist builds");

        let pec = entry_for(&shortlist.entries, "Punjab Engineering College");
        let prediction = pec.prediction.as_ref().expect("prediction attached");
        assert_eq!(prediction.projected_rank, None);
        assert_eq!(prediction.probability, 0.0);
        assert_eq!(prediction.confidence, Confidence::None);
    }

    #[test]
    fn rank_within_recent_cutoffs_is_near_certain() {
        let (service, _) = build_service(Arc::new(MemoryCache::default()));
        let query = RecommendationQuery {
            candidate_rank: Some(2_500),
            ..Default::default()
        };
        let shortlist = service.recommend(&query).expect("shortlist builds");

        let trichy = entry_for(
            &shortlist.entries,
            "National Institute of Technology Tiruchirappalli",
        );
        let prediction = trichy.prediction.as_ref().expect("prediction attached");
        assert_eq!(prediction.probability, 0.98);
    }
}

mod ordering {
    use std::sync::Arc;

    use super::common::*;
    use admit_ai::counselling::RecommendationQuery;

    #[test]
    fn achievable_group_leads_and_tighter_closing_lists_first_within_a_tier() {
        // Rank 4000 carries a 1000 offset, so the anchor is 3000. Achievable:
        // Kanpur (4000), both NIT CSE rows, Agartala. Aspirational: Bombay
        // (closing 67) and the PEC row with no closing rank.
        let (service, _) = build_service(Arc::new(MemoryCache::default()));
        let query = RecommendationQuery {
            candidate_rank: Some(4_000),
            ..Default::default()
        };
        let shortlist = service.recommend(&query).expect("shortlist builds");

        let institutes: Vec<&str> = shortlist
            .entries
            .iter()
            .map(|entry| entry.record.key.institute.as_str())
            .collect();

        assert_eq!(
            institutes,
            vec![
                "Indian Institute of Technology Kanpur",
                "National Institute of Technology Tiruchirappalli",
                "National Institute of Technology Warangal",
                "National Institute of Technology Agartala",
                "Indian Institute of Technology Bombay",
                "Punjab Engineering College",
            ]
        );
    }

    #[test]
    fn rankless_queries_order_by_category_and_name_without_predictions() {
        let (service, _) = build_service(Arc::new(MemoryCache::default()));
        let shortlist = service
            .recommend(&RecommendationQuery::default())
            .expect("shortlist builds");

        assert!(shortlist
            .entries
            .iter()
            .all(|entry| entry.prediction.is_none()));
        assert_eq!(
            shortlist.entries[0].record.key.institute,
            "Indian Institute of Technology Bombay"
        );
        let precedences: Vec<u8> = shortlist
            .entries
            .iter()
            .map(|entry| entry.category.precedence())
            .collect();
        let mut sorted = precedences.clone();
        sorted.sort_unstable();
        assert_eq!(precedences, sorted);
    }

    #[test]
    fn cycle_defaults_to_the_latest_year_and_round() {
        let (service, _) = build_service(Arc::new(MemoryCache::default()));
        let shortlist = service
            .recommend(&RecommendationQuery::default())
            .expect("shortlist builds");
        assert_eq!(shortlist.year, 2023);
        assert_eq!(shortlist.round, 6);
    }
}

mod caching {
    use std::sync::Arc;

    use super::common::*;
    use admit_ai::counselling::{RecommendationError, RecommendationQuery};

    #[test]
    fn identical_queries_are_served_from_cache() {
        let (service, repository) = build_service(Arc::new(MemoryCache::default()));
        let query = RecommendationQuery {
            candidate_rank: Some(4_000),
            ..Default::default()
        };

        let first = service.recommend(&query).expect("first computation");
        let second = service.recommend(&query).expect("cache hit");

        assert_eq!(repository.candidate_calls(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn cache_failures_degrade_to_recompute() {
        let (service, repository) = build_service(Arc::new(OfflineCache));
        let query = RecommendationQuery {
            candidate_rank: Some(4_000),
            ..Default::default()
        };

        let first = service.recommend(&query).expect("first computation");
        let second = service.recommend(&query).expect("second computation");

        assert_eq!(repository.candidate_calls(), 2);
        assert_eq!(first.entries, second.entries);
    }

    #[test]
    fn zero_rank_is_rejected_before_any_fetch() {
        let (service, repository) = build_service(Arc::new(MemoryCache::default()));
        let query = RecommendationQuery {
            candidate_rank: Some(0),
            ..Default::default()
        };

        let err = service.recommend(&query).expect_err("zero rank rejected");
        assert!(matches!(err, RecommendationError::InvalidRank));
        assert_eq!(repository.candidate_calls(), 0);
    }
}

mod routing {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::common::*;
    use admit_ai::counselling::prediction_router;

    fn build_router() -> axum::Router {
        let (service, _) = build_service(Arc::new(MemoryCache::default()));
        prediction_router(service)
    }

    async fn dispatch(router: axum::Router, payload: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/predictions")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request");

        let response = router.oneshot(request).await.expect("router dispatch");
        let status = response.status();
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let value: Value = serde_json::from_slice(&body).expect("json body");
        (status, value)
    }

    #[tokio::test]
    async fn post_predictions_returns_a_ranked_shortlist() {
        let (status, body) = dispatch(build_router(), json!({ "rank": 4000 })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("year").and_then(Value::as_u64), Some(2023));
        assert_eq!(body.get("candidate_rank").and_then(Value::as_u64), Some(4000));
        let entries = body
            .get("entries")
            .and_then(Value::as_array)
            .expect("entries array");
        assert!(!entries.is_empty());
        let first = &entries[0];
        assert!(first.get("prediction").is_some());
        assert_eq!(
            first
                .pointer("/record/key/institute")
                .and_then(Value::as_str),
            Some("Indian Institute of Technology Kanpur"),
        );
    }

    #[tokio::test]
    async fn zero_rank_is_rejected_with_422() {
        let (status, body) = dispatch(build_router(), json!({ "rank": 0 })).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .contains("positive"));
    }

    #[tokio::test]
    async fn rankless_request_omits_predictions() {
        let (status, body) = dispatch(build_router(), json!({})).await;

        assert_eq!(status, StatusCode::OK);
        let entries = body
            .get("entries")
            .and_then(Value::as_array)
            .expect("entries array");
        assert!(entries
            .iter()
            .all(|entry| entry.get("prediction").is_none()));
    }
}
