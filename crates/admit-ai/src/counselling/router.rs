use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::repository::{CandidateFilters, CutoffRepository, RepositoryError, ResponseCache};
use super::service::{RecommendationError, RecommendationQuery, RecommendationService};

/// Router builder exposing the prediction endpoint.
pub fn prediction_router<R, C>(service: Arc<RecommendationService<R, C>>) -> Router
where
    R: CutoffRepository + 'static,
    C: ResponseCache + 'static,
{
    Router::new()
        .route("/api/v1/predictions", post(predict_handler::<R, C>))
        .with_state(service)
}

/// Wire shape of a prediction request. Every field is optional; an absent
/// cycle resolves to the latest one and an absent rank yields a name-ordered
/// shortlist without probabilities.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PredictionRequest {
    #[serde(default)]
    pub(crate) rank: Option<u32>,
    #[serde(default)]
    pub(crate) year: Option<u16>,
    #[serde(default)]
    pub(crate) round: Option<u8>,
    #[serde(default)]
    pub(crate) institute: Option<String>,
    #[serde(default)]
    pub(crate) program: Option<String>,
    #[serde(default)]
    pub(crate) quota: Option<String>,
    #[serde(default)]
    pub(crate) seat_type: Option<String>,
    #[serde(default)]
    pub(crate) gender: Option<String>,
    #[serde(default)]
    pub(crate) institute_category: Option<String>,
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

impl PredictionRequest {
    fn into_query(self) -> RecommendationQuery {
        RecommendationQuery {
            candidate_rank: self.rank,
            year: self.year,
            round: self.round,
            limit: self.limit,
            filters: CandidateFilters {
                institute: self.institute,
                program: self.program,
                quota: self.quota,
                seat_type: self.seat_type,
                gender: self.gender,
                institute_category: self.institute_category,
            },
        }
    }
}

pub(crate) async fn predict_handler<R, C>(
    State(service): State<Arc<RecommendationService<R, C>>>,
    axum::Json(request): axum::Json<PredictionRequest>,
) -> Response
where
    R: CutoffRepository + 'static,
    C: ResponseCache + 'static,
{
    let query = request.into_query();
    match service.recommend(&query) {
        Ok(shortlist) => (StatusCode::OK, axum::Json(shortlist)).into_response(),
        Err(RecommendationError::InvalidRank) => {
            let payload = json!({
                "error": RecommendationError::InvalidRank.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(RecommendationError::Repository(RepositoryError::Empty)) => {
            let payload = json!({
                "error": "no cutoff data available for the requested cycle",
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
