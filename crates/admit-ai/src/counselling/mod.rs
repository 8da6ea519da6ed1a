//! Admission prediction and shortlist ranking.
//!
//! Data flows strictly downstream: the aggregator collapses raw rows into a
//! per-year series, the projector turns the series into a projected cutoff,
//! the probability and confidence scorers derive the chance and its
//! reliability, the classifier tags institute tiers, and the ranker imposes
//! the final total order. Every step is a pure function over per-request
//! data; the service module wires them to the storage and cache boundaries.

pub(crate) mod aggregate;
pub(crate) mod category;
pub(crate) mod confidence;
pub mod domain;
pub mod engine;
pub mod import;
pub(crate) mod probability;
pub mod projection;
pub mod repository;
pub mod router;
pub mod service;

mod ranking;

pub use category::classify_institute;
pub use domain::{
    Candidate, Confidence, CutoffRecord, InstituteCategory, PredictionResult, ProgramKey,
    RankedShortlist, YearlyCutoff,
};
pub use engine::PredictionEngine;
pub use import::{CutoffCsvImporter, ImportError};
pub use projection::ProjectionConfig;
pub use repository::{
    CacheError, CandidateFilters, CutoffRepository, RepositoryError, ResponseCache,
};
pub use router::prediction_router;
pub use service::{RecommendationError, RecommendationQuery, RecommendationService};
