//! Admission probability prediction and shortlist ranking for competitive
//! seat-allocation counselling.
//!
//! The `counselling` module holds the prediction engine and its storage and
//! cache boundaries; `config`, `error`, and `telemetry` carry the service
//! plumbing shared with the API binary.

pub mod config;
pub mod counselling;
pub mod error;
pub mod telemetry;
