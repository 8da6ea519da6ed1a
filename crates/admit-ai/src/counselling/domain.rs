use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a specific seat offering. Two offerings are the same only if
/// all five fields match exactly, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgramKey {
    pub institute: String,
    pub program: String,
    pub quota: String,
    pub seat_type: String,
    pub gender: String,
}

/// One observed cutoff row for a (program, year, round). Rank fields may be
/// absent when the published matrix was malformed for that cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutoffRecord {
    pub key: ProgramKey,
    pub year: u16,
    pub round: u8,
    pub opening_rank: Option<u32>,
    pub closing_rank: Option<u32>,
}

/// Aggregated cutoff for one admission year: the latest round that actually
/// published a closing rank. Produced by the aggregator, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyCutoff {
    pub year: u16,
    pub round: u8,
    pub closing_rank: u32,
}

/// Coarse institute tier, used only for display ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InstituteCategory {
    Iit,
    Nit,
    Iiit,
    Gfti,
    Unknown,
}

impl InstituteCategory {
    /// Sort precedence within a ranking group; lower sorts first.
    pub fn precedence(self) -> u8 {
        match self {
            InstituteCategory::Iit => 1,
            InstituteCategory::Nit => 2,
            InstituteCategory::Iiit => 3,
            InstituteCategory::Gfti => 4,
            InstituteCategory::Unknown => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InstituteCategory::Iit => "IIT",
            InstituteCategory::Nit => "NIT",
            InstituteCategory::Iiit => "IIIT",
            InstituteCategory::Gfti => "GFTI",
            InstituteCategory::Unknown => "UNKNOWN",
        }
    }
}

/// Qualitative reliability of a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Confidence {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "very low")]
    VeryLow,
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "high")]
    High,
    #[serde(rename = "very high")]
    VeryHigh,
}

impl Confidence {
    pub fn label(self) -> &'static str {
        match self {
            Confidence::None => "none",
            Confidence::VeryLow => "very low",
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
            Confidence::VeryHigh => "very high",
        }
    }
}

/// Projection plus the derived chance and its reliability for one program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub projected_rank: Option<u32>,
    pub probability: f64,
    pub confidence: Confidence,
    pub message: String,
}

/// A current-cycle cutoff row joined with its prediction and tier tag; the
/// unit the ranker orders. The prediction is absent when no candidate rank
/// was supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub record: CutoffRecord,
    pub category: InstituteCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<PredictionResult>,
}

/// The ordered shortlist returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedShortlist {
    pub year: u16,
    pub round: u8,
    pub candidate_rank: Option<u32>,
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<Candidate>,
}
