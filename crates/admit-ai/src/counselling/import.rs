use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{CutoffRecord, ProgramKey};

/// Importer for the published cutoff matrix CSV (one row per institute,
/// program, quota, seat type, gender, year, and round).
pub struct CutoffCsvImporter;

impl CutoffCsvImporter {
    pub fn from_path(path: &Path) -> Result<Vec<CutoffRecord>, ImportError> {
        let file = File::open(path).map_err(|source| ImportError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<CutoffRecord>, ImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for row in csv_reader.deserialize::<CutoffRow>() {
            records.push(row?.into_record());
        }
        Ok(records)
    }
}

#[derive(Debug, Deserialize)]
struct CutoffRow {
    #[serde(rename = "Institute")]
    institute: String,
    #[serde(rename = "Academic Program Name")]
    program: String,
    #[serde(rename = "Quota")]
    quota: String,
    #[serde(rename = "Seat Type")]
    seat_type: String,
    #[serde(rename = "Gender")]
    gender: String,
    #[serde(rename = "Year")]
    year: u16,
    #[serde(rename = "Round")]
    round: u8,
    #[serde(rename = "Opening Rank", default, deserialize_with = "lenient_rank")]
    opening_rank: Option<u32>,
    #[serde(rename = "Closing Rank", default, deserialize_with = "lenient_rank")]
    closing_rank: Option<u32>,
}

impl CutoffRow {
    fn into_record(self) -> CutoffRecord {
        CutoffRecord {
            key: ProgramKey {
                institute: self.institute,
                program: self.program,
                quota: self.quota,
                seat_type: self.seat_type,
                gender: self.gender,
            },
            year: self.year,
            round: self.round,
            opening_rank: self.opening_rank,
            closing_rank: self.closing_rank,
        }
    }
}

/// Rank cells arrive as free text in the wild: empty, padded, or outright
/// non-numeric. All of those collapse to `None` rather than failing the row.
fn lenient_rank<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.and_then(|raw| {
        raw.trim()
            .parse::<u32>()
            .ok()
            .filter(|&rank| rank > 0)
    }))
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid cutoff CSV data: {0}")]
    Csv(#[from] csv::Error),
}
