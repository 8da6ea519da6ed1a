use super::domain::{CutoffRecord, YearlyCutoff};

/// Collapse raw per-round rows for one program into at most one entry per
/// year: the highest round that published a closing rank. A year whose every
/// round lacks a closing rank is omitted entirely. Output is year-descending.
pub fn yearly_series(records: &[CutoffRecord]) -> Vec<YearlyCutoff> {
    let mut ordered: Vec<&CutoffRecord> = records.iter().collect();
    ordered.sort_by(|a, b| b.year.cmp(&a.year).then(b.round.cmp(&a.round)));

    let mut series: Vec<YearlyCutoff> = Vec::new();
    for record in ordered {
        // Same-year rows are contiguous after the sort, so the last entry is
        // enough to tell whether this year already contributed.
        if series.last().map(|entry| entry.year) == Some(record.year) {
            continue;
        }
        let Some(closing_rank) = record.closing_rank else {
            continue;
        };
        series.push(YearlyCutoff {
            year: record.year,
            round: record.round,
            closing_rank,
        });
    }
    series
}
