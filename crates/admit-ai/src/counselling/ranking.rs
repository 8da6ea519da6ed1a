use std::cmp::Ordering;

use super::domain::Candidate;

/// Anchor offsets by candidate rank: wider slack for larger rank numbers, so
/// the achievable window stays meaningful across the whole rank range.
const ANCHOR_OFFSETS: [(u32, u32); 12] = [
    (10_000, 1_000),
    (20_000, 1_500),
    (30_000, 2_200),
    (40_000, 2_900),
    (50_000, 3_500),
    (60_000, 4_000),
    (80_000, 5_500),
    (100_000, 6_000),
    (130_000, 8_500),
    (160_000, 10_500),
    (185_000, 12_500),
    (210_000, 20_000),
];
const ANCHOR_OFFSET_BEYOND: u32 = 30_000;

pub(crate) fn anchor_offset(candidate_rank: u32) -> u32 {
    for (threshold, offset) in ANCHOR_OFFSETS {
        if candidate_rank <= threshold {
            return offset;
        }
    }
    ANCHOR_OFFSET_BEYOND
}

/// Threshold partitioning achievable from aspirational programs.
pub(crate) fn anchor_rank(candidate_rank: u32) -> u32 {
    candidate_rank
        .saturating_sub(anchor_offset(candidate_rank))
        .max(1)
}

/// Impose the authoritative display order. With a candidate rank: achievable
/// programs first, then category precedence, closing rank ascending with
/// missing closings last, and lexicographic identity tie-breaks so equal
/// inputs always land in one order. Without a rank: category, institute,
/// program, ignoring predictions entirely.
pub fn rank_candidates(candidates: &mut [Candidate], candidate_rank: Option<u32>) {
    match candidate_rank {
        Some(rank) => {
            let anchor = anchor_rank(rank);
            candidates.sort_by(|a, b| compare_with_anchor(a, b, anchor));
        }
        None => candidates.sort_by(compare_by_name),
    }
}

fn achievable(candidate: &Candidate, anchor: u32) -> bool {
    // A row with no closing rank cannot certify achievability.
    candidate
        .record
        .closing_rank
        .map_or(false, |closing| closing >= anchor)
}

fn closing_sort_key(candidate: &Candidate) -> u32 {
    candidate.record.closing_rank.unwrap_or(u32::MAX)
}

fn compare_with_anchor(a: &Candidate, b: &Candidate, anchor: u32) -> Ordering {
    achievable(b, anchor)
        .cmp(&achievable(a, anchor))
        .then_with(|| a.category.precedence().cmp(&b.category.precedence()))
        .then_with(|| closing_sort_key(a).cmp(&closing_sort_key(b)))
        .then_with(|| a.record.key.institute.cmp(&b.record.key.institute))
        .then_with(|| identity_tail(a, b))
}

fn compare_by_name(a: &Candidate, b: &Candidate) -> Ordering {
    a.category
        .precedence()
        .cmp(&b.category.precedence())
        .then_with(|| a.record.key.institute.cmp(&b.record.key.institute))
        .then_with(|| a.record.key.program.cmp(&b.record.key.program))
        .then_with(|| identity_tail(a, b))
}

fn identity_tail(a: &Candidate, b: &Candidate) -> Ordering {
    a.record
        .key
        .program
        .cmp(&b.record.key.program)
        .then_with(|| a.record.key.quota.cmp(&b.record.key.quota))
        .then_with(|| a.record.key.seat_type.cmp(&b.record.key.seat_type))
        .then_with(|| a.record.key.gender.cmp(&b.record.key.gender))
        .then_with(|| closing_sort_key(a).cmp(&closing_sort_key(b)))
}
