/// Chance assigned when the candidate's rank is at or inside the projection.
const NEAR_CERTAIN: f64 = 0.98;
/// Ceiling and floor of the decayed estimate.
const DECAY_CEILING: f64 = 0.90;
const FLOOR: f64 = 0.01;
/// Characteristic decay scale never tightens below this many ranks.
const MIN_DECAY_SCALE: f64 = 500.0;
const DECAY_SCALE_FACTOR: f64 = 0.25;

/// Admission probability from the gap between candidate rank and projected
/// cutoff. Inside the projection the chance is fixed at 0.98; past it the
/// estimate decays exponentially with a scale proportional to the projection,
/// so selective programs fall off faster in absolute rank distance.
pub fn admission_probability(candidate_rank: u32, projected_rank: u32) -> f64 {
    if projected_rank == 0 {
        return FLOOR;
    }
    if candidate_rank <= projected_rank {
        return NEAR_CERTAIN;
    }

    let diff = f64::from(candidate_rank - projected_rank);
    let scale = MIN_DECAY_SCALE.max(f64::from(projected_rank) * DECAY_SCALE_FACTOR);
    let decayed = DECAY_CEILING * (-diff / scale).exp();

    round_to_millis(decayed.clamp(FLOOR, DECAY_CEILING))
}

fn round_to_millis(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
