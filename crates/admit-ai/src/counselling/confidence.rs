use super::domain::Confidence;

/// Dispersion of the projection window relative to the projection itself.
/// Zero when there are no points or no positive projection to compare with.
pub fn relative_std_dev(closing_ranks: &[u32], projected_rank: u32) -> f64 {
    if closing_ranks.is_empty() || projected_rank == 0 {
        return 0.0;
    }

    let n = closing_ranks.len() as f64;
    let mean = closing_ranks.iter().map(|&rank| f64::from(rank)).sum::<f64>() / n;
    let variance = closing_ranks
        .iter()
        .map(|&rank| {
            let delta = f64::from(rank) - mean;
            delta * delta
        })
        .sum::<f64>()
        / n;

    variance.sqrt() / f64::from(projected_rank)
}

/// Reliability of a projection: more cycles and a steadier series score
/// higher. This is the canonical orientation; high stability means high
/// confidence.
pub fn score_confidence(n_points: usize, relative_std_dev: f64) -> Confidence {
    match n_points {
        0 => Confidence::None,
        1 => Confidence::VeryLow,
        2 => {
            if relative_std_dev < 0.20 {
                Confidence::Medium
            } else {
                Confidence::Low
            }
        }
        3 => {
            if relative_std_dev < 0.15 {
                Confidence::High
            } else if relative_std_dev < 0.20 {
                Confidence::Medium
            } else {
                Confidence::Low
            }
        }
        _ => {
            if relative_std_dev < 0.10 {
                Confidence::VeryHigh
            } else if relative_std_dev < 0.15 {
                Confidence::High
            } else if relative_std_dev < 0.25 {
                Confidence::Medium
            } else {
                Confidence::Low
            }
        }
    }
}
