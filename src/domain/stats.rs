//! Distribution statistics over holder balances.
//!
//! Small pure helpers shared by the holder analysis and the audit report:
//! Gini coefficient for supply inequality and cadence stats over
//! deployment timestamps.

/// Gini coefficient of a balance distribution.
///
/// Returns a value in [0, 1]: 0 for a perfectly equal distribution,
/// approaching 1 as a single holder dominates. Empty or all-zero inputs
/// yield 0.
pub fn gini_coefficient(balances: &[f64]) -> f64 {
    let n = balances.len();
    if n == 0 {
        return 0.0;
    }

    let mut sorted: Vec<f64> = balances.iter().copied().filter(|b| *b >= 0.0).collect();
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len() as f64;
    let total: f64 = sorted.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }

    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, x)| (2.0 * (i as f64 + 1.0) - n - 1.0) * x)
        .sum();

    (weighted / (n * total)).clamp(0.0, 1.0)
}

/// Combined share of the `n` largest entries of a percentage list.
///
/// The input does not need to be sorted; percentages are expected in
/// [0, 100] units.
pub fn top_n_share(percentages: &[f64], n: usize) -> f64 {
    let mut sorted: Vec<f64> = percentages.to_vec();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    sorted.iter().take(n).sum()
}

/// Mean and minimum gap, in hours, between consecutive unix timestamps.
///
/// Timestamps may arrive in any order. Returns `None` when fewer than two
/// timestamps are present.
pub fn deployment_cadence_hours(timestamps: &[i64]) -> Option<(f64, f64)> {
    if timestamps.len() < 2 {
        return None;
    }

    let mut sorted = timestamps.to_vec();
    sorted.sort_unstable();

    let gaps: Vec<f64> = sorted
        .windows(2)
        .map(|w| (w[1] - w[0]) as f64 / 3600.0)
        .collect();

    let mean = gaps.iter().sum::<f64>() / gaps.len() as f64;
    let min = gaps.iter().copied().fold(f64::INFINITY, f64::min);
    Some((mean, min))
}
