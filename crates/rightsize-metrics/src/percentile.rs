//! Percentile math over representative usage values.

/// Percentile summary of a non-empty sample set.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub p98: f64,
    pub max: f64,
    pub count: usize,
}

/// Linearly interpolated percentile over an ascending slice.
///
/// `p` is in `0.0..=100.0`. Returns `None` for an empty slice.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = (p.clamp(0.0, 100.0) / 100.0) * last as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Summarize a sample set. Non-finite values are ignored; returns `None`
/// when nothing is left.
pub fn summarize(values: &[f64]) -> Option<Summary> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    Some(Summary {
        min: sorted[0],
        q1: percentile(&sorted, 25.0)?,
        median: percentile(&sorted, 50.0)?,
        q3: percentile(&sorted, 75.0)?,
        p98: percentile(&sorted, 98.0)?,
        max: sorted[sorted.len() - 1],
        count: sorted.len(),
    })
}
