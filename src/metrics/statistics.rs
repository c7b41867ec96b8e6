//! Numeric aggregation primitives used by metrics.

/// Weighted mean of `scores` under a weighting transform.
///
/// Returns `Σ(score · weight_fn(score)) / Σ weight_fn(score)`, or `None`
/// when there is no data to aggregate (empty input, or every weight is
/// zero). Callers decide what to substitute for `None`.
///
/// For a single-element input `[x]` with `weight_fn(x) != 0` the result
/// is `x`.
pub fn weighted_mean<F>(scores: &[f64], weight_fn: F) -> Option<f64>
where
    F: Fn(f64) -> f64,
{
    let weights: Vec<f64> = scores.iter().map(|&score| weight_fn(score)).collect();
    let total_weight: f64 = weights.iter().sum();
    if total_weight == 0.0 {
        return None;
    }

    // Normalizing each weight first keeps the single-element case exact:
    // w / w is exactly 1.0, so the score passes through unchanged
    let mut mean = 0.0;
    for (&score, &weight) in scores.iter().zip(&weights) {
        mean += score * (weight / total_weight);
    }
    Some(mean)
}
