//! Recursive exponentially weighted mean.
//!
//! EWM[t] = alpha * x[t] + (1 - alpha) * EWM[t-1], seeded with the first
//! defined value (no SMA seed, no bias adjustment). Leading NaNs stay NaN; a
//! NaN after the seed taints the rest of the series.

/// Smoothing factor for a given center of mass: `alpha = 1 / (1 + com)`.
pub fn alpha_from_com(center_of_mass: f64) -> f64 {
    1.0 / (1.0 + center_of_mass)
}

/// Compute the recursive EWM of `values` with smoothing factor `alpha`.
pub fn ewm_mean(values: &[f64], alpha: f64) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    let Some(seed_idx) = values.iter().position(|v| !v.is_nan()) else {
        return result;
    };

    let mut prev = values[seed_idx];
    result[seed_idx] = prev;

    for i in (seed_idx + 1)..n {
        if values[i].is_nan() {
            return result;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }

    result
}
