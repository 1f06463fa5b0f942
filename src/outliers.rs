//! Fixed-sigma outlier clipping.
//!
//! This is a coarse heuristic to keep a handful of wild grid cells from
//! blowing out a plot's color scale, not a statistically robust outlier
//! test: anything more than five standard deviations from the mean of the
//! whole array is replaced by the array's median.
use ndarray::{Array, Dimension};
use num_traits::{Float, FromPrimitive};

/// Distance from the mean, in standard deviations, beyond which a value is
/// treated as an outlier.
pub const SIGMA_THRESHOLD: f64 = 5.0;

/// Return a copy of `arr` with outliers replaced by the median. The input is
/// left unmodified. An array with zero standard deviation (constant, or a
/// single element) comes back unchanged, since nothing can exceed the
/// threshold.
pub fn clip_outliers<F, D>(arr: &Array<F, D>) -> Array<F, D>
where
    F: Float + FromPrimitive,
    D: Dimension,
{
    let n = arr.len();
    if n == 0 {
        return arr.clone();
    }

    let n_f = F::from_usize(n).expect("array length fits in a float");
    let mean = arr.iter().fold(F::zero(), |acc, &v| acc + v) / n_f;
    let var = arr
        .iter()
        .fold(F::zero(), |acc, &v| acc + (v - mean) * (v - mean))
        / n_f;
    let std = var.sqrt();
    if std == F::zero() {
        return arr.clone();
    }

    let median = median_of(arr);
    let threshold = F::from_f64(SIGMA_THRESHOLD).expect("threshold fits in a float") * std;
    arr.mapv(|v| if (v - mean).abs() > threshold { median } else { v })
}

/// Median over all elements, averaging the two middle values when the
/// element count is even (matching the numpy convention).
fn median_of<F, D>(arr: &Array<F, D>) -> F
where
    F: Float + FromPrimitive,
    D: Dimension,
{
    let mut values: Vec<F> = arr.iter().copied().collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / F::from_f64(2.0).expect("2 fits in a float")
    }
}
