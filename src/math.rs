use ndarray::{ArrayBase, Data, Ix1};
use statrs::statistics::Statistics;
use std::f64::consts::PI;

/// Calculates the squared Euclidean distance between two vectors.
///
/// # Parameters
///
/// - `x1` - First vector
/// - `x2` - Second vector
///
/// # Returns
///
/// - `f64` - Squared Euclidean distance between the two vectors
///
/// # Examples
/// ```rust
/// use ndarray::array;
/// use classeval::math::squared_euclidean_distance_row;
///
/// let v1 = array![1.0, 2.0, 3.0];
/// let v2 = array![4.0, 5.0, 6.0];
/// let dist = squared_euclidean_distance_row(&v1, &v2);
/// // (4-1)^2 + (5-2)^2 + (6-3)^2 = 9 + 9 + 9 = 27
/// assert!((dist - 27.0).abs() < 1e-10);
/// ```
#[inline]
pub fn squared_euclidean_distance_row<S1, S2>(
    x1: &ArrayBase<S1, Ix1>,
    x2: &ArrayBase<S2, Ix1>,
) -> f64
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    x1.iter()
        .zip(x2.iter())
        .fold(0.0, |acc, (&a, &b)| {
            let diff = a - b;
            acc + diff * diff
        })
}

/// Calculates the Euclidean (L2) distance between two vectors.
///
/// # Examples
/// ```rust
/// use ndarray::array;
/// use classeval::math::euclidean_distance_row;
///
/// let distance = euclidean_distance_row(&array![0.0, 0.0], &array![3.0, 4.0]);
/// assert!((distance - 5.0).abs() < 1e-12);
/// ```
#[inline]
pub fn euclidean_distance_row<S1, S2>(x1: &ArrayBase<S1, Ix1>, x2: &ArrayBase<S2, Ix1>) -> f64
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    squared_euclidean_distance_row(x1, x2).sqrt()
}

/// Evaluates the normal probability density function at `x`.
///
/// The value is `exp(-(x - mean)^2 / (2 * variance)) / sqrt(2 * pi * variance)`. It is a
/// density, not a probability, and is only meaningful as a comparative score.
///
/// A variance of zero (or below) describes a point mass: the result is `1.0` when
/// `x == mean` and `0.0` otherwise.
///
/// # Examples
/// ```rust
/// use classeval::math::gaussian_density;
///
/// let density = gaussian_density(0.0, 1.0, 0.0);
/// assert!((density - 0.3989422804014327).abs() < 1e-12);
/// ```
#[inline]
pub fn gaussian_density(mean: f64, variance: f64, x: f64) -> f64 {
    if variance <= 0.0 {
        return if x == mean { 1.0 } else { 0.0 };
    }
    let diff = x - mean;
    (-(diff * diff) / (2.0 * variance)).exp() / (2.0 * PI * variance).sqrt()
}

/// Arithmetic mean of the values, `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().mean()
}

/// Unbiased sample variance (`n - 1` denominator).
///
/// Fewer than two values carry no spread information and yield `0.0`.
///
/// # Examples
/// ```rust
/// use classeval::math::sample_variance;
///
/// let v = sample_variance(&[1.0, 2.0, 3.0, 4.0]);
/// assert!((v - 1.6666666666666667).abs() < 1e-12);
/// ```
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    values.iter().variance()
}
