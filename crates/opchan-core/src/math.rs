//! Numerical kernels
//!
//! Pure functions over `f64` slices used by the tuning, response and
//! prediction engines:
//! - Generalized-Gaussian (exponential power) density
//! - Min/max rescaling to a target amplitude
//! - Centered gradient magnitude with one-sided boundaries
//! - Elementwise sum and reciprocal

use core::f64::consts::{PI, SQRT_2};

use crate::error::{ModelError, ModelResult};

// ============================================================================
// Densities
// ============================================================================

/// Generalized-Gaussian density at `x`
///
/// `s = wid * sqrt(2)`, `f(x) = shp / (2 s Γ(1/shp)) * exp(-(|x - loc| / s)^shp)`.
/// With `shp == 2` this is the normal density with standard deviation `wid`.
#[must_use]
pub fn generalized_gaussian(x: f64, loc: f64, wid: f64, shp: f64) -> f64 {
    let s = wid * SQRT_2;
    let coef = shp / (2.0 * s * libm::tgamma(1.0 / shp));
    coef * (-((x - loc).abs() / s).powf(shp)).exp()
}

/// Normal density with mean `mean` and standard deviation `sd`
#[must_use]
pub fn normal_density(x: f64, mean: f64, sd: f64) -> f64 {
    let z = (x - mean) / sd;
    (-0.5 * z * z).exp() / (sd * (2.0 * PI).sqrt())
}

// ============================================================================
// Curve Operations
// ============================================================================

/// Smallest value, `None` for an empty slice
#[must_use]
pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

/// Largest value, `None` for an empty slice
#[must_use]
pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Shift a curve to start at 0 and scale its peak to `amp`
///
/// The minimum sample maps to exactly 0 and the maximum sample to exactly
/// `amp`.
///
/// # Errors
///
/// Returns [`ModelError::InvalidParameter`] for an empty or flat curve, which
/// has no range to normalize.
pub fn rescale_to_amplitude(values: &[f64], amp: f64) -> ModelResult<Vec<f64>> {
    let lo = min(values).ok_or_else(|| ModelError::invalid("tun", "empty curve"))?;
    let shifted: Vec<f64> = values.iter().map(|v| v - lo).collect();
    let hi = max(&shifted).unwrap_or(0.0);

    if !(hi > 0.0 && hi.is_finite()) {
        return Err(ModelError::invalid(
            "tun",
            "tuning curve is flat over the grid and cannot be normalized",
        ));
    }

    Ok(shifted.iter().map(|v| v / hi * amp).collect())
}

/// Gradient magnitude of a sampled curve
///
/// `|forward difference| + |backward difference|`, halved at interior
/// samples. The two end samples keep their one-sided magnitude.
#[must_use]
pub fn gradient_magnitude(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut grd: Vec<f64> = (0..n)
        .map(|i| {
            let forward = if i + 1 < n { values[i] - values[i + 1] } else { 0.0 };
            let backward = if i > 0 { values[i] - values[i - 1] } else { 0.0 };
            forward.abs() + backward.abs()
        })
        .collect();

    if n > 2 {
        for g in &mut grd[1..n - 1] {
            *g /= 2.0;
        }
    }
    grd
}

/// Elementwise sum of equally long curves
///
/// Curves shorter than `len` contribute only to their own samples.
#[must_use]
pub fn elementwise_sum<'a>(curves: impl IntoIterator<Item = &'a [f64]>, len: usize) -> Vec<f64> {
    let mut total = vec![0.0; len];
    for curve in curves {
        for (acc, v) in total.iter_mut().zip(curve) {
            *acc += v;
        }
    }
    total
}

/// Elementwise `1 / v`; zeros become infinities
#[must_use]
pub fn reciprocal(values: &[f64]) -> Vec<f64> {
    values.iter().map(|v| v.recip()).collect()
}

// ============================================================================
// Tests
// ============================================================================
