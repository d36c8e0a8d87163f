//! Opponent Response Engine
//!
//! Predicts the auditory-cortex response to every (pre-shift, post-shift)
//! pair of stimulus locations.
//!
//! # Response Model
//!
//! For each channel the peak-normalized tuning value is read at both
//! locations. Only an increase in activation drives the cortex:
//!
//! ```text
//! drive[pre][post] = Σ_c  w_c · max(tun_c(post) − tun_c(pre), 0)
//! resp             = (1 − exp(−drive · comp)) · scale + noise     (comp > 0)
//! resp             = drive · scale + noise                        (comp = 0)
//! ```
//!
//! A location pair with no shift has zero drive, so its response equals the
//! unit's `noise` baseline exactly.

use opchan_core::{CorticalUnitParams, ModelError, ModelResult, ResponseMatrix, StimulusLocations};
use serde::{Deserialize, Serialize};

use crate::tuning::TunedChannel;

/// Response surface of one cortical unit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorticalResponse {
    /// Input parameters
    pub params: CorticalUnitParams,
    /// Stimulus azimuths indexing the matrix rows and columns
    pub azimuths: Vec<f64>,
    /// Weighted, rectified channel drive before compression
    pub drive: ResponseMatrix,
    /// Final response (nAm)
    pub resp: ResponseMatrix,
}

impl CorticalResponse {
    /// Drive after compression, before linear scaling
    ///
    /// Lies in `[0, 1)` whenever `comp > 0`. Unit validation caps
    /// `comp × Σ weights`, so the bound also holds after `f64` rounding.
    #[must_use]
    pub fn compressed(&self) -> ResponseMatrix {
        let mut m = self.drive.clone();
        m.map_in_place(|d| compress(d, self.params.comp));
        m
    }

    /// Response to a shift from `pre` to `post` (stimulus azimuths, degrees)
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Lookup`] if either azimuth is not a stimulus
    /// location.
    #[allow(clippy::float_cmp)]
    pub fn at(&self, pre: f64, post: f64) -> ModelResult<f64> {
        let find = |az: f64| {
            self.azimuths
                .iter()
                .position(|&a| a == az)
                .ok_or(ModelError::Lookup { what: "stimulus location", azimuth: az })
        };
        Ok(self.resp.get(find(pre)?, find(post)?))
    }

    /// Responses grouped by signed shift size (`post − pre`, degrees)
    ///
    /// Each entry holds the mean response over all pairs with that shift,
    /// sorted by shift. Useful for plotting response against shift magnitude.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn by_shift(&self) -> Vec<(f64, f64)> {
        let mut groups: Vec<(f64, f64, usize)> = Vec::new();
        for (i, &pre) in self.azimuths.iter().enumerate() {
            for (j, &post) in self.azimuths.iter().enumerate() {
                let shift = post - pre;
                let value = self.resp.get(i, j);
                match groups.iter_mut().find(|g| (g.0 - shift).abs() < f64::EPSILON) {
                    Some(g) => {
                        g.1 += value;
                        g.2 += 1;
                    }
                    None => groups.push((shift, value, 1)),
                }
            }
        }
        groups.sort_by(|a, b| a.0.total_cmp(&b.0));
        groups.into_iter().map(|(shift, sum, n)| (shift, sum / n as f64)).collect()
    }
}

/// Saturating nonlinearity, identity when `comp == 0`
#[inline]
#[allow(clippy::float_cmp)]
fn compress(drive: f64, comp: f64) -> f64 {
    if comp == 0.0 {
        drive
    } else {
        1.0 - (-drive * comp).exp()
    }
}

/// Compute one unit's response matrix
///
/// # Errors
///
/// Returns [`ModelError::Configuration`] if the unit's weight count differs
/// from the channel count, or `InvalidParameter` for other invalid unit
/// parameters.
pub fn compute_response(
    channels: &[TunedChannel],
    locations: &StimulusLocations,
    unit: &CorticalUnitParams,
) -> ModelResult<CorticalResponse> {
    unit.validate(channels.len())?;

    let n = locations.len();
    let normalized: Vec<Vec<f64>> = channels.iter().map(TunedChannel::normalized).collect();
    let indices = locations.grid_indices();

    let mut drive = ResponseMatrix::zeros(n);
    for (pre, &pre_idx) in indices.iter().enumerate() {
        for (post, &post_idx) in indices.iter().enumerate() {
            let cell = drive.get_mut(pre, post);
            for (tun, &weight) in normalized.iter().zip(&unit.weights) {
                let increase = (tun[post_idx] - tun[pre_idx]).max(0.0);
                *cell += increase * weight;
            }
        }
    }

    let mut resp = drive.clone();
    resp.map_in_place(|d| compress(d, unit.comp) * unit.scale + unit.noise);

    let (lo, hi) = resp.range();
    tracing::trace!(label = %unit.label, min = lo, max = hi, "cortical response");

    Ok(CorticalResponse {
        params: unit.clone(),
        azimuths: locations.azimuths().to_vec(),
        drive,
        resp,
    })
}

/// Compute every unit's response matrix, preserving order
///
/// # Errors
///
/// Fails on the first inconsistent unit.
pub fn compute_responses(
    channels: &[TunedChannel],
    locations: &StimulusLocations,
    units: &[CorticalUnitParams],
) -> ModelResult<Vec<CorticalResponse>> {
    units.iter().map(|u| compute_response(channels, locations, u)).collect()
}

// ============================================================================
// Tests
// ============================================================================
