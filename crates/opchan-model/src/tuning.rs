//! Channel Tuning Engine
//!
//! Builds each channel's tuning curve over the azimuth grid and derives its
//! gradient-magnitude curve.
//!
//! # Pipeline
//!
//! ```text
//! (loc, wid, shp) ──► generalized-Gaussian density ──► rescale to [0, amp] ──► tun
//!                                                                              │
//!                                                              gradient magnitude
//!                                                                              ▼
//!                                                    Σ over channels ◄──────── grd
//! ```

use opchan_core::math::{
    elementwise_sum, generalized_gaussian, gradient_magnitude, max, rescale_to_amplitude,
};
use opchan_core::{AzimuthGrid, ChannelParams, ModelResult};
use serde::{Deserialize, Serialize};

/// A channel with its derived curves
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TunedChannel {
    /// Input parameters
    pub params: ChannelParams,
    /// Tuning curve over the grid, spanning `[0, amp]`
    pub tun: Vec<f64>,
    /// Gradient magnitude of `tun`
    pub grd: Vec<f64>,
}

impl TunedChannel {
    /// Tuning curve with its peak scaled to 1
    ///
    /// Cortical responses depend only on this shape; `amp` is ignored.
    #[must_use]
    pub fn normalized(&self) -> Vec<f64> {
        let peak = max(&self.tun).unwrap_or(self.params.amp);
        self.tun.iter().map(|v| v / peak).collect()
    }

    /// Grid azimuth of the largest tuning sample (first one on ties)
    #[must_use]
    pub fn peak_azimuth(&self, grid: &AzimuthGrid) -> f64 {
        let idx = self
            .tun
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
            .0;
        grid.azimuth_at(idx)
    }
}

/// Evaluate one channel over the grid
///
/// # Errors
///
/// Returns `InvalidParameter` for an invalid channel (see
/// [`ChannelParams::validate`]) or a tuning curve that is flat over the grid.
pub fn tune_channel(grid: &AzimuthGrid, params: &ChannelParams) -> ModelResult<TunedChannel> {
    params.validate(grid)?;

    let density: Vec<f64> = grid
        .azimuths()
        .map(|x| generalized_gaussian(x, params.loc, params.wid, params.shp))
        .collect();
    let tun = rescale_to_amplitude(&density, params.amp)?;
    let grd = gradient_magnitude(&tun);

    tracing::trace!(
        label = %params.label,
        loc = params.loc,
        wid = params.wid,
        shp = params.shp,
        "tuned channel"
    );

    Ok(TunedChannel { params: params.clone(), tun, grd })
}

/// Evaluate every channel, preserving order
///
/// # Errors
///
/// Fails on the first invalid channel.
pub fn tune_channels(grid: &AzimuthGrid, params: &[ChannelParams]) -> ModelResult<Vec<TunedChannel>> {
    params.iter().map(|p| tune_channel(grid, p)).collect()
}

/// Sum of all channel gradients, sample by sample
#[must_use]
pub fn summed_gradient(grid: &AzimuthGrid, channels: &[TunedChannel]) -> Vec<f64> {
    elementwise_sum(channels.iter().map(|c| c.grd.as_slice()), grid.len())
}

// ============================================================================
// Tests
// ============================================================================
