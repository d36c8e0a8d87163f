//! Model evaluation
//!
//! Single-pass entry point tying the three engines together:
//!
//! ```text
//! ModelParams ──► tune channels ──► tun, grd ──┬──► cortical responses ──► ac
//!                                              │
//!                                              └──► Σ grd ──► MAA prediction ──► pred
//! ```
//!
//! Each call builds a fresh, immutable [`ModelOutput`]; nothing is cached
//! between evaluations.

use opchan_core::types::DEFAULT_STIMULUS_LOCATIONS;
use opchan_core::{AzimuthGrid, ModelParams, ModelResult, StimulusLocations};
use serde::{Deserialize, Serialize};

use crate::error::ResolverResult;
use crate::prediction::{predict_maa, MaaPrediction};
use crate::presets::{ParameterSource, PresetTable};
use crate::response::{compute_responses, CorticalResponse};
use crate::tuning::{summed_gradient, tune_channels, TunedChannel};

/// Evaluation grid and stimulus layout
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Azimuth grid for tuning curves and gradients
    pub grid: AzimuthGrid,
    /// Presented stimulus azimuths (degrees), all exact grid samples
    pub stimulus_locations: Vec<f64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            grid: AzimuthGrid::default(),
            stimulus_locations: DEFAULT_STIMULUS_LOCATIONS.to_vec(),
        }
    }
}

/// Result snapshot of one evaluation
#[derive(Clone, Debug, Serialize)]
pub struct ModelOutput {
    /// Grid used for every curve
    pub grid: AzimuthGrid,
    /// Resolved stimulus locations
    pub locations: StimulusLocations,
    /// Channels with tuning and gradient curves
    pub chans: Vec<TunedChannel>,
    /// One response surface per cortical unit
    pub ac: Vec<CorticalResponse>,
    /// MAA prediction
    pub pred: MaaPrediction,
}

/// Evaluate the model for one parameter set
///
/// # Errors
///
/// - `InvalidParameter` for a bad channel, cortical unit or calibration value
/// - `Configuration` for a weight/channel count mismatch or a stimulus
///   location that is not a grid sample
/// - `Lookup` for a calibration azimuth that is not a grid sample
/// - `UndefinedResult` if the summed gradient is zero anywhere on the grid
pub fn evaluate(params: &ModelParams, config: &ModelConfig) -> ModelResult<ModelOutput> {
    let grid = config.grid;
    params.validate(&grid)?;
    let locations = StimulusLocations::resolve(&grid, &config.stimulus_locations)?;

    tracing::debug!(
        channels = params.channels.len(),
        cortical_units = params.cortical_units.len(),
        grid_start = grid.start(),
        grid_end = grid.end(),
        locations = locations.len(),
        "evaluating opponent-channel model"
    );

    let chans = tune_channels(&grid, &params.channels)?;
    let ac = compute_responses(&chans, &locations, &params.cortical_units)?;
    let grads = summed_gradient(&grid, &chans);
    let pred = predict_maa(&grid, grads, &params.prediction)?;

    Ok(ModelOutput { grid, locations, chans, ac, pred })
}

/// Resolve a parameter source against `table` and evaluate it
///
/// # Errors
///
/// Returns `UnknownPreset` for a missing preset, or wraps any evaluation
/// failure in `ResolverError::Model`.
pub fn evaluate_source(
    source: &ParameterSource,
    table: &PresetTable,
    config: &ModelConfig,
) -> ResolverResult<ModelOutput> {
    let params = source.resolve(table)?;
    Ok(evaluate(&params, config)?)
}

// ============================================================================
// Tests
// ============================================================================
