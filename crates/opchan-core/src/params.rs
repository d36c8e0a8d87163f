//! Model parameters
//!
//! The three parameter groups consumed by one model evaluation:
//!
//! - [`ChannelParams`]: one directional tuning mechanism per entry
//! - [`CorticalUnitParams`]: one modeled auditory-cortex generator per entry
//! - [`PredictionParams`]: MAA calibration and the behavioral reference table
//!
//! [`ModelParams`] bundles them and is what presets resolve to.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::types::AzimuthGrid;

/// Largest `comp × Σ weights` for which `1 − exp(−x)` stays below 1.0 in `f64`
pub const MAX_COMPRESSION_EXPONENT: f64 = 36.0;

// ============================================================================
// Channels
// ============================================================================

/// Directional channel parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelParams {
    /// Display label
    #[serde(default)]
    pub label: String,
    /// Peak-response azimuth (degrees)
    pub loc: f64,
    /// Peak amplitude after normalization (0-1], only used for MAA scaling
    pub amp: f64,
    /// Width of the tuning density (degrees; the SD when `shp == 2`)
    pub wid: f64,
    /// Generalized-Gaussian shape (2 = normal, <2 peaked, >2 plateau)
    pub shp: f64,
}

impl ChannelParams {
    /// Create an unlabeled channel
    #[must_use]
    pub fn new(loc: f64, amp: f64, wid: f64, shp: f64) -> Self {
        Self { label: String::new(), loc, amp, wid, shp }
    }

    /// Attach a display label
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Check the channel against the evaluation grid
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] for a non-positive or
    /// non-finite width, shape or amplitude, or a peak azimuth outside the grid.
    pub fn validate(&self, grid: &AzimuthGrid) -> ModelResult<()> {
        require_positive("wid", self.wid)?;
        require_positive("shp", self.shp)?;
        require_positive("amp", self.amp)?;

        if !self.loc.is_finite() || !grid.covers(self.loc) {
            return Err(ModelError::invalid(
                "loc",
                format!(
                    "{}° lies outside grid {}..={}",
                    self.loc,
                    grid.start(),
                    grid.end()
                ),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Cortical Units
// ============================================================================

/// Auditory-cortex response generator parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorticalUnitParams {
    /// Display label (e.g. "Left AC")
    #[serde(default)]
    pub label: String,
    /// Compression exponent, 0 disables compression
    pub comp: f64,
    /// Per-channel weights, ordered like the channel list
    pub weights: Vec<f64>,
    /// Linear output gain (nAm)
    pub scale: f64,
    /// Additive baseline (nAm)
    pub noise: f64,
}

impl CorticalUnitParams {
    /// Check the unit against the configured channel count
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Configuration`] on a weights/channel count
    /// mismatch and [`ModelError::InvalidParameter`] for a negative or
    /// non-finite compression exponent or weight, a compression exponent
    /// large enough to saturate, or a non-finite scale or noise.
    pub fn validate(&self, channel_count: usize) -> ModelResult<()> {
        if self.weights.len() != channel_count {
            return Err(ModelError::configuration(format!(
                "cortical unit '{}' has {} weights for {} channels",
                self.label,
                self.weights.len(),
                channel_count
            )));
        }
        if !self.comp.is_finite() || self.comp < 0.0 {
            return Err(ModelError::invalid(
                "comp",
                format!("must be finite and >= 0, got {}", self.comp),
            ));
        }
        if self.weights.iter().any(|w| !(w.is_finite() && *w >= 0.0)) {
            return Err(ModelError::invalid("weights", "all weights must be finite and >= 0"));
        }
        // Normalized increases are at most 1 per channel, so drive <= Σ weights
        let max_exponent = self.comp * self.weights.iter().sum::<f64>();
        if max_exponent > MAX_COMPRESSION_EXPONENT {
            return Err(ModelError::invalid(
                "comp",
                format!(
                    "comp × Σ weights is {max_exponent}, above {MAX_COMPRESSION_EXPONENT}; \
                     compression would saturate to exactly 1"
                ),
            ));
        }
        if !self.scale.is_finite() || !self.noise.is_finite() {
            return Err(ModelError::invalid("scale/noise", "must be finite"));
        }
        Ok(())
    }
}

// ============================================================================
// Prediction
// ============================================================================

/// How inverse-gradient units are converted to degrees of MAA
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Calibration {
    /// Fixed conversion factor (degrees per inverse-gradient unit)
    Explicit {
        /// Conversion factor
        k: f64,
    },
    /// Derive the factor so the prediction at `azimuth` equals `maa`
    CalibrateFrom {
        /// Reference azimuth, must be an exact grid sample
        azimuth: f64,
        /// Target MAA at the reference azimuth (degrees)
        maa: f64,
    },
}

impl Calibration {
    /// Check that the calibration values are usable
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] for a non-finite factor or a
    /// non-positive target MAA.
    pub fn validate(&self) -> ModelResult<()> {
        match *self {
            Self::Explicit { k } if !k.is_finite() => {
                Err(ModelError::invalid("k", format!("must be finite, got {k}")))
            }
            Self::CalibrateFrom { maa, .. } if !(maa.is_finite() && maa > 0.0) => {
                Err(ModelError::invalid("maak", format!("target MAA must be > 0, got {maa}")))
            }
            _ => Ok(()),
        }
    }
}

/// One row of behavioral reference data
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BehavioralRow {
    /// Reference azimuth (degrees)
    pub azimuth: f64,
    /// Observed MAA (degrees)
    pub maa: f64,
    /// Confidence interval half-width (degrees), if reported
    #[serde(default)]
    pub ci: Option<f64>,
}

/// MAA prediction parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionParams {
    /// Behavioral data, passed through for comparison
    #[serde(default)]
    pub data: Vec<BehavioralRow>,
    /// Conversion from inverse gradient to MAA
    pub calibration: Calibration,
}

// ============================================================================
// Full Parameter Set
// ============================================================================

/// Complete input to one model evaluation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Directional channels
    pub channels: Vec<ChannelParams>,
    /// Modeled cortical units
    pub cortical_units: Vec<CorticalUnitParams>,
    /// MAA prediction settings
    pub prediction: PredictionParams,
}

impl ModelParams {
    /// Validate all groups against each other and the grid
    ///
    /// # Errors
    ///
    /// Propagates the first channel, cortical unit or calibration failure;
    /// an empty channel list is a [`ModelError::Configuration`].
    pub fn validate(&self, grid: &AzimuthGrid) -> ModelResult<()> {
        if self.channels.is_empty() {
            return Err(ModelError::configuration("at least one channel is required"));
        }
        for channel in &self.channels {
            channel.validate(grid)?;
        }
        for unit in &self.cortical_units {
            unit.validate(self.channels.len())?;
        }
        self.prediction.calibration.validate()
    }
}

fn require_positive(parameter: &'static str, value: f64) -> ModelResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ModelError::invalid(parameter, format!("must be finite and > 0, got {value}")))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(weights: Vec<f64>) -> CorticalUnitParams {
        CorticalUnitParams {
            label: "AC".to_string(),
            comp: 1.0,
            weights,
            scale: 2.0,
            noise: 1.0,
        }
    }

    #[test]
    fn test_channel_validation() {
        let grid = AzimuthGrid::default();
        assert!(ChannelParams::new(-90.0, 1.0, 82.0, 2.6).validate(&grid).is_ok());

        let bad_shape = ChannelParams::new(0.0, 1.0, 82.0, 0.0);
        assert!(matches!(
            bad_shape.validate(&grid),
            Err(ModelError::InvalidParameter { parameter: "shp", .. })
        ));

        let bad_width = ChannelParams::new(0.0, 1.0, -1.0, 2.0);
        assert!(matches!(
            bad_width.validate(&grid),
            Err(ModelError::InvalidParameter { parameter: "wid", .. })
        ));

        let outside = ChannelParams::new(120.0, 1.0, 40.0, 2.0);
        assert!(matches!(
            outside.validate(&grid),
            Err(ModelError::InvalidParameter { parameter: "loc", .. })
        ));
    }

    #[test]
    fn test_unit_weight_mismatch() {
        let err = unit(vec![1.0]).validate(2).unwrap_err();
        assert!(matches!(err, ModelError::Configuration { .. }));
        assert!(unit(vec![1.0, 0.5]).validate(2).is_ok());
    }

    #[test]
    fn test_unit_negative_weight() {
        assert!(matches!(
            unit(vec![1.0, -0.2]).validate(2),
            Err(ModelError::InvalidParameter { parameter: "weights", .. })
        ));
    }

    #[test]
    fn test_unit_saturating_compression() {
        let mut u = unit(vec![1.0, 1.0]);
        u.comp = 18.0;
        assert!(u.validate(2).is_ok());

        u.comp = 50.0;
        assert!(matches!(
            u.validate(2),
            Err(ModelError::InvalidParameter { parameter: "comp", .. })
        ));
        assert!(1.0 - (-MAX_COMPRESSION_EXPONENT).exp() < 1.0);
    }

    #[test]
    fn test_unit_negative_compression() {
        let mut u = unit(vec![1.0]);
        u.comp = -0.5;
        assert!(matches!(
            u.validate(1),
            Err(ModelError::InvalidParameter { parameter: "comp", .. })
        ));
    }

    #[test]
    fn test_calibration_serde_shape() {
        let explicit: Calibration = serde_json::from_str(r#"{"kind": "explicit", "k": 0.091}"#).unwrap();
        assert_eq!(explicit, Calibration::Explicit { k: 0.091 });

        let from: Calibration =
            serde_json::from_str(r#"{"kind": "calibrate_from", "azimuth": 0.0, "maa": 5.79}"#).unwrap();
        assert_eq!(from, Calibration::CalibrateFrom { azimuth: 0.0, maa: 5.79 });

        assert!(Calibration::CalibrateFrom { azimuth: 0.0, maa: 0.0 }.validate().is_err());
        assert!(Calibration::Explicit { k: f64::NAN }.validate().is_err());
    }

    #[test]
    fn test_model_params_requires_channels() {
        let params = ModelParams {
            channels: vec![],
            cortical_units: vec![],
            prediction: PredictionParams {
                data: vec![],
                calibration: Calibration::Explicit { k: 1.0 },
            },
        };
        assert!(matches!(
            params.validate(&AzimuthGrid::default()),
            Err(ModelError::Configuration { .. })
        ));
    }
}
