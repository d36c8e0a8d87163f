//! MAA Prediction Engine
//!
//! Maps the summed channel gradient to a predicted minimum audible angle.
//! A steeper local gradient means finer discrimination, so the prediction is
//! proportional to the inverse gradient:
//!
//! ```text
//! igrads = 1 / grads
//! maas   = igrads · k
//! ```
//!
//! `k` is either supplied directly or derived from one (azimuth, MAA)
//! reference pair so that the prediction at that azimuth matches it.

use opchan_core::math::reciprocal;
use opchan_core::{AzimuthGrid, BehavioralRow, Calibration, ModelError, ModelResult, PredictionParams};
use serde::{Deserialize, Serialize};

/// Predicted MAA over the azimuth grid
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaaPrediction {
    /// Behavioral reference data, passed through unchanged
    pub data: Vec<BehavioralRow>,
    /// Calibration the prediction was built with
    pub calibration: Calibration,
    /// Resolved conversion factor (degrees per inverse-gradient unit)
    pub k: f64,
    /// Reference azimuths (the grid)
    pub refs: Vec<f64>,
    /// Summed channel gradient
    pub grads: Vec<f64>,
    /// Inverse gradient
    pub igrads: Vec<f64>,
    /// Predicted MAA (degrees)
    pub maas: Vec<f64>,
}

/// Observed vs predicted MAA at one behavioral reference azimuth
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaaComparison {
    /// Reference azimuth (degrees)
    pub azimuth: f64,
    /// Observed MAA (degrees)
    pub observed: f64,
    /// Confidence interval half-width, if reported
    pub ci: Option<f64>,
    /// Predicted MAA (degrees)
    pub predicted: f64,
}

impl MaaComparison {
    /// Predicted minus observed (degrees)
    #[must_use]
    pub fn residual(&self) -> f64 {
        self.predicted - self.observed
    }

    /// Whether the prediction falls inside the reported confidence interval
    #[must_use]
    pub fn within_ci(&self) -> Option<bool> {
        self.ci.map(|ci| self.residual().abs() <= ci)
    }
}

impl MaaPrediction {
    /// Predicted MAA at a grid azimuth
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Lookup`] if `azimuth` is not an exact grid sample.
    #[allow(clippy::float_cmp)]
    pub fn maa_at(&self, azimuth: f64) -> ModelResult<f64> {
        self.refs
            .iter()
            .position(|&r| r == azimuth)
            .map(|i| self.maas[i])
            .ok_or(ModelError::Lookup { what: "MAA reference azimuth", azimuth })
    }

    /// Pair every behavioral row with the prediction at its azimuth
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Lookup`] for a row whose azimuth is not a grid
    /// sample.
    pub fn compare_with_data(&self) -> ModelResult<Vec<MaaComparison>> {
        self.data
            .iter()
            .map(|row| {
                Ok(MaaComparison {
                    azimuth: row.azimuth,
                    observed: row.maa,
                    ci: row.ci,
                    predicted: self.maa_at(row.azimuth)?,
                })
            })
            .collect()
    }
}

/// Predict MAA from the summed channel gradient
///
/// # Errors
///
/// - [`ModelError::UndefinedResult`] if any gradient sample is zero, which
///   would make the MAA there infinite
/// - [`ModelError::Lookup`] if the calibration azimuth is not a grid sample
/// - [`ModelError::Configuration`] if `grads` does not cover the grid
pub fn predict_maa(grid: &AzimuthGrid, grads: Vec<f64>, params: &PredictionParams) -> ModelResult<MaaPrediction> {
    if grads.len() != grid.len() {
        return Err(ModelError::configuration(format!(
            "gradient has {} samples for a {}-sample grid",
            grads.len(),
            grid.len()
        )));
    }
    params.calibration.validate()?;

    if let Some(i) = grads.iter().position(|&g| g.is_nan() || g <= 0.0) {
        return Err(ModelError::UndefinedResult {
            azimuth: grid.azimuth_at(i),
            reason: format!("summed channel gradient is {}, MAA would be infinite", grads[i]),
        });
    }

    let igrads = reciprocal(&grads);

    let k = match params.calibration {
        Calibration::Explicit { k } => k,
        Calibration::CalibrateFrom { azimuth, maa } => {
            let idx = grid
                .index_of(azimuth)
                .ok_or(ModelError::Lookup { what: "calibration reference", azimuth })?;
            maa / igrads[idx]
        }
    };

    let maas: Vec<f64> = igrads.iter().map(|ig| ig * k).collect();

    tracing::debug!(k, samples = maas.len(), "predicted MAA");

    Ok(MaaPrediction {
        data: params.data.clone(),
        calibration: params.calibration,
        k,
        refs: grid.to_vec(),
        grads,
        igrads,
        maas,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(grid: &AzimuthGrid) -> Vec<f64> {
        grid.azimuths().map(|x| 0.03 - x.abs() * 1e-4).collect()
    }

    fn explicit(k: f64) -> PredictionParams {
        PredictionParams { data: vec![], calibration: Calibration::Explicit { k } }
    }

    #[test]
    fn test_explicit_factor() {
        let grid = AzimuthGrid::default();
        let grads = ramp(&grid);
        let pred = predict_maa(&grid, grads.clone(), &explicit(0.091)).unwrap();

        assert_eq!(pred.k, 0.091);
        assert_eq!(pred.refs.len(), grid.len());
        for i in 0..grid.len() {
            assert!((pred.maas[i] - 0.091 / grads[i]).abs() < 1e-12);
            assert!((pred.igrads[i] * grads[i] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_calibration_round_trip() {
        let grid = AzimuthGrid::default();
        let params = PredictionParams {
            data: vec![],
            calibration: Calibration::CalibrateFrom { azimuth: 30.0, maa: 4.2 },
        };
        let pred = predict_maa(&grid, ramp(&grid), &params).unwrap();
        assert!((pred.maa_at(30.0).unwrap() - 4.2).abs() < 1e-12);
        // Larger gradient at the midline ⇒ finer acuity there
        assert!(pred.maa_at(0.0).unwrap() < pred.maa_at(60.0).unwrap());
    }

    #[test]
    fn test_calibration_off_grid() {
        let grid = AzimuthGrid::default();
        let params = PredictionParams {
            data: vec![],
            calibration: Calibration::CalibrateFrom { azimuth: 7.5, maa: 4.2 },
        };
        let err = predict_maa(&grid, ramp(&grid), &params).unwrap_err();
        assert!(matches!(err, ModelError::Lookup { azimuth, .. } if azimuth == 7.5));
    }

    #[test]
    fn test_zero_gradient_is_undefined() {
        let grid = AzimuthGrid::new(-5, 5).unwrap();
        let mut grads = vec![0.1; grid.len()];
        grads[7] = 0.0;
        let err = predict_maa(&grid, grads, &explicit(1.0)).unwrap_err();
        assert!(matches!(err, ModelError::UndefinedResult { azimuth, .. } if azimuth == 2.0));
    }

    #[test]
    fn test_gradient_length_mismatch() {
        let grid = AzimuthGrid::new(-5, 5).unwrap();
        let err = predict_maa(&grid, vec![0.1; 3], &explicit(1.0)).unwrap_err();
        assert!(matches!(err, ModelError::Configuration { .. }));
    }

    #[test]
    fn test_compare_with_data() {
        let grid = AzimuthGrid::new(-10, 10).unwrap();
        let params = PredictionParams {
            data: vec![
                BehavioralRow { azimuth: 0.0, maa: 1.0, ci: Some(0.5) },
                BehavioralRow { azimuth: 10.0, maa: 3.0, ci: None },
            ],
            calibration: Calibration::Explicit { k: 0.1 },
        };
        let pred = predict_maa(&grid, vec![0.1; grid.len()], &params).unwrap();
        let rows = pred.compare_with_data().unwrap();

        assert_eq!(rows.len(), 2);
        assert!((rows[0].predicted - 1.0).abs() < 1e-12);
        assert_eq!(rows[0].within_ci(), Some(true));
        assert!((rows[1].residual() + 2.0).abs() < 1e-12);
        assert_eq!(rows[1].within_ci(), None);
    }

    #[test]
    fn test_compare_with_off_grid_row() {
        let grid = AzimuthGrid::new(-10, 10).unwrap();
        let params = PredictionParams {
            data: vec![BehavioralRow { azimuth: 45.0, maa: 8.0, ci: None }],
            calibration: Calibration::Explicit { k: 0.1 },
        };
        let pred = predict_maa(&grid, vec![0.1; grid.len()], &params).unwrap();
        assert!(pred.compare_with_data().is_err());
    }
}
