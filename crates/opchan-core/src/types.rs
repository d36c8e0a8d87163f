//! Core types for the opponent-channel model
//!
//! - [`AzimuthGrid`]: the 1° evaluation grid for tuning curves and gradients
//! - [`StimulusLocations`]: presented azimuths, resolved to grid indices
//! - [`ResponseMatrix`]: N×N (pre-shift, post-shift) response surface
//!
//! Azimuths are in degrees: 0° straight ahead, negative left, positive right.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

// ============================================================================
// Azimuth Grid
// ============================================================================

/// Default grid start (degrees)
pub const DEFAULT_GRID_START: i32 = -90;
/// Default grid end (degrees, inclusive)
pub const DEFAULT_GRID_END: i32 = 90;
/// Largest grid bound magnitude (degrees); azimuth wraps at ±180°
pub const MAX_AZIMUTH: i32 = 180;
/// Default stimulus azimuths (degrees)
pub const DEFAULT_STIMULUS_LOCATIONS: [f64; 5] = [-60.0, -30.0, 0.0, 30.0, 60.0];

/// Ordered evaluation azimuths with a fixed 1° step.
///
/// Both bounds are inclusive, so `-90..=90` holds 181 samples.
///
/// # Example
///
/// ```
/// use opchan_core::types::AzimuthGrid;
///
/// let grid = AzimuthGrid::new(-90, 90).unwrap();
/// assert_eq!(grid.len(), 181);
/// assert_eq!(grid.index_of(0.0), Some(90));
/// assert_eq!(grid.index_of(0.5), None);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridBounds")]
pub struct AzimuthGrid {
    start: i32,
    end: i32,
}

/// Unchecked grid bounds used for deserialization
#[derive(Deserialize)]
struct GridBounds {
    start: i32,
    end: i32,
}

impl TryFrom<GridBounds> for AzimuthGrid {
    type Error = ModelError;

    fn try_from(bounds: GridBounds) -> ModelResult<Self> {
        Self::new(bounds.start, bounds.end)
    }
}

impl AzimuthGrid {
    /// Create a grid covering `start..=end` in 1° steps
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] if `start >= end` or either
    /// bound lies outside `±MAX_AZIMUTH`.
    pub fn new(start: i32, end: i32) -> ModelResult<Self> {
        let bounds = -MAX_AZIMUTH..=MAX_AZIMUTH;
        if !bounds.contains(&start) || !bounds.contains(&end) {
            return Err(ModelError::invalid(
                "grid",
                format!("bounds {start}°..={end}° exceed ±{MAX_AZIMUTH}°"),
            ));
        }
        if start >= end {
            return Err(ModelError::invalid(
                "grid",
                format!("start ({start}°) must be below end ({end}°)"),
            ));
        }
        Ok(Self { start, end })
    }

    /// First azimuth (degrees)
    #[inline]
    #[must_use]
    pub const fn start(&self) -> i32 {
        self.start
    }

    /// Last azimuth (degrees, inclusive)
    #[inline]
    #[must_use]
    pub const fn end(&self) -> i32 {
        self.end
    }

    /// Number of samples
    #[inline]
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    /// A valid grid always has at least two samples
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Azimuth of sample `index`
    ///
    /// Grid bounds are limited to `±MAX_AZIMUTH`, so any in-range index
    /// fits in an `i32`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn azimuth_at(&self, index: usize) -> f64 {
        f64::from(self.start + index as i32)
    }

    /// Iterate over all azimuths in ascending order
    pub fn azimuths(&self) -> impl Iterator<Item = f64> + '_ {
        (self.start..=self.end).map(f64::from)
    }

    /// All azimuths collected into a vector
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        self.azimuths().collect()
    }

    /// Whether `azimuth` lies within `[start, end]`
    #[must_use]
    pub fn covers(&self, azimuth: f64) -> bool {
        azimuth >= f64::from(self.start) && azimuth <= f64::from(self.end)
    }

    /// Index of `azimuth`, which must be an exact grid sample
    ///
    /// Non-integral, non-finite and out-of-range azimuths return `None`;
    /// there is no nearest-sample fallback.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::float_cmp)]
    pub fn index_of(&self, azimuth: f64) -> Option<usize> {
        if !azimuth.is_finite() || azimuth.fract() != 0.0 || !self.covers(azimuth) {
            return None;
        }
        Some((azimuth - f64::from(self.start)) as usize)
    }
}

impl Default for AzimuthGrid {
    fn default() -> Self {
        Self { start: DEFAULT_GRID_START, end: DEFAULT_GRID_END }
    }
}

// ============================================================================
// Stimulus Locations
// ============================================================================

/// Presented stimulus azimuths and their grid indices
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StimulusLocations {
    azimuths: Vec<f64>,
    #[serde(skip)]
    indices: Vec<usize>,
}

impl StimulusLocations {
    /// Resolve each azimuth to its exact grid index
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Configuration`] if the list is empty or any
    /// azimuth is not an exact grid sample.
    pub fn resolve(grid: &AzimuthGrid, azimuths: &[f64]) -> ModelResult<Self> {
        if azimuths.is_empty() {
            return Err(ModelError::configuration("no stimulus locations given"));
        }

        let indices = azimuths
            .iter()
            .map(|&az| {
                grid.index_of(az).ok_or_else(|| {
                    ModelError::configuration(format!(
                        "stimulus location {az}° is not a sample of grid {}..={}",
                        grid.start(),
                        grid.end()
                    ))
                })
            })
            .collect::<ModelResult<Vec<_>>>()?;

        Ok(Self { azimuths: azimuths.to_vec(), indices })
    }

    /// Number of locations (N in the N×N response matrices)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.azimuths.len()
    }

    /// Always false for a resolved set
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.azimuths.is_empty()
    }

    /// Stimulus azimuths in presentation order
    #[must_use]
    pub fn azimuths(&self) -> &[f64] {
        &self.azimuths
    }

    /// Grid indices, parallel to [`Self::azimuths`]
    #[must_use]
    pub fn grid_indices(&self) -> &[usize] {
        &self.indices
    }

    /// Position of `azimuth` within the stimulus set
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn position_of(&self, azimuth: f64) -> Option<usize> {
        self.azimuths.iter().position(|&az| az == azimuth)
    }
}

// ============================================================================
// Response Matrix
// ============================================================================

/// Square response surface indexed `[pre_index][post_index]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseMatrix {
    /// Rows, one per pre-shift location
    rows: Vec<Vec<f64>>,
}

impl ResponseMatrix {
    /// All-zero `size`×`size` matrix
    #[must_use]
    pub fn zeros(size: usize) -> Self {
        Self { rows: vec![vec![0.0; size]; size] }
    }

    /// Side length
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// Value for a (pre, post) index pair
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, pre: usize, post: usize) -> f64 {
        self.rows[pre][post]
    }

    /// Mutable access to a single cell
    #[inline]
    pub fn get_mut(&mut self, pre: usize, post: usize) -> &mut f64 {
        &mut self.rows[pre][post]
    }

    /// Responses for every post-shift location from one pre-shift location
    #[must_use]
    pub fn row(&self, pre: usize) -> &[f64] {
        &self.rows[pre]
    }

    /// Iterate over rows
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// No-shift responses `[i][i]`
    #[must_use]
    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.size()).map(|i| self.rows[i][i]).collect()
    }

    /// Apply `f` to every cell
    pub fn map_in_place(&mut self, mut f: impl FnMut(f64) -> f64) {
        for value in self.rows.iter_mut().flatten() {
            *value = f(*value);
        }
    }

    /// Smallest and largest cell values
    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        self.rows
            .iter()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }
}

// ============================================================================
// Tests
// ============================================================================
