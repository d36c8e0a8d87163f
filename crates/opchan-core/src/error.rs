//! Error types for the opponent-channel model
//!
//! Every failure the model can detect is reported eagerly as a typed
//! [`ModelError`]. Nothing is clamped, defaulted or replaced by the nearest
//! grid sample; a failure aborts the whole evaluation.

use thiserror::Error;

/// Model error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A channel, cortical unit or grid parameter is outside its valid domain
    #[error("Invalid parameter {parameter}: {reason}")]
    InvalidParameter {
        /// Parameter name (e.g. "wid", "shp", "grid")
        parameter: &'static str,
        /// Reason
        reason: String,
    },

    /// Parameter groups are inconsistent with each other or with the grid
    #[error("Configuration error: {reason}")]
    Configuration {
        /// Reason
        reason: String,
    },

    /// An azimuth that must be an exact grid or stimulus sample is not one
    #[error("Lookup failed for {what}: azimuth {azimuth}° is not an exact sample")]
    Lookup {
        /// What was being looked up (e.g. "calibration reference")
        what: &'static str,
        /// Requested azimuth in degrees
        azimuth: f64,
    },

    /// A computation produced an infinite or NaN value
    #[error("Undefined result at azimuth {azimuth}°: {reason}")]
    UndefinedResult {
        /// Grid azimuth in degrees where the value is undefined
        azimuth: f64,
        /// Reason
        reason: String,
    },
}

impl ModelError {
    /// Shorthand for [`ModelError::InvalidParameter`]
    pub fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter { parameter, reason: reason.into() }
    }

    /// Shorthand for [`ModelError::Configuration`]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration { reason: reason.into() }
    }
}

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;
