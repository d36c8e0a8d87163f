//! Parameter resolution errors
//!
//! Failures from looking up presets and loading parameter files, using
//! `thiserror`. Numerical failures stay [`ModelError`]s and are wrapped here
//! only when a resolved source is evaluated in one step.

use std::path::PathBuf;

use opchan_core::ModelError;
use thiserror::Error;

/// Parameter resolver error types
#[derive(Error, Debug)]
pub enum ResolverError {
    /// No preset with this name in the table
    #[error("Unknown preset '{name}' (available: {available})")]
    UnknownPreset {
        /// Requested name
        name: String,
        /// Comma-separated names in the table
        available: String,
    },

    /// Parameter file could not be read
    #[error("Failed to read parameter file {path:?}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Parameter file is not valid JSON for a parameter set or preset table
    #[error("Failed to parse parameters: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resolved parameters failed to evaluate
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, ResolverError>;
