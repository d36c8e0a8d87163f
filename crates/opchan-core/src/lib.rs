//! Opchan Core - data model and numerical kernels
//!
//! This crate provides the foundational types for the opponent-channel model
//! of spatial hearing: two overlapping, oppositely tuned azimuth channels
//! whose relative activity predicts minimum audible angles (MAA) and
//! auditory-cortex responses to a change in source location.
//!
//! # Modules
//!
//! - [`types`]: Azimuth grid, stimulus locations, response matrices
//! - [`params`]: Channel, cortical unit and prediction parameters
//! - [`error`]: Error taxonomy shared by every engine
//! - [`math`]: Generalized-Gaussian density, rescaling, gradients
//!
//! # Example
//!
//! ```rust
//! use opchan_core::math::{generalized_gaussian, normal_density};
//!
//! // Shape 2 reduces to a normal density with SD = width
//! let gg = generalized_gaussian(12.0, 0.0, 30.0, 2.0);
//! assert!((gg - normal_density(12.0, 0.0, 30.0)).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod math;
pub mod params;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{ModelError, ModelResult};
pub use params::{
    BehavioralRow, Calibration, ChannelParams, CorticalUnitParams, ModelParams, PredictionParams,
};
pub use types::{AzimuthGrid, ResponseMatrix, StimulusLocations};
