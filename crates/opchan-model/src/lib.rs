//! Opchan Model - opponent-channel spatial hearing engines
//!
//! This crate evaluates the opponent-channel model:
//! - Channel tuning curves and their gradients
//! - Auditory-cortex responses to a shift in source location
//! - Minimum audible angle (MAA) predictions from the summed gradient
//! - Named listener-group presets and JSON parameter files
//!
//! # Modules
//!
//! - [`tuning`]: Channel Tuning Engine
//! - [`response`]: Opponent Response Engine
//! - [`prediction`]: MAA Prediction Engine
//! - [`model`]: Single-call evaluation of all three
//! - [`presets`]: Parameter Resolver
//!
//! # Example
//!
//! ```rust
//! use opchan_model::{evaluate, presets, ModelConfig};
//!
//! let out = evaluate(&presets::young(), &ModelConfig::default()).unwrap();
//!
//! // No location change leaves only the baseline
//! let right_ac = &out.ac[1];
//! assert_eq!(right_ac.at(0.0, 0.0).unwrap(), right_ac.params.noise);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod model;
pub mod prediction;
pub mod presets;
pub mod response;
pub mod tuning;

// Re-export key types
pub use error::{ResolverError, ResolverResult};
pub use model::{evaluate, evaluate_source, ModelConfig, ModelOutput};
pub use prediction::{predict_maa, MaaComparison, MaaPrediction};
pub use presets::{ParameterSource, ParamsFile, PresetTable};
pub use response::{compute_response, compute_responses, CorticalResponse};
pub use tuning::{summed_gradient, tune_channel, tune_channels, TunedChannel};
