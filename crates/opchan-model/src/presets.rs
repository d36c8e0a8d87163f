//! Parameter Resolver
//!
//! Named listener-group presets and JSON parameter files.
//!
//! A [`PresetTable`] is an immutable map from preset name to a complete
//! [`ModelParams`]. The built-in table carries the "young" listener group;
//! the "younger-old" and "older-old" groups are loaded from a JSON table
//! file and merged over the built-ins.
//!
//! # File Formats
//!
//! A parameter file holds either a single parameter set:
//!
//! ```json
//! { "channels": [...], "cortical_units": [...], "prediction": {...} }
//! ```
//!
//! or a preset table keyed by name:
//!
//! ```json
//! { "younger-old": { "channels": [...], ... }, "older-old": { ... } }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use opchan_core::{
    BehavioralRow, Calibration, ChannelParams, CorticalUnitParams, ModelParams, PredictionParams,
};
use serde::{Deserialize, Serialize};

use crate::error::{ResolverError, ResolverResult};

/// Young normal-hearing listeners
pub const YOUNG: &str = "young";
/// Younger-old listeners
pub const YOUNGER_OLD: &str = "younger-old";
/// Older-old listeners
pub const OLDER_OLD: &str = "older-old";

/// Listener-group names recognized by the front-end
pub const LISTENER_GROUPS: [&str; 3] = [YOUNG, YOUNGER_OLD, OLDER_OLD];

// ============================================================================
// Preset Table
// ============================================================================

/// Immutable name → parameter set lookup
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetTable {
    presets: BTreeMap<String, ModelParams>,
}

impl PresetTable {
    /// Table with the bundled presets
    #[must_use]
    pub fn builtin() -> Self {
        let mut presets = BTreeMap::new();
        presets.insert(YOUNG.to_string(), young());
        Self { presets }
    }

    /// Parse a table from JSON
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::Parse`] on malformed JSON.
    pub fn from_json_str(json: &str) -> ResolverResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a table from a JSON file
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::Io`] if the file cannot be read and
    /// [`ResolverError::Parse`] on malformed JSON.
    pub fn from_json_file(path: impl AsRef<Path>) -> ResolverResult<Self> {
        Self::from_json_str(&read_file(path.as_ref())?)
    }

    /// Overlay `other` on this table; entries in `other` win
    #[must_use]
    pub fn merged_with(mut self, other: Self) -> Self {
        self.presets.extend(other.presets);
        self
    }

    /// Preset names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    /// Number of presets
    #[must_use]
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Whether the table has no presets
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Look up a preset by name
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::UnknownPreset`] listing the available names.
    pub fn resolve(&self, name: &str) -> ResolverResult<&ModelParams> {
        self.presets.get(name).ok_or_else(|| ResolverError::UnknownPreset {
            name: name.to_string(),
            available: self.names().collect::<Vec<_>>().join(", "),
        })
    }
}

// ============================================================================
// Parameter Sources
// ============================================================================

/// Where a parameter set comes from
#[derive(Clone, Debug, PartialEq)]
pub enum ParameterSource {
    /// Named preset from a table
    Preset(String),
    /// Fully specified parameter set
    Override(ModelParams),
}

impl ParameterSource {
    /// Resolve to a concrete parameter set
    ///
    /// Overrides are returned unchanged; they are validated when evaluated.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::UnknownPreset`] for a name not in `table`.
    pub fn resolve(&self, table: &PresetTable) -> ResolverResult<ModelParams> {
        match self {
            Self::Preset(name) => table.resolve(name).cloned(),
            Self::Override(params) => Ok(params.clone()),
        }
    }
}

/// Contents of a parameter file
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParamsFile {
    /// One parameter set, used as an override
    Single(ModelParams),
    /// Named presets, merged over the built-ins
    Table(PresetTable),
}

impl ParamsFile {
    /// Read and classify a parameter file
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::Io`] or [`ResolverError::Parse`].
    pub fn load(path: impl AsRef<Path>) -> ResolverResult<Self> {
        Ok(serde_json::from_str(&read_file(path.as_ref())?)?)
    }
}

fn read_file(path: &Path) -> ResolverResult<String> {
    std::fs::read_to_string(path).map_err(|source| ResolverError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ============================================================================
// Bundled Presets
// ============================================================================

/// Young listener group
///
/// Two hemifield channels peaking at ±90° and one auditory-cortex unit per
/// hemisphere, each weighted towards the contralateral channel.
#[must_use]
pub fn young() -> ModelParams {
    ModelParams {
        channels: vec![
            ChannelParams::new(-90.0, 1.0, 82.0, 2.6).with_label("Left"),
            ChannelParams::new(90.0, 1.0, 82.0, 2.6).with_label("Right"),
        ],
        cortical_units: vec![
            CorticalUnitParams {
                label: "Left AC".to_string(),
                comp: 1.6,
                weights: vec![0.45, 1.0],
                scale: 5.2,
                noise: 2.9814,
            },
            CorticalUnitParams {
                label: "Right AC".to_string(),
                comp: 1.4,
                weights: vec![1.0, 0.45],
                scale: 4.6,
                noise: 3.2907,
            },
        ],
        prediction: PredictionParams {
            data: vec![BehavioralRow { azimuth: 0.0, maa: 5.7903, ci: None }],
            calibration: Calibration::Explicit { k: 0.091 },
        },
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_builtin_young() {
        let table = PresetTable::builtin();
        let young = table.resolve(YOUNG).unwrap();

        assert_eq!(young.channels.len(), 2);
        assert_eq!(young.channels[1].loc, 90.0);
        assert_eq!(young.cortical_units[1].noise, 3.2907);
        assert_eq!(young.prediction.calibration, Calibration::Explicit { k: 0.091 });
        for unit in &young.cortical_units {
            assert_eq!(unit.weights.len(), young.channels.len());
        }
    }

    #[test]
    fn test_unknown_preset() {
        let err = PresetTable::builtin().resolve(OLDER_OLD).unwrap_err();
        match err {
            ResolverError::UnknownPreset { name, available } => {
                assert_eq!(name, "older-old");
                assert_eq!(available, "young");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_table_round_trip_and_merge() {
        let mut older = young();
        older.channels[0].wid = 95.0;
        older.channels[1].wid = 95.0;

        let json = serde_json::json!({ "older-old": older }).to_string();
        let loaded = PresetTable::from_json_str(&json).unwrap();
        let table = PresetTable::builtin().merged_with(loaded);

        assert_eq!(table.names().collect::<Vec<_>>(), vec!["older-old", "young"]);
        assert_eq!(table.resolve(OLDER_OLD).unwrap().channels[0].wid, 95.0);
        assert_eq!(table.resolve(YOUNG).unwrap().channels[0].wid, 82.0);
    }

    #[test]
    fn test_parameter_source() {
        let table = PresetTable::builtin();
        let from_preset = ParameterSource::Preset(YOUNG.to_string()).resolve(&table).unwrap();
        assert_eq!(from_preset, young());

        let mut custom = young();
        custom.prediction.calibration = Calibration::CalibrateFrom { azimuth: 0.0, maa: 5.7903 };
        let from_override = ParameterSource::Override(custom.clone()).resolve(&table).unwrap();
        assert_eq!(from_override, custom);
    }

    #[test]
    fn test_params_file_detection() {
        let dir = std::env::temp_dir();

        let single_path = dir.join(format!("opchan-single-{}.json", std::process::id()));
        let mut f = std::fs::File::create(&single_path).unwrap();
        f.write_all(serde_json::to_string(&young()).unwrap().as_bytes()).unwrap();
        assert!(matches!(ParamsFile::load(&single_path).unwrap(), ParamsFile::Single(_)));

        let table_path = dir.join(format!("opchan-table-{}.json", std::process::id()));
        let mut f = std::fs::File::create(&table_path).unwrap();
        f.write_all(serde_json::to_string(&PresetTable::builtin()).unwrap().as_bytes()).unwrap();
        match ParamsFile::load(&table_path).unwrap() {
            ParamsFile::Table(t) => assert_eq!(t.len(), 1),
            ParamsFile::Single(_) => panic!("table parsed as a single parameter set"),
        }

        std::fs::remove_file(single_path).ok();
        std::fs::remove_file(table_path).ok();
    }

    #[test]
    fn test_missing_file() {
        let err = ParamsFile::load("/nonexistent/opchan-params.json").unwrap_err();
        assert!(matches!(err, ResolverError::Io { .. }));
    }
}
