//! Opchan Application
//!
//! Command-line front-end for the opponent-channel spatial hearing model.
//! Resolves a listener-group preset or a parameter file, evaluates the model
//! and prints the requested figure as text tables or the whole result as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Young listener preset, every figure
//! opchan
//!
//! # MAA prediction only, as JSON
//! opchan evaluate --figure maa --format json
//!
//! # Older groups from a preset table file
//! opchan evaluate --params groups.json --preset older-old
//!
//! # Custom stimulus layout
//! opchan evaluate --locations=-45,-15,15,45 --figure response
//! ```

mod report;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use opchan_core::types::{DEFAULT_GRID_END, DEFAULT_GRID_START, DEFAULT_STIMULUS_LOCATIONS};
use opchan_core::AzimuthGrid;
use opchan_model::presets::{LISTENER_GROUPS, YOUNG};
use opchan_model::{evaluate_source, ModelConfig, ParameterSource, ParamsFile, PresetTable};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Opponent-channel spatial hearing model
#[derive(Parser, Debug)]
#[command(name = "opchan")]
#[command(author, version, about = "Opponent-channel model of spatial hearing", long_about = None)]
struct Cli {
    /// Logging verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate the model and print results (default if no subcommand)
    Evaluate(EvaluateArgs),

    /// List available presets
    Presets {
        /// Preset table file to merge over the built-in presets
        #[arg(long)]
        params: Option<PathBuf>,
    },
}

/// Which result to present
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Figure {
    /// Channel tuning curves
    Tuning,
    /// Channel gradients and their sum
    Gradient,
    /// Predicted MAA vs behavioral data
    Maa,
    /// Cortical response matrices
    Response,
    /// Everything above
    All,
}

/// Output encoding
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Plain-text tables
    Text,
    /// Full result as JSON
    Json,
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Listener-group preset name
    #[arg(short, long, default_value = YOUNG)]
    preset: String,

    /// JSON file with a parameter set (override) or a preset table
    #[arg(long)]
    params: Option<PathBuf>,

    /// First grid azimuth (degrees)
    #[arg(long, default_value_t = DEFAULT_GRID_START, allow_negative_numbers = true)]
    grid_start: i32,

    /// Last grid azimuth (degrees, inclusive)
    #[arg(long, default_value_t = DEFAULT_GRID_END, allow_negative_numbers = true)]
    grid_end: i32,

    /// Comma-separated stimulus azimuths (degrees)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    locations: Vec<f64>,

    /// Figure to print
    #[arg(short, long, value_enum, default_value_t = Figure::All)]
    figure: Figure,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

impl Default for EvaluateArgs {
    fn default() -> Self {
        Self {
            preset: YOUNG.to_string(),
            params: None,
            grid_start: DEFAULT_GRID_START,
            grid_end: DEFAULT_GRID_END,
            locations: Vec::new(),
            figure: Figure::All,
            format: Format::Text,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Opchan v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        None => run_evaluate(EvaluateArgs::default())?,
        Some(Commands::Evaluate(args)) => run_evaluate(args)?,
        Some(Commands::Presets { params }) => list_presets(params)?,
    }

    Ok(())
}

/// Built-in presets, with a preset table file merged over them if given
fn load_table(params: Option<PathBuf>) -> anyhow::Result<(PresetTable, Option<ParameterSource>)> {
    let builtin = PresetTable::builtin();
    let Some(path) = params else {
        return Ok((builtin, None));
    };

    info!("Loading parameters from {}", path.display());
    match ParamsFile::load(&path)? {
        ParamsFile::Single(params) => Ok((builtin, Some(ParameterSource::Override(params)))),
        ParamsFile::Table(table) => {
            debug!("Loaded {} presets", table.len());
            Ok((builtin.merged_with(table), None))
        }
    }
}

/// Evaluate and print
fn run_evaluate(args: EvaluateArgs) -> anyhow::Result<()> {
    let (table, override_source) = load_table(args.params)?;
    let source = override_source.unwrap_or_else(|| {
        info!("Preset: {}", args.preset);
        ParameterSource::Preset(args.preset.clone())
    });

    let config = ModelConfig {
        grid: AzimuthGrid::new(args.grid_start, args.grid_end)?,
        stimulus_locations: if args.locations.is_empty() {
            DEFAULT_STIMULUS_LOCATIONS.to_vec()
        } else {
            args.locations
        },
    };

    let output = evaluate_source(&source, &table, &config)?;
    info!(
        "Evaluated {} channels, {} cortical units, k = {:.4}",
        output.chans.len(),
        output.ac.len(),
        output.pred.k
    );

    match args.format {
        Format::Text => print!("{}", report::render(&output, args.figure)),
        Format::Json => println!("{}", serde_json::to_string_pretty(&output)?),
    }

    Ok(())
}

/// Print preset names
fn list_presets(params: Option<PathBuf>) -> anyhow::Result<()> {
    let (table, override_source) = load_table(params)?;
    if override_source.is_some() {
        warn!("Parameter file holds a single parameter set, not a preset table");
    }

    for name in table.names() {
        println!("{name}");
    }
    for group in LISTENER_GROUPS {
        if table.resolve(group).is_err() {
            info!("Listener group '{}' not loaded; supply it with --params", group);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use opchan_model::presets::young;

    use super::*;

    /// Write `contents` to a per-process temp file named after `tag`
    fn temp_params(tag: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("opchan-app-{tag}-{}.json", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_default_invocation() {
        let cli = Cli::try_parse_from(["opchan"]).unwrap();
        assert_eq!(cli.log_level, "info");
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_evaluate_args() {
        let cli = Cli::try_parse_from([
            "opchan",
            "evaluate",
            "--preset",
            "older-old",
            "--grid-start",
            "-60",
            "--grid-end",
            "60",
            "--locations",
            "-45,-15,15,45",
            "--figure",
            "maa",
            "--format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Evaluate(args)) => {
                assert_eq!(args.preset, "older-old");
                assert_eq!(args.grid_start, -60);
                assert_eq!(args.grid_end, 60);
                assert_eq!(args.locations, vec![-45.0, -15.0, 15.0, 45.0]);
                assert_eq!(args.figure, Figure::Maa);
                assert_eq!(args.format, Format::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_evaluate_defaults_match() {
        let cli = Cli::try_parse_from(["opchan", "evaluate"]).unwrap();
        let Some(Commands::Evaluate(parsed)) = cli.command else {
            panic!("expected evaluate");
        };
        let default = EvaluateArgs::default();

        assert_eq!(parsed.preset, default.preset);
        assert_eq!(parsed.grid_start, default.grid_start);
        assert_eq!(parsed.grid_end, default.grid_end);
        assert_eq!(parsed.locations, default.locations);
        assert_eq!(parsed.figure, default.figure);
        assert_eq!(parsed.format, default.format);
    }

    #[test]
    fn test_unknown_figure_rejected() {
        assert!(Cli::try_parse_from(["opchan", "evaluate", "--figure", "spectrum"]).is_err());
    }

    #[test]
    fn test_builtin_table_without_file() {
        let (table, source) = load_table(None).unwrap();
        assert!(source.is_none());
        assert!(table.resolve(YOUNG).is_ok());
    }

    #[test]
    fn test_single_set_file_overrides_preset() {
        let mut params = young();
        params.cortical_units[0].noise = 2.5;
        let path = temp_params("single", &serde_json::to_string(&params).unwrap());

        let (table, source) = load_table(Some(path.clone())).unwrap();
        assert_eq!(table.len(), 1);
        match source {
            Some(ParameterSource::Override(loaded)) => {
                assert_eq!(loaded.cortical_units[0].noise, 2.5);
                assert_eq!(loaded.channels.len(), params.channels.len());
            }
            other => panic!("expected an override, got {other:?}"),
        }

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_table_file_merges_presets() {
        let mut older = young();
        older.channels[0].wid = 95.0;
        let json = serde_json::json!({ "older-old": older }).to_string();
        let path = temp_params("table", &json);

        let (table, source) = load_table(Some(path.clone())).unwrap();
        assert!(source.is_none());
        assert_eq!(table.resolve("older-old").unwrap().channels[0].wid, 95.0);
        assert!(table.resolve(YOUNG).is_ok());

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_run_evaluate_override_as_json() {
        let path = temp_params("json", &serde_json::to_string(&young()).unwrap());
        let args = EvaluateArgs {
            preset: "not-a-preset".to_string(),
            params: Some(path.clone()),
            format: Format::Json,
            ..EvaluateArgs::default()
        };

        // The override wins over the unknown preset name
        assert!(run_evaluate(args).is_ok());

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_run_evaluate_errors() {
        let unknown = EvaluateArgs { preset: "older-old".to_string(), ..EvaluateArgs::default() };
        assert!(run_evaluate(unknown).is_err());

        let wide = EvaluateArgs {
            grid_start: -2_000_000_000,
            grid_end: 2_000_000_000,
            ..EvaluateArgs::default()
        };
        let err = run_evaluate(wide).unwrap_err();
        assert!(err.to_string().contains("grid"));
    }
}
