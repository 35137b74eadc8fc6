//! Command-line parsing for the SIR outbreak estimator.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "epi", version, about = "SIR outbreak stage estimation and forecasting")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Estimate stage coefficients from a case-count CSV, print the report,
    /// forecast forward, and optionally plot/export.
    Fit(FitArgs),
    /// Run the full pipeline on a deterministic synthetic outbreak.
    Demo(DemoArgs),
    /// Plot a previously exported forecast JSON.
    Plot(PlotArgs),
}

/// Model/reporting options shared by `fit` and `demo`.
#[derive(Debug, Args, Clone)]
pub struct ModelArgs {
    /// Total population size N.
    #[arg(short = 'N', long, default_value_t = 1_000_000)]
    pub population: u64,

    /// Assumed time-to-recovery in days (reporting lag between a case being
    /// counted and counted as recovered).
    #[arg(long, default_value_t = 14)]
    pub duration: usize,

    /// Interior historical stage boundaries as 0-based day offsets
    /// (comma-separated), e.g. `94,109,146`. Omit for a single stage.
    #[arg(long, value_delimiter = ',')]
    pub stages: Vec<usize>,

    /// Last predicted day (1-based day index of the forecast horizon).
    #[arg(long, default_value_t = 365)]
    pub horizon: usize,

    /// Interior future stage boundaries as 0-based day offsets
    /// (comma-separated). Omit for a single future stage.
    #[arg(long = "future-stages", value_delimiter = ',')]
    pub future_stages: Vec<usize>,

    /// Fixed beta change ratio for future stages after the first. When set,
    /// overrides the historical-event lookback.
    #[arg(long = "beta-ratio")]
    pub beta_ratio: Option<f64>,

    /// Historical stage index whose transition supplies the future beta
    /// ratio (`beta[i-1] / beta[i]`). Ignored when --beta-ratio is set.
    #[arg(long = "event-index", default_value_t = 2)]
    pub event_index: usize,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the combined per-day trajectory to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the forecast (coefficients + projected grid) to JSON.
    #[arg(long = "export-forecast")]
    pub export_forecast: Option<PathBuf>,
}

/// Options for fitting reported case counts.
#[derive(Debug, Parser)]
pub struct FitArgs {
    /// Observations CSV with columns `date,new_cases,total_cases`.
    #[arg(long, value_name = "CSV")]
    pub csv: PathBuf,

    #[command(flatten)]
    pub model: ModelArgs,
}

/// Options for the synthetic demo run.
#[derive(Debug, Parser)]
pub struct DemoArgs {
    /// Random seed for observation noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Log-scale observation noise (0 disables noise).
    #[arg(long, default_value_t = 0.05)]
    pub noise: f64,

    #[command(flatten)]
    pub model: ModelArgs,
}

/// Options for plotting a saved forecast.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Forecast JSON file produced by `epi fit --export-forecast`.
    #[arg(long, value_name = "JSON")]
    pub forecast: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
