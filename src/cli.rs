//! Command-line interface definitions
//!
//! | Command   | Description                                        |
//! |-----------|----------------------------------------------------|
//! | `run`     | Forecast one route/date/fare and chart the result  |
//! | `summary` | Chart predicted against actual revenue totals      |
//! | `predictions` | Chart predicted revenue per flight and class   |
//! | `curve`   | Chart the booking curve of one flight and class    |
//! | `config`  | Print the effective configuration                  |
//!
//! Running without a command is the same as `run` with the configured
//! default query.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use fareforecast::config::QueryConfig;
use fareforecast::render::RenderTarget;
use fareforecast::{ForecastQuery, PredictionFilter, Result};

#[derive(Debug, Parser)]
#[command(
    name = "fareforecast",
    version,
    about = "Route demand and revenue forecast client",
    long_about = "Asks a forecast backend for the expected passenger demand and revenue of a \
route, flight date and fare, then draws both numbers as a bar chart."
)]
pub struct Cli {
    /// Configuration file (defaults to <config dir>/fareforecast/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override the forecast server base URL
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forecast demand and revenue for one query and chart the result
    Run(RunArgs),
    /// Chart the backend's predicted against actual revenue totals
    Summary(OutputArgs),
    /// List per flight/class predictions and chart their predicted revenue
    Predictions(PredictionArgs),
    /// Chart cumulative bookings by days before departure
    Curve(CurveArgs),
    /// Print the effective configuration as JSON
    Config,
}

#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// Route as ORIGIN-DESTINATION airport codes, e.g. NBO-DXB
    #[arg(long)]
    pub route: Option<String>,

    /// Flight date as YYYY-MM-DD
    #[arg(long, value_name = "DATE")]
    pub flight_date: Option<String>,

    /// Fare in currency units
    #[arg(long)]
    pub fare: Option<f64>,

    /// Print the parsed forecast as JSON instead of drawing a chart
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Default, Args)]
pub struct PredictionArgs {
    /// Flight number, e.g. KQ310
    #[arg(long)]
    pub flight_number: Option<String>,

    /// Fare class code
    #[arg(long)]
    pub class_code: Option<String>,

    /// Cabin name, e.g. Economy
    #[arg(long)]
    pub cabin_name: Option<String>,

    /// Origin airport code
    #[arg(long)]
    pub origin: Option<String>,

    /// Destination airport code
    #[arg(long)]
    pub dest: Option<String>,

    /// Underpriced or Overpriced
    #[arg(long)]
    pub demand_signal: Option<String>,

    /// Maximum number of rows
    #[arg(long, default_value_t = 500)]
    pub limit: u32,

    /// Print the rows as JSON instead of drawing a chart
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Default, Args)]
pub struct CurveArgs {
    pub flight_number: String,

    pub class_code: String,

    /// Print the curve as JSON instead of drawing a chart
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Default, Args)]
pub struct OutputArgs {
    /// Write an SVG chart to PATH ("-" for stdout) instead of a text chart
    #[arg(long, value_name = "PATH")]
    pub svg: Option<PathBuf>,
}

impl RunArgs {
    /// Merge flags over the configured defaults
    pub fn to_query(&self, defaults: &QueryConfig) -> Result<ForecastQuery> {
        ForecastQuery::new(
            self.route.as_deref().unwrap_or(&defaults.route),
            self.flight_date.as_deref().unwrap_or(&defaults.flight_date),
            self.fare.unwrap_or(defaults.fare),
        )
    }
}

impl PredictionArgs {
    #[must_use]
    pub fn filter(&self) -> PredictionFilter {
        PredictionFilter {
            flight_number: self.flight_number.clone(),
            class_code: self.class_code.clone(),
            cabin_name: self.cabin_name.clone(),
            origin: self.origin.clone(),
            dest: self.dest.clone(),
            demand_signal: self.demand_signal.clone(),
            limit: Some(self.limit),
        }
    }
}

impl OutputArgs {
    #[must_use]
    pub fn target(&self) -> RenderTarget {
        match &self.svg {
            Some(path) if path.as_os_str() == "-" => RenderTarget::Stdout,
            Some(path) => RenderTarget::File(path.clone()),
            None => RenderTarget::Stdout,
        }
    }

    #[must_use]
    pub fn wants_svg(&self) -> bool {
        self.svg.is_some()
    }
}
