//! Configuration management for the forecast client
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::ForecastError;
use crate::models::ForecastQuery;
use crate::models::query::{DEFAULT_FARE, DEFAULT_FLIGHT_DATE, DEFAULT_ROUTE};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Prefix for environment overrides, e.g. `FAREFORECAST_SERVER__BASE_URL`
pub const ENV_PREFIX: &str = "FAREFORECAST";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Forecast backend connection settings
    pub server: ServerConfig,
    /// Query used when no flags are given
    pub query: QueryConfig,
    /// Chart drawing settings
    pub chart: ChartConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Forecast backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL that `/run_query` is resolved against
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Retries for transient failures; 0 sends exactly one request
    pub max_retries: u32,
}

/// Default query parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub route: String,
    pub flight_date: String,
    pub fare: f64,
}

/// Chart drawing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// SVG width in pixels
    pub width: u32,
    /// SVG height in pixels
    pub height: u32,
    /// Caption drawn above forecast charts
    pub title: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

// Default value functions
fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_chart_width() -> u32 {
    800
}

fn default_chart_height() -> u32 {
    500
}

fn default_chart_title() -> String {
    "Forecast".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            max_retries: 0,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            route: DEFAULT_ROUTE.to_string(),
            flight_date: DEFAULT_FLIGHT_DATE.to_string(),
            fare: DEFAULT_FARE,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_chart_width(),
            height: default_chart_height(),
            title: default_chart_title(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ForecastConfig {
    /// Load configuration from the default file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: ForecastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("fareforecast").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.base_url.is_empty() {
            self.server.base_url = default_base_url();
        }
        if self.server.timeout_seconds == 0 {
            self.server.timeout_seconds = default_timeout();
        }
        if self.chart.width == 0 {
            self.chart.width = default_chart_width();
        }
        if self.chart.height == 0 {
            self.chart.height = default_chart_height();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        self.server.base_url = self.server.base_url.trim_end_matches('/').to_string();
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.default_query()
            .with_context(|| "Invalid [query] section")?;
        Ok(())
    }

    /// The query described by the `[query]` section
    pub fn default_query(&self) -> crate::Result<ForecastQuery> {
        ForecastQuery::new(&self.query.route, &self.query.flight_date, self.query.fare)
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.timeout_seconds > 300 {
            return Err(
                ForecastError::config("Server timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.server.max_retries > 10 {
            return Err(ForecastError::config("Server max retries cannot exceed 10").into());
        }

        if !(100..=4000).contains(&self.chart.width) || !(100..=4000).contains(&self.chart.height)
        {
            return Err(ForecastError::config(
                "Chart width and height must be between 100 and 4000 pixels",
            )
            .into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ForecastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ForecastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.server.base_url.starts_with("http://")
            && !self.server.base_url.starts_with("https://")
        {
            return Err(ForecastError::config(
                "Server base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }
}
