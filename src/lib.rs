//! `FareForecast` - route demand and revenue forecast client
//!
//! Sends a route/date/fare query to a forecast backend, parses the
//! demand and revenue estimate it returns and draws the two numbers as a
//! bar chart into an explicit render target.

pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod requester;
pub mod telemetry;
pub mod transport;

// Re-export core types for public API
pub use config::ForecastConfig;
pub use error::ForecastError;
pub use models::{
    BookingCurve, ChartSpec, ForecastQuery, ForecastResult, Prediction, PredictionFilter, Summary,
};
pub use render::{ChartRenderer, RenderTarget, SvgRenderer, TextRenderer};
pub use requester::ForecastRequester;
pub use transport::{ForecastTransport, HttpTransport, TransportResponse};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ForecastError>;
