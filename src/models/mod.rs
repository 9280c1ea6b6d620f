//! Data models for the forecast client
//!
//! - Query: the payload sent to `/run_query`
//! - Result: the demand/revenue estimate parsed from the reply
//! - Summary: aggregate totals from `/api/summary`
//! - Prediction: per flight/class rows from `/api/predictions`
//! - Curve: cumulative bookings from `/api/curve/<flight>/<class>`
//! - Chart: the renderer-facing chart description

pub mod chart;
pub mod curve;
pub mod prediction;
pub mod query;
pub mod result;
pub mod summary;

pub use chart::{ChartKind, ChartSpec, Dataset};
pub use curve::{BookingCurve, CurvePoint};
pub use prediction::{Prediction, PredictionFilter};
pub use query::{Fare, ForecastQuery, Route};
pub use result::ForecastResult;
pub use summary::Summary;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{ForecastError, Result};

/// Parse a body that must be a JSON object. Derived `Deserialize` impls
/// also accept positional arrays, so the object shape is checked first.
pub(crate) fn from_json_object<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T> {
    let map: Map<String, Value> = serde_json::from_slice(body)
        .map_err(|e| ForecastError::parse(format!("{what} is not a JSON object: {e}")))?;
    serde_json::from_value(Value::Object(map))
        .map_err(|e| ForecastError::parse(format!("{what} is malformed: {e}")))
}

/// Parse a body that must be a JSON array of objects
pub(crate) fn from_json_rows<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<Vec<T>> {
    let rows: Vec<Map<String, Value>> = serde_json::from_slice(body)
        .map_err(|e| ForecastError::parse(format!("{what} is not a JSON array of objects: {e}")))?;
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            serde_json::from_value(Value::Object(row))
                .map_err(|e| ForecastError::parse(format!("{what} row {i} is malformed: {e}")))
        })
        .collect()
}
