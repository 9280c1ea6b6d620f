//! Forecast result model parsed from the `/run_query` response

use serde::{Deserialize, Serialize};

use super::from_json_object;
use crate::Result;

/// Demand and revenue estimate returned by the backend.
///
/// The backend never publishes a schema, so both fields are optional: a
/// missing or `null` value is kept as `None` and flows into the chart as
/// an empty bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Expected passenger demand (unit defined by the backend)
    #[serde(default)]
    pub demand: Option<f64>,
    /// Expected revenue in currency units
    #[serde(default)]
    pub revenue: Option<f64>,
}

impl ForecastResult {
    /// Parse a response body. Unknown fields are ignored.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        from_json_object(body, "forecast response")
    }

    /// True when the backend answered with both numbers
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.demand.is_some() && self.revenue.is_some()
    }

    /// Names of the fields the backend left out
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.demand.is_none() {
            missing.push("demand");
        }
        if self.revenue.is_none() {
            missing.push("revenue");
        }
        missing
    }
}
