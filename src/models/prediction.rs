//! Per flight and fare class predictions served by `/api/predictions`

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::from_json_rows;
use crate::Result;

pub const PREDICTIONS_PATH: &str = "/api/predictions";

/// One predicted flight/class row. Columns the client does not model are
/// kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(default)]
    pub flight_id: Option<i64>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub flight_number: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub dest: Option<String>,
    #[serde(default)]
    pub class_code: Option<String>,
    #[serde(default)]
    pub cabin_name: Option<String>,
    /// `Underpriced` or `Overpriced`
    #[serde(default)]
    pub demand_signal: Option<String>,
    #[serde(default)]
    pub predicted_revenue: Option<f64>,
    #[serde(default)]
    pub actual_revenue: Option<f64>,
    #[serde(default)]
    pub load_factor_estimate: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Prediction {
    /// Parse the `/api/predictions` body
    pub fn list_from_body(body: &[u8]) -> Result<Vec<Self>> {
        from_json_rows(body, "predictions response")
    }

    /// Chart label, e.g. `KQ310 Y`
    #[must_use]
    pub fn label(&self) -> String {
        let flight = self.flight_number.as_deref().unwrap_or("?");
        match self.class_code.as_deref() {
            Some(class) => format!("{flight} {class}"),
            None => flight.to_string(),
        }
    }
}

// Flight numbers come back as numbers when the CSV column is numeric
fn text_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Null) | None => None,
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "expected text or number, got {other}"
            )));
        }
    })
}

/// Column filters for `/api/predictions`. The backend matches them
/// case-insensitively and returns at most `limit` rows (500 by default).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredictionFilter {
    pub flight_number: Option<String>,
    pub class_code: Option<String>,
    pub cabin_name: Option<String>,
    pub origin: Option<String>,
    pub dest: Option<String>,
    pub demand_signal: Option<String>,
    pub limit: Option<u32>,
}

impl PredictionFilter {
    /// Request path with the set filters as query parameters
    #[must_use]
    pub fn path(&self) -> String {
        let limit = self.limit.map(|l| l.to_string());
        let params: Vec<String> = [
            ("flight_number", self.flight_number.as_deref()),
            ("class_code", self.class_code.as_deref()),
            ("cabin_name", self.cabin_name.as_deref()),
            ("origin", self.origin.as_deref()),
            ("dest", self.dest.as_deref()),
            ("demand_signal", self.demand_signal.as_deref()),
            ("limit", limit.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .filter(|v| !v.is_empty())
                .map(|v| format!("{key}={}", urlencoding::encode(v)))
        })
        .collect();

        if params.is_empty() {
            PREDICTIONS_PATH.to_string()
        } else {
            format!("{PREDICTIONS_PATH}?{}", params.join("&"))
        }
    }
}
