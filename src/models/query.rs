//! Forecast query model sent to the `/run_query` endpoint

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{ForecastError, Result};

/// Route used by the fixed dashboard invocation
pub const DEFAULT_ROUTE: &str = "NBO-DXB";
/// Flight date used by the fixed dashboard invocation
pub const DEFAULT_FLIGHT_DATE: &str = "2026-05-01";
/// Fare used by the fixed dashboard invocation
pub const DEFAULT_FARE: f64 = 500.0;

/// Wire format of `flight_date`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Origin/destination pair, encoded on the wire as `"NBO-DXB"`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    /// Three-letter origin airport code
    pub origin: String,
    /// Three-letter destination airport code
    pub destination: String,
}

impl Route {
    /// Create a route from two airport codes
    pub fn new(origin: &str, destination: &str) -> Result<Self> {
        let origin = normalize_airport_code(origin)?;
        let destination = normalize_airport_code(destination)?;
        if origin == destination {
            return Err(ForecastError::validation(format!(
                "route origin and destination are both {origin}"
            )));
        }
        Ok(Self {
            origin,
            destination,
        })
    }
}

fn normalize_airport_code(code: &str) -> Result<String> {
    let code = code.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ForecastError::validation(format!(
            "'{code}' is not a three-letter airport code"
        )));
    }
    Ok(code.to_ascii_uppercase())
}

impl FromStr for Route {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        let (origin, destination) = s.split_once('-').ok_or_else(|| {
            ForecastError::validation(format!("route '{s}' must look like ORIGIN-DESTINATION"))
        })?;
        Route::new(origin, destination)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.origin, self.destination)
    }
}

impl Serialize for Route {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Route {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Ticket price in currency units. Never negative, never NaN.
///
/// Whole amounts go over the wire as JSON integers so that a fare of 500
/// is sent as `500`, matching what the backend has always received.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Fare(f64);

impl Fare {
    pub fn new(amount: f64) -> Result<Self> {
        if !amount.is_finite() {
            return Err(ForecastError::validation(format!(
                "fare must be a finite number, got {amount}"
            )));
        }
        if amount < 0.0 {
            return Err(ForecastError::validation(format!(
                "fare must be non-negative, got {amount}"
            )));
        }
        Ok(Self(amount))
    }

    #[must_use]
    pub fn amount(self) -> f64 {
        self.0
    }

    fn as_whole(self) -> Option<u64> {
        // 2^53: largest range where every integer is exactly representable
        if self.0.fract() == 0.0 && self.0 <= 9_007_199_254_740_992.0 {
            Some(self.0 as u64)
        } else {
            None
        }
    }
}

impl fmt::Display for Fare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_whole() {
            Some(whole) => write!(f, "{whole}"),
            None => write!(f, "{:.2}", self.0),
        }
    }
}

impl Serialize for Fare {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.as_whole() {
            Some(whole) => serializer.serialize_u64(whole),
            None => serializer.serialize_f64(self.0),
        }
    }
}

impl<'de> Deserialize<'de> for Fare {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Fare::new(amount).map_err(serde::de::Error::custom)
    }
}

/// Query payload for one demand/revenue forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastQuery {
    pub route: Route,
    #[serde(with = "flight_date_format")]
    pub flight_date: NaiveDate,
    pub fare: Fare,
}

impl ForecastQuery {
    /// Build a query from raw user input, validating every field
    pub fn new(route: &str, flight_date: &str, fare: f64) -> Result<Self> {
        Ok(Self {
            route: route.parse()?,
            flight_date: parse_flight_date(flight_date)?,
            fare: Fare::new(fare)?,
        })
    }

    /// Serialize to the JSON body sent to the backend
    pub fn to_payload(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

impl Default for ForecastQuery {
    fn default() -> Self {
        Self {
            route: Route {
                origin: "NBO".to_string(),
                destination: "DXB".to_string(),
            },
            flight_date: NaiveDate::from_ymd_opt(2026, 5, 1).expect("valid calendar date"),
            fare: Fare(DEFAULT_FARE),
        }
    }
}

/// Parse an ISO-8601 `YYYY-MM-DD` flight date
pub fn parse_flight_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|e| {
        ForecastError::validation(format!("flight date '{raw}' is not YYYY-MM-DD: {e}"))
    })
}

mod flight_date_format {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::DATE_FORMAT;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}
