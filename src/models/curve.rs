//! Booking curve served by `/api/curve/<flight_number>/<class_code>`

use serde::{Deserialize, Serialize};

use super::from_json_object;
use crate::{ForecastError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub days_before: i64,
    pub cumulative_bookings: f64,
}

/// Cumulative bookings of one flight/class, furthest day first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingCurve {
    pub flight_number: String,
    pub class_code: String,
    pub flight_id: i64,
    pub curve: Vec<CurvePoint>,
}

impl BookingCurve {
    /// Request path for a flight/class; both are upper-cased like the
    /// backend does before matching
    pub fn path(flight_number: &str, class_code: &str) -> Result<String> {
        let flight_number = flight_number.trim();
        let class_code = class_code.trim();
        if flight_number.is_empty() || class_code.is_empty() {
            return Err(ForecastError::validation(
                "booking curve needs a flight number and a class code",
            ));
        }
        Ok(format!(
            "/api/curve/{}/{}",
            urlencoding::encode(&flight_number.to_ascii_uppercase()),
            urlencoding::encode(&class_code.to_ascii_uppercase())
        ))
    }

    pub fn from_body(body: &[u8]) -> Result<Self> {
        from_json_object(body, "booking curve response")
    }

    /// Bookings on the last day of the curve
    #[must_use]
    pub fn final_bookings(&self) -> Option<f64> {
        self.curve
            .iter()
            .min_by_key(|p| p.days_before)
            .map(|p| p.cumulative_bookings)
    }
}
