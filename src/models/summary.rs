//! Aggregate prediction summary served by `/api/summary`

use serde::{Deserialize, Serialize};

use super::from_json_object;
use crate::Result;

/// Totals across every predicted flight and fare class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_flights: u64,
    pub total_classes: u64,
    pub total_predicted_revenue: f64,
    pub total_actual_revenue: f64,
    pub underpriced_count: u64,
    pub overpriced_count: u64,
    /// Mean booked share of capacity, 0.0 to 1.0
    pub avg_load_factor: f64,
}

impl Summary {
    pub fn from_body(body: &[u8]) -> Result<Self> {
        from_json_object(body, "summary response")
    }

    /// Predicted minus actual revenue
    #[must_use]
    pub fn revenue_gap(&self) -> f64 {
        self.total_predicted_revenue - self.total_actual_revenue
    }
}
