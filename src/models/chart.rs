//! Chart description handed to a renderer

use serde::{Deserialize, Serialize};

use super::{BookingCurve, ForecastResult, Prediction, Summary};

pub const DEMAND_LABEL: &str = "Demand";
pub const REVENUE_LABEL: &str = "Revenue";

/// Chart type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
}

impl ChartKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
        }
    }
}

/// One series of values, in the same order as the chart labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub label: Option<String>,
    /// `None` marks a value the backend did not send
    pub data: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub title: Option<String>,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartSpec {
    /// Single-dataset bar chart
    #[must_use]
    pub fn bar(labels: &[&str], values: Vec<Option<f64>>) -> Self {
        Self {
            kind: ChartKind::Bar,
            title: None,
            labels: labels.iter().map(|l| (*l).to_string()).collect(),
            datasets: vec![Dataset {
                label: None,
                data: values,
            }],
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Pairs of label and value from the first dataset
    pub fn bars(&self) -> impl Iterator<Item = (&str, Option<f64>)> + '_ {
        let data = self
            .datasets
            .first()
            .map(|d| d.data.as_slice())
            .unwrap_or_default();
        self.labels
            .iter()
            .enumerate()
            .map(move |(i, label)| (label.as_str(), data.get(i).copied().flatten()))
    }

    /// Lowest and highest drawable value, always spanning zero
    #[must_use]
    pub fn value_bounds(&self) -> (f64, f64) {
        let mut low = 0.0_f64;
        let mut high = 0.0_f64;
        for value in self.datasets.iter().flat_map(|d| d.data.iter().flatten()) {
            low = low.min(*value);
            high = high.max(*value);
        }
        if low == high {
            high = low + 1.0;
        }
        (low, high)
    }
}

impl From<&ForecastResult> for ChartSpec {
    fn from(result: &ForecastResult) -> Self {
        ChartSpec::bar(&[DEMAND_LABEL, REVENUE_LABEL], vec![result.demand, result.revenue])
    }
}

impl From<&Summary> for ChartSpec {
    fn from(summary: &Summary) -> Self {
        ChartSpec::bar(
            &["Predicted revenue", "Actual revenue"],
            vec![
                Some(summary.total_predicted_revenue),
                Some(summary.total_actual_revenue),
            ],
        )
        .with_title(format!(
            "{} flights, load factor {:.1}%",
            summary.total_flights,
            summary.avg_load_factor * 100.0
        ))
    }
}

impl From<&[Prediction]> for ChartSpec {
    fn from(rows: &[Prediction]) -> Self {
        let labels: Vec<String> = rows.iter().map(Prediction::label).collect();
        let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
        ChartSpec::bar(&labels, rows.iter().map(|r| r.predicted_revenue).collect())
            .with_title("Predicted revenue by flight and class")
    }
}

impl From<&BookingCurve> for ChartSpec {
    fn from(curve: &BookingCurve) -> Self {
        let labels: Vec<String> = curve
            .curve
            .iter()
            .map(|p| format!("D-{}", p.days_before))
            .collect();
        let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
        ChartSpec::bar(
            &labels,
            curve
                .curve
                .iter()
                .map(|p| Some(p.cumulative_bookings))
                .collect(),
        )
        .with_title(format!(
            "{} {} cumulative bookings",
            curve.flight_number, curve.class_code
        ))
    }
}
