//! Forecast request/render cycle
//!
//! One call to [`ForecastRequester::run_forecast`] sends one query, waits for
//! the reply and draws one chart. Calls share nothing but the transport and
//! renderer, so concurrent runs are independent and may finish in any order.

use tracing::{debug, info, instrument, warn};

use crate::models::{
    BookingCurve, ChartSpec, ForecastQuery, ForecastResult, Prediction, PredictionFilter, Summary,
};
use crate::render::{ChartRenderer, RenderTarget};
use crate::transport::{ForecastTransport, TransportResponse};
use crate::{ForecastError, Result};

/// Backend path that scores a route/date/fare query
pub const RUN_QUERY_PATH: &str = "/run_query";
/// Backend path with aggregate prediction totals
pub const SUMMARY_PATH: &str = "/api/summary";

pub struct ForecastRequester<T, R> {
    transport: T,
    renderer: R,
}

impl<T: ForecastTransport, R: ChartRenderer> ForecastRequester<T, R> {
    pub fn new(transport: T, renderer: R) -> Self {
        Self {
            transport,
            renderer,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Send `query` and return the parsed estimate without drawing anything
    #[instrument(skip(self), fields(route = %query.route, flight_date = %query.flight_date, fare = %query.fare))]
    pub async fn fetch_forecast(&self, query: &ForecastQuery) -> Result<ForecastResult> {
        let payload = query.to_payload()?;
        debug!(bytes = payload.len(), "Posting forecast query");

        let response = self.transport.post_json(RUN_QUERY_PATH, payload).await?;
        let response = ensure_success(RUN_QUERY_PATH, response)?;

        let result = ForecastResult::from_body(&response.body)?;
        if !result.is_complete() {
            warn!(
                missing = ?result.missing_fields(),
                "Forecast response is missing fields, charting them as empty bars"
            );
        }
        Ok(result)
    }

    /// Send `query`, then draw demand and revenue as a bar chart into `target`.
    ///
    /// Nothing is drawn when the request, the status or the body fails.
    pub async fn run_forecast(
        &self,
        query: &ForecastQuery,
        target: &RenderTarget,
    ) -> Result<ForecastResult> {
        let result = self.fetch_forecast(query).await?;

        self.renderer
            .render(target, &ChartSpec::from(&result))
            .await?;

        info!(
            route = %query.route,
            demand = ?result.demand,
            revenue = ?result.revenue,
            "Forecast rendered to {target}"
        );
        Ok(result)
    }

    #[instrument(skip(self))]
    pub async fn fetch_summary(&self) -> Result<Summary> {
        let response = self.transport.get(SUMMARY_PATH).await?;
        let response = ensure_success(SUMMARY_PATH, response)?;
        Summary::from_body(&response.body)
    }

    /// Draw predicted against actual revenue from the backend summary
    pub async fn run_summary(&self, target: &RenderTarget) -> Result<Summary> {
        let summary = self.fetch_summary().await?;
        self.renderer
            .render(target, &ChartSpec::from(&summary))
            .await?;
        info!(flights = summary.total_flights, "Summary rendered to {target}");
        Ok(summary)
    }

    /// Prediction rows matching `filter`
    #[instrument(skip(self))]
    pub async fn fetch_predictions(&self, filter: &PredictionFilter) -> Result<Vec<Prediction>> {
        let path = filter.path();
        let response = self.transport.get(&path).await?;
        let response = ensure_success(&path, response)?;
        let rows = Prediction::list_from_body(&response.body)?;
        debug!(rows = rows.len(), "Predictions received");
        Ok(rows)
    }

    /// Draw predicted revenue per flight/class. An empty result draws nothing.
    pub async fn run_predictions(
        &self,
        filter: &PredictionFilter,
        target: &RenderTarget,
    ) -> Result<Vec<Prediction>> {
        let rows = self.fetch_predictions(filter).await?;
        if rows.is_empty() {
            warn!("No predictions match the filters, nothing to chart");
            return Ok(rows);
        }
        self.renderer
            .render(target, &ChartSpec::from(rows.as_slice()))
            .await?;
        info!(rows = rows.len(), "Predictions rendered to {target}");
        Ok(rows)
    }

    #[instrument(skip(self))]
    pub async fn fetch_curve(&self, flight_number: &str, class_code: &str) -> Result<BookingCurve> {
        let path = BookingCurve::path(flight_number, class_code)?;
        let response = self.transport.get(&path).await?;
        let response = ensure_success(&path, response)?;
        BookingCurve::from_body(&response.body)
    }

    /// Draw cumulative bookings by days before departure
    pub async fn run_curve(
        &self,
        flight_number: &str,
        class_code: &str,
        target: &RenderTarget,
    ) -> Result<BookingCurve> {
        let curve = self.fetch_curve(flight_number, class_code).await?;
        self.renderer
            .render(target, &ChartSpec::from(&curve))
            .await?;
        info!(
            flight = %curve.flight_number,
            class = %curve.class_code,
            points = curve.curve.len(),
            "Booking curve rendered to {target}"
        );
        Ok(curve)
    }
}

fn ensure_success(path: &str, response: TransportResponse) -> Result<TransportResponse> {
    if response.is_success() {
        return Ok(response);
    }
    warn!(status = response.status, "{path} answered with an error status");
    Err(ForecastError::status(response.status, error_message(&response)))
}

/// `{"error": "..."}` bodies are reduced to their message
fn error_message(response: &TransportResponse) -> String {
    match serde_json::from_slice::<serde_json::Value>(&response.body) {
        Ok(serde_json::Value::Object(map)) => match map.get("error") {
            Some(serde_json::Value::String(message)) => message.clone(),
            _ => response.body_text(),
        },
        _ => response.body_text(),
    }
}
