//! End-to-end tests against an in-process forecast backend

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    routing::{get, post},
};
use serde_json::{Value, json};

use fareforecast::config::ServerConfig;
use fareforecast::{
    ChartRenderer, ChartSpec, ForecastError, ForecastQuery, ForecastRequester, HttpTransport,
    PredictionFilter, RenderTarget, Result, SvgRenderer, TextRenderer,
};

#[derive(Debug, Clone)]
struct SeenRequest {
    content_type: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct Backend {
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    /// Replies handed out in order; the last one repeats
    replies: Arc<Mutex<Vec<(StatusCode, String)>>>,
    delay: Duration,
}

impl Backend {
    fn replying(status: StatusCode, body: &str) -> Self {
        Self::with_replies(vec![(status, body.to_string())])
    }

    fn with_replies(replies: Vec<(StatusCode, String)>) -> Self {
        Self {
            seen: Arc::new(Mutex::new(Vec::new())),
            replies: Arc::new(Mutex::new(replies)),
            delay: Duration::ZERO,
        }
    }

    fn next_reply(&self) -> (StatusCode, String) {
        let mut replies = self.replies.lock().unwrap();
        if replies.len() > 1 {
            replies.remove(0)
        } else {
            replies[0].clone()
        }
    }

    fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

async fn run_query(
    State(backend): State<Backend>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    backend.seen.lock().unwrap().push(SeenRequest {
        content_type: headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });
    if !backend.delay.is_zero() {
        tokio::time::sleep(backend.delay).await;
    }
    backend.next_reply()
}

/// Scores by fare so concurrent runs get distinguishable answers
async fn echo_fare(body: Bytes) -> (StatusCode, String) {
    let query: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let fare = query["fare"].as_f64().unwrap_or(0.0);
    (
        StatusCode::OK,
        json!({"demand": fare * 2.0, "revenue": fare * 100.0}).to_string(),
    )
}

async fn summary(State(backend): State<Backend>) -> (StatusCode, String) {
    backend.next_reply()
}

/// Records the raw query string as the request body
async fn predictions(
    State(backend): State<Backend>,
    RawQuery(query): RawQuery,
) -> (StatusCode, String) {
    backend.seen.lock().unwrap().push(SeenRequest {
        content_type: None,
        body: query.map_or(Value::Null, Value::String),
    });
    backend.next_reply()
}

/// Knows one flight/class, like a backend with a single booking history
async fn curve(Path((flight, class)): Path<(String, String)>) -> (StatusCode, String) {
    if flight == "KQ310" && class == "Y" {
        let body = json!({
            "flight_number": flight,
            "class_code": class,
            "flight_id": 12,
            "curve": [
                {"days_before": 30, "cumulative_bookings": 15},
                {"days_before": 7, "cumulative_bookings": 96},
                {"days_before": 0, "cumulative_bookings": 151}
            ]
        });
        (StatusCode::OK, body.to_string())
    } else {
        (
            StatusCode::NOT_FOUND,
            json!({"error": "No data found"}).to_string(),
        )
    }
}

async fn spawn_backend(backend: Backend) -> String {
    let app = Router::new()
        .route("/run_query", post(run_query))
        .route("/echo/run_query", post(echo_fare))
        .route("/api/summary", get(summary))
        .route("/api/predictions", get(predictions))
        .route("/api/curve/{flight}/{class}", get(curve))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn transport(base_url: &str) -> HttpTransport {
    HttpTransport::new(&ServerConfig {
        base_url: base_url.to_string(),
        ..ServerConfig::default()
    })
    .unwrap()
}

#[derive(Default)]
struct RecordingRenderer {
    calls: Mutex<Vec<(RenderTarget, ChartSpec)>>,
}

impl RecordingRenderer {
    fn calls(&self) -> Vec<(RenderTarget, ChartSpec)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChartRenderer for RecordingRenderer {
    async fn render(&self, target: &RenderTarget, chart: &ChartSpec) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((target.clone(), chart.clone()));
        Ok(())
    }
}

#[tokio::test]
async fn test_fixed_query_reaches_backend_as_json_post() {
    let backend = Backend::replying(StatusCode::OK, r#"{"demand": 1200, "revenue": 45000}"#);
    let base_url = spawn_backend(backend.clone()).await;
    let requester = ForecastRequester::new(transport(&base_url), RecordingRenderer::default());

    requester
        .run_forecast(&ForecastQuery::default(), &RenderTarget::Stdout)
        .await
        .unwrap();

    let seen = backend.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(
        seen[0].body,
        json!({"route": "NBO-DXB", "flight_date": "2026-05-01", "fare": 500})
    );
}

#[tokio::test]
async fn test_happy_path_draws_demand_and_revenue() {
    let backend = Backend::replying(StatusCode::OK, r#"{"demand": 1200, "revenue": 45000}"#);
    let base_url = spawn_backend(backend).await;
    let requester = ForecastRequester::new(transport(&base_url), RecordingRenderer::default());
    let target = RenderTarget::File("dashboard/chart.svg".into());

    let result = requester
        .run_forecast(&ForecastQuery::default(), &target)
        .await
        .unwrap();
    assert_eq!(result.revenue, Some(45000.0));

    let calls = requester.renderer().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, target);
    assert_eq!(calls[0].1.kind.as_str(), "bar");
    assert_eq!(calls[0].1.labels, vec!["Demand", "Revenue"]);
    assert_eq!(calls[0].1.datasets[0].data, vec![Some(1200.0), Some(45000.0)]);
}

#[tokio::test]
async fn test_missing_revenue_is_charted_as_empty() {
    let backend = Backend::replying(StatusCode::OK, r#"{"demand": 1200}"#);
    let base_url = spawn_backend(backend).await;
    let requester = ForecastRequester::new(transport(&base_url), RecordingRenderer::default());

    requester
        .run_forecast(&ForecastQuery::default(), &RenderTarget::Stdout)
        .await
        .unwrap();

    let calls = requester.renderer().calls();
    assert_eq!(calls[0].1.datasets[0].data, vec![Some(1200.0), None]);
}

#[tokio::test]
async fn test_connection_refused_is_reported_without_render() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let requester = ForecastRequester::new(
        transport(&format!("http://{addr}")),
        RecordingRenderer::default(),
    );
    let err = requester
        .run_forecast(&ForecastQuery::default(), &RenderTarget::Stdout)
        .await
        .unwrap_err();

    assert!(matches!(err, ForecastError::Transport { .. }), "got {err}");
    assert!(requester.renderer().calls().is_empty());
}

#[tokio::test]
async fn test_server_error_is_reported_without_render() {
    let backend = Backend::replying(StatusCode::INTERNAL_SERVER_ERROR, "model not loaded");
    let base_url = spawn_backend(backend).await;
    let requester = ForecastRequester::new(transport(&base_url), RecordingRenderer::default());

    let err = requester
        .run_forecast(&ForecastQuery::default(), &RenderTarget::Stdout)
        .await
        .unwrap_err();

    match err {
        ForecastError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "model not loaded");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(requester.renderer().calls().is_empty());
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let mut backend = Backend::replying(StatusCode::OK, r#"{"demand": 1, "revenue": 1}"#);
    backend.delay = Duration::from_secs(3);
    let base_url = spawn_backend(backend).await;

    let transport = HttpTransport::new(&ServerConfig {
        base_url,
        timeout_seconds: 1,
        max_retries: 0,
    })
    .unwrap();
    let requester = ForecastRequester::new(transport, RecordingRenderer::default());

    let err = requester
        .fetch_forecast(&ForecastQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ForecastError::Transport { .. }), "got {err}");
}

#[tokio::test]
async fn test_transient_failure_is_retried_when_enabled() {
    let backend = Backend::with_replies(vec![
        (StatusCode::SERVICE_UNAVAILABLE, "warming up".to_string()),
        (StatusCode::OK, r#"{"demand": 7, "revenue": 70}"#.to_string()),
    ]);
    let base_url = spawn_backend(backend.clone()).await;

    let transport = HttpTransport::new(&ServerConfig {
        base_url,
        timeout_seconds: 10,
        max_retries: 1,
    })
    .unwrap();
    let requester = ForecastRequester::new(transport, RecordingRenderer::default());

    let result = requester
        .fetch_forecast(&ForecastQuery::default())
        .await
        .unwrap();
    assert_eq!(result.demand, Some(7.0));
    assert_eq!(backend.seen().len(), 2);
}

#[tokio::test]
async fn test_concurrent_runs_on_one_target_last_writer_wins() {
    let base_url = spawn_backend(Backend::replying(StatusCode::OK, "{}")).await;
    let dir = tempfile::tempdir().unwrap();
    let chart_path = dir.path().join("chart.txt");
    let target = RenderTarget::File(chart_path.clone());

    let requester = ForecastRequester::new(
        transport(&format!("{base_url}/echo")),
        TextRenderer::new(20),
    );
    let cheap = ForecastQuery::new("NBO-DXB", "2026-05-01", 100.0).unwrap();
    let dear = ForecastQuery::new("NBO-DXB", "2026-05-01", 900.0).unwrap();

    let (first, second) = tokio::join!(
        requester.run_forecast(&cheap, &target),
        requester.run_forecast(&dear, &target)
    );
    assert_eq!(first.unwrap().demand, Some(200.0));
    assert_eq!(second.unwrap().demand, Some(1800.0));

    let drawn = std::fs::read_to_string(&chart_path).unwrap();
    let from_cheap = drawn.contains("10000");
    let from_dear = drawn.contains("90000");
    assert!(from_cheap ^ from_dear, "target should hold exactly one chart: {drawn}");
}

#[tokio::test]
async fn test_svg_chart_is_written_to_file() {
    let backend = Backend::replying(StatusCode::OK, r#"{"demand": 1200, "revenue": 45000}"#);
    let base_url = spawn_backend(backend).await;
    let dir = tempfile::tempdir().unwrap();
    let chart_path = dir.path().join("out").join("forecast.svg");

    let requester = ForecastRequester::new(transport(&base_url), SvgRenderer::new(640, 400));
    requester
        .run_forecast(
            &ForecastQuery::default(),
            &RenderTarget::File(chart_path.clone()),
        )
        .await
        .unwrap();

    let svg = std::fs::read_to_string(&chart_path).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("Demand"));
    assert!(svg.contains("Revenue"));
}

#[tokio::test]
async fn test_summary_is_fetched_and_charted() {
    let backend = Backend::replying(
        StatusCode::OK,
        r#"{"total_flights": 12, "total_classes": 4, "total_predicted_revenue": 98000.0,
            "total_actual_revenue": 91000.0, "underpriced_count": 5, "overpriced_count": 2,
            "avg_load_factor": 0.78}"#,
    );
    let base_url = spawn_backend(backend).await;
    let requester = ForecastRequester::new(transport(&base_url), RecordingRenderer::default());

    let summary = requester.run_summary(&RenderTarget::Stdout).await.unwrap();
    assert_eq!(summary.total_flights, 12);

    let calls = requester.renderer().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1.labels, vec!["Predicted revenue", "Actual revenue"]);
    assert_eq!(calls[0].1.datasets[0].data, vec![Some(98000.0), Some(91000.0)]);
}

#[tokio::test]
async fn test_predictions_send_filters_as_query_string() {
    let rows = json!([
        {"flight_id": 1, "flight_number": "KQ310", "origin": "NBO", "dest": "DXB",
         "class_code": "Y", "cabin_name": "Economy", "demand_signal": "Underpriced",
         "predicted_revenue": 42000.0, "actual_revenue": 39000.0, "load_factor_estimate": 0.88},
        {"flight_id": 1, "flight_number": "KQ310", "origin": "NBO", "dest": "DXB",
         "class_code": "J", "cabin_name": "Business", "demand_signal": "Overpriced",
         "predicted_revenue": 61000.0, "actual_revenue": 64000.0, "load_factor_estimate": 0.71}
    ]);
    let backend = Backend::replying(StatusCode::OK, &rows.to_string());
    let base = spawn_backend(backend.clone()).await;
    let requester = ForecastRequester::new(transport(&base), RecordingRenderer::default());

    let filter = PredictionFilter {
        origin: Some("NBO".to_string()),
        cabin_name: Some("Premium Economy".to_string()),
        limit: Some(50),
        ..PredictionFilter::default()
    };
    let rows = requester
        .run_predictions(&filter, &RenderTarget::Stdout)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].cabin_name.as_deref(), Some("Business"));

    let seen = backend.seen();
    assert_eq!(
        seen[0].body,
        json!("cabin_name=Premium%20Economy&origin=NBO&limit=50")
    );

    let calls = requester.renderer().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1.labels, vec!["KQ310 Y", "KQ310 J"]);
}

#[tokio::test]
async fn test_curve_is_fetched_and_charted() {
    let base = spawn_backend(Backend::replying(StatusCode::OK, "{}")).await;
    let requester = ForecastRequester::new(transport(&base), RecordingRenderer::default());

    let curve = requester
        .run_curve("kq310", "y", &RenderTarget::Stdout)
        .await
        .unwrap();
    assert_eq!(curve.flight_id, 12);
    assert_eq!(curve.final_bookings(), Some(151.0));

    let calls = requester.renderer().calls();
    assert_eq!(calls[0].1.labels, vec!["D-30", "D-7", "D-0"]);
    assert_eq!(
        calls[0].1.datasets[0].data,
        vec![Some(15.0), Some(96.0), Some(151.0)]
    );
}

#[tokio::test]
async fn test_unknown_curve_reports_backend_error() {
    let base = spawn_backend(Backend::replying(StatusCode::OK, "{}")).await;
    let requester = ForecastRequester::new(transport(&base), RecordingRenderer::default());

    let err = requester
        .run_curve("KQ999", "Y", &RenderTarget::Stdout)
        .await
        .unwrap_err();
    match err {
        ForecastError::Status { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "No data found");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(requester.renderer().calls().is_empty());
}
