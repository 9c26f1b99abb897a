//! HTTP surface over the scraper.
//!
//! Endpoints:
//!   GET /                        static greeting
//!   GET /health                  liveness probe
//!   GET /xeno/{location}         one load-search run
//!   GET /rate/{pickup}/{dropoff} one rate-check run
//!
//! A run that captures nothing is an error, never success-shaped output.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use loadscout_core::{RunReport, ScrapeError, ScrapeRunner, SearchRequest};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

pub struct AppContext {
    pub runner: Arc<dyn ScrapeRunner>,
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/xeno/{location}", get(load_search))
        .route("/rate/{pickup}/{dropoff}", get(rate_check))
        .with_state(ctx)
}

pub async fn serve(ctx: Arc<AppContext>, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    let router = build_router(ctx);

    info!("listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

async fn root() -> &'static str {
    "Hello World!"
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn load_search(
    State(ctx): State<Arc<AppContext>>,
    Path(location): Path<String>,
) -> impl IntoResponse {
    info!(%location, "load search requested");
    run_to_response(ctx.runner.run(&SearchRequest::LoadSearch { location }).await)
}

async fn rate_check(
    State(ctx): State<Arc<AppContext>>,
    Path((pickup, dropoff)): Path<(String, String)>,
) -> impl IntoResponse {
    info!(%pickup, %dropoff, "rate check requested");
    run_to_response(ctx.runner.run(&SearchRequest::RateCheck { pickup, dropoff }).await)
}

fn run_to_response(result: Result<RunReport, ScrapeError>) -> (StatusCode, Json<serde_json::Value>) {
    match result {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "filename": report.filename,
                "data": report.record.data,
            })),
        ),
        Err(err) => {
            error!("run failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": err.to_string(),
                })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::Utc;
    use http_body_util::BodyExt;
    use loadscout_core::CaptureRecord;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// Runner stub: records the request, returns a canned outcome.
    struct StubRunner {
        fail: bool,
        seen: Mutex<Vec<SearchRequest>>,
    }

    impl StubRunner {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ScrapeRunner for StubRunner {
        async fn run(&self, request: &SearchRequest) -> Result<RunReport, ScrapeError> {
            self.seen.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(ScrapeError::capture_timeout(
                    "No matching response within 45000ms",
                ));
            }
            let location = request.location_key();
            let filename = loadscout_storage::location_filename(&location);
            Ok(RunReport {
                path: PathBuf::from("data").join(&filename),
                filename,
                record: CaptureRecord {
                    url: "https://members.123loadboard.com/api/loads/named-searches/x/search"
                        .into(),
                    status: 200,
                    data: serde_json::json!({ "loads": [] }),
                    timestamp: Utc::now(),
                    location,
                },
            })
        }
    }

    fn router(fail: bool) -> (Router, Arc<StubRunner>) {
        let runner = Arc::new(StubRunner::new(fail));
        let ctx = Arc::new(AppContext {
            runner: runner.clone(),
        });
        (build_router(ctx), runner)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn root_returns_greeting() {
        let (router, _) = router(false);
        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"Hello World!");
    }

    #[tokio::test]
    async fn successful_run_reports_filename_and_data() {
        let (router, runner) = router(false);
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/xeno/Los%20Angeles,%20CA")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["filename"], "Los_Angeles__CA.json");
        assert_eq!(body["data"]["loads"], serde_json::json!([]));

        let seen = runner.seen.lock().unwrap();
        assert!(matches!(
            &seen[0],
            SearchRequest::LoadSearch { location } if location == "Los Angeles, CA"
        ));
    }

    #[tokio::test]
    async fn no_capture_surfaces_as_500() {
        let (router, _) = router(true);
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/xeno/Dallas")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .contains("No matching response")
        );
    }

    #[tokio::test]
    async fn rate_endpoint_builds_a_lane_request() {
        let (router, runner) = router(false);
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/rate/Baltimore,%20MD/Los%20Angeles,%20CA")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["filename"], "Baltimore__MD_Los_Angeles__CA.json");

        let seen = runner.seen.lock().unwrap();
        assert!(matches!(
            &seen[0],
            SearchRequest::RateCheck { pickup, dropoff }
                if pickup == "Baltimore, MD" && dropoff == "Los Angeles, CA"
        ));
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (router, _) = router(false);
        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
    }
}
