//! HTTP surface for loan analysis.
//!
//! Endpoints:
//! - `GET  /`                 — greeting/liveness payload
//! - `GET  /health`           — readiness payload
//! - `GET  /loan-types`       — static schema (names + per-type fields)
//! - `POST /analyze-loan`     — analysis result JSON; 400 on unknown type
//! - `POST /download-report`  — rendered report as an attachment download
//! - `POST /send-email`       — render and mail the report to the applicant
//!
//! Each request runs a strictly sequential pipeline (validate -> ratios ->
//! model call -> optional render -> optional send) with no state shared
//! between requests beyond the immutable schema and the injected clients.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use loanlens_agent::DecisionEngine;
use loanlens_core::application::ApplicationData;
use loanlens_core::errors::{ApplicationError, DomainError};
use loanlens_core::ratios::compute_derived_ratios;
use loanlens_core::{schema, AnalysisResult};

use crate::mailer::ReportMailer;
use crate::report::ReportRenderer;

const REPORT_FILENAME: &str = "loan_report.pdf";

#[derive(Clone)]
pub struct AppState {
    pub engine: DecisionEngine,
    pub renderer: Arc<ReportRenderer>,
    pub mailer: Arc<dyn ReportMailer>,
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub loan_type: String,
    pub data: ApplicationData,
}

#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    pub email: String,
    /// Report payload; must itself carry a `loan_type` key.
    pub report_data: ApplicationData,
}

#[derive(Debug, Serialize)]
pub struct LoanTypesResponse {
    pub loan_types: Vec<&'static str>,
    pub fields: serde_json::Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Error envelope mapping the application taxonomy onto HTTP statuses:
/// client-input errors become 400, everything else 500. The body mirrors
/// the `{"detail": ...}` shape callers already consume.
pub struct ApiError(ApplicationError);

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        Self(error)
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self(ApplicationError::from(error))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            warn!(error = %self.0, "request rejected");
            StatusCode::BAD_REQUEST
        } else {
            error!(error = %self.0, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/loan-types", get(loan_types))
        .route("/analyze-loan", post(analyze_loan))
        .route("/download-report", post(download_report))
        .route("/send-email", post(send_email))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn root() -> Json<Value> {
    Json(json!({ "message": "Hello World!" }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ready",
        "service": "loanlens-server",
        "checked_at": Utc::now().to_rfc3339(),
    }))
}

async fn loan_types() -> Json<LoanTypesResponse> {
    let mut fields = serde_json::Map::new();
    for loan_type in schema::loan_types() {
        let expected = schema::fields_for(loan_type).unwrap_or_default();
        fields.insert(loan_type.to_string(), json!(expected));
    }

    Json(LoanTypesResponse { loan_types: schema::loan_types().to_vec(), fields })
}

async fn analyze_loan(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let analysis = run_analysis(&state, &request.loan_type, &request.data).await?;
    Ok(Json(analysis))
}

async fn download_report(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Response, ApiError> {
    let analysis = run_analysis(&state, &request.loan_type, &request.data).await?;

    let report_data = request.data.with_loan_type(&request.loan_type);
    let rendered = state
        .renderer
        .render(&report_data, &analysis)
        .await
        .map_err(|error| ApplicationError::Render(error.to_string()))?;

    info!(loan_type = %request.loan_type, "report download prepared");
    Ok(rendered.into_response(REPORT_FILENAME))
}

async fn send_email(
    State(state): State<AppState>,
    Json(request): Json<SendEmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    // The loan type travels inside the report payload for this operation.
    let loan_type = request
        .report_data
        .text("loan_type")
        .map(str::to_string)
        .ok_or(DomainError::MissingLoanType)?;

    let analysis = run_analysis(&state, &loan_type, &request.report_data).await?;

    let rendered = state
        .renderer
        .render(&request.report_data, &analysis)
        .await
        .map_err(|error| ApplicationError::Render(error.to_string()))?;

    state.mailer.send_report(&request.email, rendered.into_bytes()).await?;

    info!(loan_type = %loan_type, "report emailed");
    Ok(Json(MessageResponse { message: "Email sent successfully" }))
}

/// Shared analyze pipeline: schema validation, ratio derivation, one model
/// invocation. Every endpoint that needs an analysis goes through here
/// exactly once per request.
async fn run_analysis(
    state: &AppState,
    loan_type: &str,
    data: &ApplicationData,
) -> Result<AnalysisResult, ApiError> {
    if !schema::is_known(loan_type) {
        return Err(DomainError::UnknownLoanType(loan_type.to_string()).into());
    }

    let ratios = compute_derived_ratios(data);
    let analysis = state.engine.analyze(loan_type, data, &ratios).await?;
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use loanlens_agent::{DecisionEngine, LlmClient, LlmError};
    use loanlens_core::errors::ApplicationError;

    use crate::mailer::ReportMailer;
    use crate::report::ReportRenderer;

    use super::{router, AppState};

    const APPROVED_REPLY: &str = "Here you go: {\"decision\":\"Approved\",\"risk_score\":12,\"reasons\":[\"income covers loan\"],\"improvement_tips\":[],\"comparison_insights\":[]}";

    struct CountingClient {
        reply: Result<String, LlmError>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl LlmClient for CountingClient {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl ReportMailer for RecordingMailer {
        async fn send_report(&self, to: &str, report: Vec<u8>) -> Result<(), ApplicationError> {
            self.sent.lock().expect("lock").push((to.to_string(), report.len()));
            Ok(())
        }
    }

    struct FailingMailer;

    #[async_trait]
    impl ReportMailer for FailingMailer {
        async fn send_report(&self, _to: &str, _report: Vec<u8>) -> Result<(), ApplicationError> {
            Err(ApplicationError::Mail("relay rejected the message".to_string()))
        }
    }

    struct Harness {
        router: Router,
        calls: Arc<AtomicUsize>,
        mailer: Arc<RecordingMailer>,
    }

    fn harness_with(reply: Result<String, LlmError>, mailer: Option<Arc<dyn ReportMailer>>) -> Harness {
        let calls = Arc::new(AtomicUsize::new(0));
        let recording = Arc::new(RecordingMailer::default());
        let mailer_impl: Arc<dyn ReportMailer> = mailer.unwrap_or_else(|| recording.clone());

        let mut renderer = ReportRenderer::with_embedded_template();
        renderer.wkhtmltopdf_path = None;

        let state = AppState {
            engine: DecisionEngine::new(Arc::new(CountingClient {
                reply,
                calls: calls.clone(),
            })),
            renderer: Arc::new(renderer),
            mailer: mailer_impl,
        };

        Harness { router: router(state), calls, mailer: recording }
    }

    fn harness() -> Harness {
        harness_with(Ok(APPROVED_REPLY.to_string()), None)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should build")
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should collect");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    fn car_payload() -> Value {
        json!({
            "loan_type": "car",
            "data": {
                "full_name": "Jane Doe",
                "annual_income": 50000,
                "loan_amount": 100000,
                "collateral": "No",
            }
        })
    }

    #[tokio::test]
    async fn root_returns_the_greeting() {
        let harness = harness();
        let response = harness
            .router
            .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "message": "Hello World!" }));
    }

    #[tokio::test]
    async fn loan_types_exposes_the_static_schema() {
        let harness = harness();
        let response = harness
            .router
            .oneshot(Request::builder().uri("/loan-types").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["loan_types"], json!(["car", "home", "student", "personal", "business"]));
        assert_eq!(body["fields"]["car"].as_array().map(Vec::len), Some(12));
        assert_eq!(body["fields"]["student"].as_array().map(Vec::len), Some(13));
    }

    #[tokio::test]
    async fn unknown_loan_type_is_rejected_without_a_model_call() {
        let harness = harness();
        let response = harness
            .router
            .oneshot(post_json(
                "/analyze-loan",
                json!({ "loan_type": "bicycle", "data": { "full_name": "Jane Doe" } }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["detail"].as_str().expect("detail").contains("bicycle"));
        assert_eq!(harness.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn download_report_rejects_an_unknown_loan_type() {
        let harness = harness();
        let response = harness
            .router
            .oneshot(post_json(
                "/download-report",
                json!({ "loan_type": "bicycle", "data": { "full_name": "Jane Doe" } }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["detail"].as_str().expect("detail").contains("bicycle"));
        assert_eq!(harness.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn send_email_rejects_an_unknown_loan_type_in_the_payload() {
        let harness = harness();
        let response = harness
            .router
            .oneshot(post_json(
                "/send-email",
                json!({
                    "email": "jane@example.com",
                    "report_data": { "full_name": "Jane Doe", "loan_type": "bicycle" }
                }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(harness.calls.load(Ordering::SeqCst), 0);
        assert!(harness.mailer.sent.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn analyze_returns_the_model_verdict() {
        let harness = harness();
        let response =
            harness.router.oneshot(post_json("/analyze-loan", car_payload())).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["decision"], json!("Approved"));
        assert_eq!(body["risk_score"], json!(12));
        assert_eq!(body["comparison_insights"], json!([]));
        assert_eq!(harness.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn provider_failure_maps_to_a_server_error() {
        let harness = harness_with(
            Err(LlmError::Network("connection refused".to_string())),
            None,
        );
        let response =
            harness.router.oneshot(post_json("/analyze-loan", car_payload())).await.expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(harness.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn download_report_analyzes_once_and_streams_the_document() {
        let harness = harness();
        let response = harness
            .router
            .oneshot(post_json("/download-report", car_payload()))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(harness.calls.load(Ordering::SeqCst), 1, "exactly one model invocation");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should collect");
        let document = String::from_utf8(bytes.to_vec()).expect("HTML fallback is utf-8");
        assert!(document.contains("Jane Doe"));
        assert!(document.contains("Loan Type: car"));
        assert!(document.contains("Decision: Approved"));
    }

    #[tokio::test]
    async fn send_email_renders_and_mails_the_report() {
        let harness = harness();
        let response = harness
            .router
            .oneshot(post_json(
                "/send-email",
                json!({
                    "email": "jane@example.com",
                    "report_data": {
                        "full_name": "Jane Doe",
                        "annual_income": 50000,
                        "loan_amount": 100000,
                        "loan_type": "car",
                    }
                }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "message": "Email sent successfully" }));
        assert_eq!(harness.calls.load(Ordering::SeqCst), 1, "exactly one model invocation");

        let sent = harness.mailer.sent.lock().expect("lock");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "jane@example.com");
        assert!(sent[0].1 > 0, "attached report should not be empty");
    }

    #[tokio::test]
    async fn send_email_requires_a_loan_type_in_the_payload() {
        let harness = harness();
        let response = harness
            .router
            .oneshot(post_json(
                "/send-email",
                json!({ "email": "jane@example.com", "report_data": { "full_name": "Jane Doe" } }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(harness.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn mail_relay_failure_maps_to_a_server_error() {
        let harness = harness_with(Ok(APPROVED_REPLY.to_string()), Some(Arc::new(FailingMailer)));
        let response = harness
            .router
            .oneshot(post_json(
                "/send-email",
                json!({
                    "email": "jane@example.com",
                    "report_data": { "full_name": "Jane Doe", "loan_type": "car" }
                }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["detail"].as_str().expect("detail").contains("mail delivery failure"));
    }

    #[tokio::test]
    async fn unparseable_model_output_still_returns_a_result() {
        let harness = harness_with(Ok("no json here".to_string()), None);
        let response =
            harness.router.oneshot(post_json("/analyze-loan", car_payload())).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["decision"], json!("Risk"));
        assert_eq!(body["risk_score"], json!(50));
        assert_eq!(body["reasons"], json!(["Unable to parse response"]));
    }
}
