//! Log HTTP Routes
//!
//! - `POST /` appends `{"data": string}`; any caller-supplied tag is ignored
//! - `GET /` returns the newest record without verifying it
//! - `GET /verify` returns `{"message", "data"}` from a verification scan

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::log::Record;
use crate::observability::{log_event_with_fields, Event};
use crate::service::{LogService, ServiceError, ServiceResult};
use crate::verify::VerificationReport;

// ==================
// Shared State
// ==================

/// State shared across handlers
pub struct LogState {
    pub service: Arc<LogService>,
}

impl LogState {
    pub fn new(service: Arc<LogService>) -> Self {
        Self { service }
    }
}

/// Body of every 500; store details stay in the log
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal store error";

// ==================
// Request/Response Types
// ==================

/// Append request body.
///
/// `tag` and `hash` are accepted only so that their presence can be logged;
/// their values are never read.
#[derive(Debug, Deserialize)]
pub struct AppendRequest {
    pub data: String,
    #[serde(default)]
    pub tag: Option<IgnoredAny>,
    #[serde(default)]
    pub hash: Option<IgnoredAny>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyResponse {
    pub message: String,
    pub data: Option<String>,
}

impl From<VerificationReport> for VerifyResponse {
    fn from(report: VerificationReport) -> Self {
        Self {
            message: report.message().to_string(),
            data: report.record.as_ref().map(Record::data_lossy),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordResponse {
    pub data: String,
    pub tag: String,
    pub timestamp: i64,
    pub sequence: u64,
}

impl From<Record> for RecordResponse {
    fn from(record: Record) -> Self {
        Self {
            data: record.data_lossy(),
            tag: record.tag.to_hex(),
            timestamp: record.timestamp,
            sequence: record.sequence,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

/// Handler error mapped to a status and an [`ErrorResponse`] body
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::MalformedInput(msg) => ApiError::bad_request(msg),
            ServiceError::Store(e) => {
                log_event_with_fields(
                    Event::RequestFailed,
                    &[("code", e.code().code()), ("message", e.to_string().as_str())],
                );
                ApiError::internal(INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
            code: self.status.as_u16(),
        };
        (self.status, Json(body)).into_response()
    }
}

// ==================
// Log Routes
// ==================

/// Create log routes
pub fn log_routes(state: Arc<LogState>) -> Router {
    Router::new()
        .route("/", get(latest_raw_handler).post(append_handler))
        .route("/verify", get(verify_handler))
        .with_state(state)
}

/// Run a service call off the async workers; `FileStore` appends fsync.
async fn run_blocking<T, F>(state: &Arc<LogState>, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&LogService) -> ServiceResult<T> + Send + 'static,
{
    let service = Arc::clone(&state.service);
    tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| ApiError::internal(format!("worker failed: {}", e)))?
        .map_err(ApiError::from)
}

fn reject_body(state: &LogState, rejection: JsonRejection) -> ApiError {
    let status = rejection.status();
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        log_event_with_fields(
            Event::RequestRejected,
            &[("reason", "body too large"), ("status", "413")],
        );
        return ApiError::with_status(status, rejection.body_text());
    }
    reject_malformed(state, &rejection.body_text())
}

fn reject_malformed(state: &LogState, reason: &str) -> ApiError {
    state.service.metrics().increment_malformed_requests();
    log_event_with_fields(Event::RequestRejected, &[("reason", reason)]);
    ServiceError::MalformedInput(reason.to_string()).into()
}

// ==================
// Handlers
// ==================

async fn append_handler(
    State(state): State<Arc<LogState>>,
    payload: Result<Json<AppendRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = payload.map_err(|e| reject_body(&state, e))?;

    if request.tag.is_some() || request.hash.is_some() {
        log_event_with_fields(Event::ClientTagIgnored, &[("route", "POST /")]);
    }

    let data = request.data.into_bytes();
    run_blocking(&state, move |service| service.append(data)).await?;

    Ok(StatusCode::OK)
}

async fn latest_raw_handler(
    State(state): State<Arc<LogState>>,
) -> Result<Json<Option<RecordResponse>>, ApiError> {
    let latest = run_blocking(&state, |service| service.latest_raw()).await?;
    Ok(Json(latest.map(RecordResponse::from)))
}

async fn verify_handler(
    State(state): State<Arc<LogState>>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let report = run_blocking(&state, |service| service.verify_latest()).await?;
    Ok(Json(VerifyResponse::from(report)))
}
