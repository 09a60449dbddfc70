//! HTTP Server for the csv2ttl API.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | GET    | `/health`         | Health check                         |
//! | POST   | `/api/generate`   | CSV text + configuration to Turtle   |
//! | POST   | `/api/scaffold`   | Draft configuration for CSV text     |
//! | GET    | `/api/logs`       | SSE stream for real-time logs        |

use axum::{
    extract::rejection::JsonRejection,
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{
    error_response, parse_delimiter, validation_error_response, GenerateRequest, GenerateResponse,
    ScaffoldRequest, ScaffoldResponse,
};
use crate::error::{GenerateError, ServerError, ServerResult};
use crate::models::Config;
use crate::parser::parse_bytes_auto;
use crate::transform::{generate_from_csv, CsvInfo};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3000;

/// Build the router with every route and permissive CORS.
pub fn router() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/generate", post(generate))
        .route("/api/scaffold", post(scaffold))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
}

/// Start the HTTP server
pub async fn start_server(port: u16) -> ServerResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Internal(format!("Cannot bind {}: {}", addr, e)))?;

    log_info(format!("🚀 csv2ttl server running on http://localhost:{}", port));
    log_info("POST /api/generate - CSV + configuration to Turtle");
    log_info("POST /api/scaffold - Draft configuration");
    log_info("GET  /api/logs     - SSE log stream");
    log_info("GET  /health       - Health check");

    axum::serve(listener, router())
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Generate(e) => match e {
                GenerateError::Config(_) if e.validation_errors().is_some() => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                GenerateError::Csv(_) | GenerateError::Config(_) | GenerateError::EmptyInput => {
                    StatusCode::BAD_REQUEST
                }
                GenerateError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        log_error(self.to_string());
        let body = match &self {
            ServerError::Generate(e) => match e.validation_errors() {
                Some(errors) => validation_error_response(errors),
                None => error_response(&e.to_string()),
            },
            other => error_response(&other.to_string()),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "csv2ttl",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "generate": "POST /api/generate",
            "scaffold": "POST /api/scaffold",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers skip the entries they missed.
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn delimiter_override(raw: Option<&str>) -> ServerResult<Option<char>> {
    raw.map(parse_delimiter)
        .transpose()
        .map_err(ServerError::BadRequest)
}

async fn generate(
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> ServerResult<Json<GenerateResponse>> {
    let Json(request) = payload?;
    let delimiter = delimiter_override(request.delimiter.as_deref())?;

    log_info(format!("📄 Generate request ({} bytes of CSV)", request.csv.len()));
    let result = generate_from_csv(request.csv.as_bytes(), delimiter, &request.config)?;

    Ok(Json(GenerateResponse::from(result)))
}

async fn scaffold(
    payload: Result<Json<ScaffoldRequest>, JsonRejection>,
) -> ServerResult<Json<ScaffoldResponse>> {
    let Json(request) = payload?;
    let delimiter = delimiter_override(request.delimiter.as_deref())?;

    let parsed = parse_bytes_auto(request.csv.as_bytes(), delimiter)
        .map_err(|e| ServerError::BadRequest(e.to_string()))?;

    let mut config = Config::scaffold(&parsed.headers, &parsed.rows);
    config
        .add_derived_entities(&request.entity_columns)
        .map_err(|e| ServerError::BadRequest(e.to_string()))?;

    Ok(Json(ScaffoldResponse::new(config, CsvInfo::from(&parsed))))
}
