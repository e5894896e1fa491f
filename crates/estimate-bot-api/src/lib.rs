//! # Estimate Bot HTTP Service
//!
//! HTTP server that receives GitHub `issues` webhooks and hands them to the
//! [`WebhookPipeline`].
//!
//! Endpoints:
//! - `POST {webhooks.endpoint_path}`: signed webhook deliveries
//! - `GET /healthz`: liveness probe
//! - `GET /metrics`: Prometheus text exposition

pub mod config;
pub mod errors;
pub mod metrics;
pub mod responses;

use axum::{
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{header, HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use estimate_bot_core::{Decision, InboundEvent, WebhookPipeline};
use prometheus::TextEncoder;
use std::{future::IntoFuture, sync::Arc, time::Instant};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument, warn};

pub use config::{
    GitHubConfig, LoggingConfig, ReminderConfig, ServerConfig, ServiceConfig, WebhookConfig,
};
pub use errors::{ConfigError, ServiceError, WebhookHandlerError};
pub use metrics::ServiceMetrics;
pub use responses::DecisionResponse;

/// Header carrying the GitHub event type
pub const EVENT_HEADER: &str = "x-github-event";

/// Header carrying the `sha256=<hex>` body signature
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Header carrying GitHub's per-delivery GUID
pub const DELIVERY_HEADER: &str = "x-github-delivery";

/// Request/response header used to correlate log lines
pub const CORRELATION_HEADER: &str = "x-correlation-id";

// ============================================================================
// Application State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration for the service
    pub config: ServiceConfig,

    /// Per-delivery processing pipeline
    pub pipeline: Arc<WebhookPipeline>,

    /// Metrics collector for observability
    pub metrics: Arc<ServiceMetrics>,
}

impl AppState {
    pub fn new(
        config: ServiceConfig,
        pipeline: Arc<WebhookPipeline>,
        metrics: Arc<ServiceMetrics>,
    ) -> Self {
        Self {
            config,
            pipeline,
            metrics,
        }
    }
}

// ============================================================================
// HTTP Server
// ============================================================================

/// Create HTTP router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let webhook_routes = Router::new().route(
        &state.config.webhooks.endpoint_path,
        post(handle_webhook).fallback(method_not_allowed),
    );

    let operational_routes = Router::new()
        .route("/healthz", get(handle_health_check))
        .route("/metrics", get(metrics_endpoint));

    Router::new()
        .merge(webhook_routes)
        .merge(operational_routes)
        .layer(DefaultBodyLimit::max(state.config.server.max_body_size))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_logging_middleware))
                .into_inner(),
        )
        .with_state(state)
}

/// Start HTTP server
///
/// Runs until SIGINT or SIGTERM. In-flight deliveries get
/// `server.shutdown_timeout_seconds` to finish; anything still running after
/// that is dropped.
pub async fn start_server(
    config: ServiceConfig,
    pipeline: WebhookPipeline,
) -> Result<(), ServiceError> {
    config.validate()?;

    let metrics = ServiceMetrics::new().map_err(|e| {
        ServiceError::Configuration(ConfigError::Invalid {
            message: format!("Failed to initialize metrics: {}", e),
        })
    })?;

    let state = AppState::new(config.clone(), Arc::new(pipeline), metrics);
    let app = create_router(state);

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .map_err(|e| ServiceError::BindFailed {
            address: address.clone(),
            message: e.to_string(),
        })?;

    info!(
        address = %address,
        endpoint = %config.webhooks.endpoint_path,
        "HTTP server listening"
    );

    let shutdown_timeout = std::time::Duration::from_secs(config.server.shutdown_timeout_seconds);
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!(
                timeout_seconds = shutdown_timeout.as_secs(),
                "Draining in-flight requests"
            );
            let _ = shutdown_tx.send(true);
        })
        .into_future();

    let drain_deadline = async move {
        if shutdown_rx.wait_for(|stopping| *stopping).await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(shutdown_timeout).await;
    };

    tokio::select! {
        result = server => {
            result.map_err(|e| ServiceError::ServerFailed {
                message: e.to_string(),
            })?;
        }
        _ = drain_deadline => {
            warn!(
                timeout_seconds = shutdown_timeout.as_secs(),
                "Graceful shutdown timed out; abandoning in-flight requests"
            );
        }
    }

    info!("HTTP server shutdown complete");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT (Ctrl+C), initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Handle one webhook delivery.
///
/// Missing headers are passed through as empty strings; the pipeline
/// rejects an empty signature and ignores an empty event type.
#[instrument(skip(state, headers, body), fields(event_type, delivery_id, decision))]
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<DecisionResponse, WebhookHandlerError> {
    let start = Instant::now();

    let result = process_delivery(&state, &headers, body).await;

    let decision = match &result {
        Ok(response) => response.0,
        Err(WebhookHandlerError::ProcessingFailed(e)) => e.decision(),
        Err(_) => Decision::Error,
    };
    state.metrics.record_decision(decision, start.elapsed());

    let span = tracing::Span::current();
    span.record("decision", decision.as_str());
    info!(
        decision = %decision,
        duration_ms = %start.elapsed().as_millis(),
        "Webhook handled"
    );

    result
}

async fn process_delivery(
    state: &AppState,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<DecisionResponse, WebhookHandlerError> {
    let body = body?;

    let event_type = header_str(headers, EVENT_HEADER);
    let span = tracing::Span::current();
    span.record("event_type", event_type);

    let mut event = InboundEvent::new(event_type, header_str(headers, SIGNATURE_HEADER), body);
    if let Some(delivery_id) = headers.get(DELIVERY_HEADER).and_then(|v| v.to_str().ok()) {
        span.record("delivery_id", delivery_id);
        event = event.with_delivery_id(delivery_id);
    }

    let decision = state.pipeline.process(&event).await?;
    Ok(DecisionResponse(decision))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        "method not allowed",
    )
        .into_response()
}

async fn handle_health_check() -> &'static str {
    "ok"
}

/// Prometheus metrics endpoint
#[instrument(skip_all)]
async fn metrics_endpoint() -> Result<String, StatusCode> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    encoder
        .encode_to_string(&metric_families)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

// ============================================================================
// Middleware
// ============================================================================

/// Request logging middleware with correlation ID tracking
///
/// Reuses the caller's `x-correlation-id` or generates one, records it on
/// the request span and echoes it in the response headers.
#[instrument(skip(request, next), fields(
    method = %request.method(),
    uri = %request.uri(),
    correlation_id
))]
async fn request_logging_middleware(
    mut request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let start = Instant::now();

    let correlation_id = request
        .headers()
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    tracing::Span::current().record("correlation_id", correlation_id.as_str());
    request.extensions_mut().insert(correlation_id.clone());

    let mut response = next.run(request).await;
    let duration = start.elapsed();

    if let Ok(header_value) = correlation_id.parse() {
        response
            .headers_mut()
            .insert(CORRELATION_HEADER, header_value);
    }

    let status = response.status();
    if status.is_server_error() {
        error!(
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed with server error"
        );
    } else if status.is_client_error() {
        warn!(
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed with client error"
        );
    } else {
        info!(
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed successfully"
        );
    }

    response
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
