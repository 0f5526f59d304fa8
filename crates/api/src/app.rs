use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{builds, functions, health};
use crate::services::DockerCli;

/// Timeout for registry reachability probes.
const REGISTRY_PROBE_TIMEOUT_SECS: u64 = 5;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub docker: DockerCli,
    pub http: reqwest::Client,
}

pub fn create_app(config: Config) -> Router {
    let config = Arc::new(config);

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(REGISTRY_PROBE_TIMEOUT_SECS))
        .build()
        .unwrap_or_default();

    let state = AppState {
        config: config.clone(),
        docker: DockerCli::default(),
        http,
    };

    // The platform CLI and dashboard call this service cross-origin; the
    // orchestrator in front of it handles authentication.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build routes accept zip uploads, so they get the raised body limit.
    let build_routes = Router::new()
        .route("/build", post(builds::build_function))
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes));

    let function_routes = Router::new().route(
        "/functions/:function_name/code",
        get(functions::download_function_code),
    );

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::ready))
        .route("/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(build_routes)
        .merge(function_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware)) // Prometheus metrics
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id)) // Request ID and logging
        .layer(cors)
        .with_state(state)
}
