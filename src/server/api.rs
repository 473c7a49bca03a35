//! API route definitions

use std::sync::Arc;
use std::time::Instant;
use axum::{
    extract::Request,
    http::{Method, Uri},
    middleware::{self as axum_middleware, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::{error::ServerError, handlers, state::AppState};

async fn handle_404(uri: Uri) -> ServerError {
    ServerError::NotFound(format!(
        "{} does not exist. Use POST /api/v1/predict or GET /health.",
        uri.path()
    ))
}

async fn handle_405(method: Method, uri: Uri) -> ServerError {
    ServerError::MethodNotAllowed(format!("{} is not supported on {}", method, uri.path()))
}

/// One log line per request: method, path, status and duration
async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed().as_secs_f64();
    info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_secs = duration,
        "{} {} - {} - {:.3}s",
        method,
        path,
        response.status().as_u16(),
        duration
    );
    response
}

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/predict", post(handlers::predict))
        .fallback(handle_404)
        .method_not_allowed_fallback(handle_405);

    let cors = match std::env::var("CORS_ORIGIN") {
        Ok(origin) if !origin.is_empty() && origin != "*" => match origin.parse::<axum::http::HeaderValue>() {
            Ok(value) => CorsLayer::new().allow_origin(value).allow_methods(Any).allow_headers(Any),
            Err(_) => CorsLayer::permissive(),
        },
        _ => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes)
        .fallback(handle_404)
        .method_not_allowed_fallback(handle_405)
        .with_state(state)
        .layer(axum_middleware::from_fn(log_requests))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
