use crate::config::Config;
use crate::errors::AppError;
use crate::models::{QualificationResult, SignupAttributes};
use crate::qualifier::Qualifier;
use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Qualification pipeline wired to the configured providers.
    pub qualifier: Qualifier,
}

/// Body of `POST /api/v1/qualifications`.
///
/// The signup form also posts a `password`; it is accepted and dropped here.
#[derive(Debug, Deserialize)]
pub struct QualificationRequest {
    pub qualification: SignupAttributes,
}

/// Routes that require the API token. Rate limiting is layered on by the caller.
/// The token is checked before the body is read.
pub fn protected_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/qualifications", post(create_qualification))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Authentication middleware for the protected routes.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_api_token(&state.config, request.headers())?;
    Ok(next.run(request).await)
}

/// Health check endpoint.
///
/// # Returns
///
/// * `(StatusCode, Json<serde_json::Value>)` - HTTP 200 OK with health status JSON.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "signup-qualifier",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Router with the health check and the protected routes, without rate limiting.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(protected_routes(state.clone()))
        .with_state(state)
}

/// POST /api/v1/qualifications
///
/// Qualifies a new signup into a bucket.
///
/// The pipeline runs in its own task so that an unexpected fault inside it
/// still produces the fixed `needs_review` fallback with HTTP 503.
///
/// # Returns
///
/// * `Result<(StatusCode, Json<QualificationResult>), AppError>` - The qualification, or 400 for an unreadable body.
pub async fn create_qualification(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QualificationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<QualificationResult>), AppError> {
    let Json(payload) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    tracing::info!("POST /api/v1/qualifications");

    let qualifier = state.qualifier.clone();
    let attributes = payload.qualification;
    let task = tokio::spawn(async move { qualifier.qualify(&attributes).await });

    match task.await {
        Ok(result) => Ok((StatusCode::OK, Json(result))),
        Err(e) => {
            tracing::error!("Qualification failed: {}", e);
            Ok((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(QualificationResult::service_unavailable()),
            ))
        }
    }
}

/// Checks the `Authorization` header against the configured API token.
///
/// Accepts `Bearer <token>` (or any scheme): the last whitespace-separated part is the token.
fn require_api_token(config: &Config, headers: &HeaderMap) -> Result<(), AppError> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split_whitespace().last())
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

    if !constant_time_compare(token, &config.api_token) {
        return Err(AppError::Unauthorized("Invalid API token".to_string()));
    }

    Ok(())
}

/// Constant-time string comparison
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.as_bytes()
        .iter()
        .zip(b.as_bytes().iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
