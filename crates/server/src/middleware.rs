use crate::error::AuthError;
use crate::policy::{access_for, Access, FALLBACK};
use crate::state::ServerState;
use axum::extract::{MatchedPath, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

const BEARER_PREFIX: &str = "Bearer ";

/// Request-scoped id, available to handlers through request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Bearer token authentication middleware
///
/// Routes marked [`Access::Public`] in the policy table pass straight through.
/// Requests without a [`MatchedPath`] reached the router fallback and are
/// checked under [`FALLBACK`].
/// For the rest the token is validated and its claims are stored in request
/// extensions for downstream handlers.
pub async fn bearer_auth(
    State(state): State<Arc<ServerState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| FALLBACK.to_string());

    if access_for(request.method(), &path) == Access::Public {
        return Ok(next.run(request).await);
    }

    let token = bearer_token(request.headers())?;
    let claims = state.tokens.validate(token)?;
    tracing::debug!(email = %claims.email, "authenticated request");

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Pull the token out of `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = match headers.get(AUTHORIZATION) {
        Some(value) if !value.is_empty() => value,
        _ => return Err(AuthError::MissingHeader),
    };

    value
        .to_str()
        .ok()
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .ok_or(AuthError::MalformedHeader)
}

/// Request ID injection middleware
pub async fn request_id(mut request: Request, next: Next) -> Response {
    // Generate or extract request ID
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    // Add to request extensions for handlers to access
    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }

    response
}

/// Logging middleware
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    // Get request ID if available
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();

    tracing::info!(
        method = %method,
        uri = %uri,
        request_id = %request_id,
        "Request started"
    );

    let response = next.run(request).await;
    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        request_id = %request_id,
        "Request completed"
    );

    response
}
