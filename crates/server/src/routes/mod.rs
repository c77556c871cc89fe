//! API route handlers
//!
//! - `token`: hands out bearer tokens
//! - `records`: create, list, update and delete records

pub mod records;
pub mod token;

use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::IntoResponse;

/// Where the documentation viewer lives.
pub const DOCS_INDEX: &str = "/swagger/index.html";

/// Fallback for unmatched routes: send the caller to the API docs.
///
/// Mounted behind the bearer check, so only authenticated callers see it.
pub async fn docs_redirect() -> impl IntoResponse {
    (StatusCode::MOVED_PERMANENTLY, [(LOCATION, DOCS_INDEX)])
}
