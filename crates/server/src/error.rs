use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rolodex::{RecordIdError, StoreError, TokenError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Store(e) if e.is_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Store(_)
            | ServerError::Token(_)
            | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::Store(_) => "STORE_ERROR",
            ServerError::Token(_) => "TOKEN_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code().to_string();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(code = %error_code, "{message}");
        } else {
            tracing::warn!(code = %error_code, "{message}");
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Rejections produced by the bearer auth middleware.
///
/// These answer with a bare JSON string rather than the [`ErrorResponse`]
/// envelope.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("No Authorization header provided")]
    MissingHeader,

    #[error("Incorrect Format of Authorization Token")]
    MalformedHeader,

    #[error("{0}")]
    InvalidToken(#[from] TokenError),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingHeader => StatusCode::FORBIDDEN,
            AuthError::MalformedHeader => StatusCode::BAD_REQUEST,
            AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::warn!(status = %status, "rejected request: {self}");
        (status, Json(self.to_string())).into_response()
    }
}

impl From<std::net::AddrParseError> for ServerError {
    fn from(err: std::net::AddrParseError) -> Self {
        ServerError::Config(format!("Invalid address: {err}"))
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl From<RecordIdError> for ServerError {
    fn from(err: RecordIdError) -> Self {
        ServerError::BadRequest(err.to_string())
    }
}
