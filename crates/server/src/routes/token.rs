use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Envelope returned by `GET /token`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub error: bool,
    pub message: String,
    pub token: String,
}

/// Issue a bearer token for the configured demo identity
#[utoipa::path(
    get,
    path = "/token",
    responses(
        (status = 200, description = "Signed token", body = TokenResponse),
        (status = 500, description = "Token could not be signed", body = crate::error::ErrorResponse)
    ),
    tags = ["auth"],
    operation_id = "issueToken"
)]
pub async fn issue_token(State(state): State<Arc<ServerState>>) -> ServerResult<Json<TokenResponse>> {
    let token = state.tokens.issue(&state.config.demo_email)?;

    Ok(Json(TokenResponse {
        error: false,
        message: "success".to_string(),
        token,
    }))
}
