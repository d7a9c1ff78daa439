// handlers/public/auth/token.rs - POST /auth/token handler

use axum::extract::State;

use crate::api::{Credentials, JsonBody, TokenResponse};
use crate::error::{ApiError, NON_FIELD_ERRORS};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /auth/token - Exchange username and password for the user's token
///
/// Missing fields fail with per-field errors; wrong credentials fail with a
/// `non_field_errors` message. Both are 400.
pub async fn token_post(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody,
) -> ApiResult<TokenResponse> {
    let credentials = Credentials::for_login(&payload)?;

    let token = state
        .users()
        .obtain_token(&credentials.username, &credentials.password)
        .await?
        .ok_or_else(|| ApiError::field_error(NON_FIELD_ERRORS, "Unable to log in with provided credentials."))?;

    Ok(ApiResponse::success(TokenResponse { token: token.key }))
}
