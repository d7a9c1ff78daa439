// handlers/public/auth/register.rs - POST /auth/register handler

use axum::extract::State;

use crate::api::{Credentials, JsonBody, RegisterResponse, UserView};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /auth/register - Register new user account
///
/// Expected Input:
/// ```json
/// { "username": "john", "password": "secret" }
/// ```
///
/// Expected Output (Success, 200):
/// ```json
/// { "user": { "id": 1, "username": "john" }, "token": "9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b" }
/// ```
///
/// A taken username fails with 400 and a `username` field error.
pub async fn register_post(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody,
) -> ApiResult<RegisterResponse> {
    let credentials = Credentials::for_registration(&payload)?;

    let (user, token) = state
        .users()
        .create_user(&credentials.username, &credentials.password)
        .await?;

    Ok(ApiResponse::success(RegisterResponse {
        user: UserView::from(&user),
        token: token.key,
    }))
}
