use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller, injected into request extensions by [`token_auth_middleware`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

/// Token authentication middleware: resolves the bearer token to a user or
/// rejects the request with 401 before any handler runs.
pub async fn token_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = extract_token_from_headers(&headers).map_err(|msg| {
        tracing::debug!("Rejected request to {}: {}", request.uri().path(), msg);
        ApiError::unauthorized(msg)
    })?;

    let user = state
        .store
        .find_user_by_token(key)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Rejected request to {}: unknown token", request.uri().path());
            ApiError::unauthorized("Invalid token.")
        })?;

    request.extensions_mut().insert(AuthUser {
        id: user.id,
        username: user.username,
    });

    Ok(next.run(request).await)
}

/// Extract the token key from `Authorization: Bearer <key>` (or `Token <key>`)
fn extract_token_from_headers(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or("Authentication credentials were not provided.")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid token header. Token string should not contain invalid characters.")?;

    let mut parts = auth_str.split_whitespace();
    let scheme = parts.next().unwrap_or_default();
    if !scheme.eq_ignore_ascii_case("bearer") && !scheme.eq_ignore_ascii_case("token") {
        return Err("Authentication credentials were not provided.");
    }

    match (parts.next(), parts.next()) {
        (Some(key), None) => Ok(key),
        (None, _) => Err("Invalid token header. No credentials provided."),
        (Some(_), Some(_)) => Err("Invalid token header. Token string should not contain spaces."),
    }
}
