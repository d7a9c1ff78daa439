use axum::{
    extract::{Path, State},
    Extension,
};
use chrono::Utc;

use crate::api::{EntryInput, EntryView, JsonBody};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::types::Operation;

use super::{audit, parse_entry_id};

/// GET /entries/:id - A single entry of the caller
pub async fn get(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<EntryView> {
    let id = parse_entry_id(&id)?;

    let entry = state
        .store
        .get_entry(auth_user.id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not found."))?;

    Ok(ApiResponse::success(EntryView::from(entry)))
}

/// PUT /entries/:id - Replace `text` (required) and `notes` (kept when omitted)
pub async fn put(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody,
) -> ApiResult<EntryView> {
    update(state, auth_user, &id, &payload, false).await
}

/// PATCH /entries/:id - Change only the supplied fields
pub async fn patch(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody,
) -> ApiResult<EntryView> {
    update(state, auth_user, &id, &payload, true).await
}

async fn update(
    state: AppState,
    auth_user: AuthUser,
    raw_id: &str,
    payload: &serde_json::Value,
    partial: bool,
) -> ApiResult<EntryView> {
    let id = parse_entry_id(raw_id)?;

    // Existence is checked before the payload, so a missing entry is a 404
    // even when the body is also invalid.
    if state.store.get_entry(auth_user.id, id).await?.is_none() {
        return Err(ApiError::not_found("Not found."));
    }

    let input = if partial {
        EntryInput::partial(payload)?
    } else {
        EntryInput::full(payload)?
    };

    let entry = state
        .store
        .update_entry(auth_user.id, id, input.into_changes(), Utc::now())
        .await?
        .ok_or_else(|| ApiError::not_found("Not found."))?;

    audit(&state, &auth_user, Operation::Update, entry.id);
    Ok(ApiResponse::success(EntryView::from(entry)))
}

/// DELETE /entries/:id - Remove an entry of the caller
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_entry_id(&id)?;

    if !state.store.delete_entry(auth_user.id, id).await? {
        return Err(ApiError::not_found("Not found."));
    }

    audit(&state, &auth_user, Operation::Delete, id);
    Ok(ApiResponse::no_content())
}
