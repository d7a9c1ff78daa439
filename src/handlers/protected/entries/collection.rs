use axum::{extract::State, Extension};
use chrono::Utc;

use crate::api::{EntryInput, EntryView, JsonBody};
use crate::database::models::NewEntry;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::types::Operation;

use super::audit;

/// GET /entries - All entries owned by the caller
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Vec<EntryView>> {
    let entries = state.store.list_entries(auth_user.id).await?;
    Ok(ApiResponse::success(EntryView::many(entries)))
}

/// POST /entries - Create an entry owned by the caller
///
/// Expected Input: `{ "text": "string (1-255 chars)", "notes": "string (optional)" }`.
/// Owner and timestamps are always assigned here, whatever the payload says.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    JsonBody(payload): JsonBody,
) -> ApiResult<EntryView> {
    let input = EntryInput::full(&payload)?;

    let entry = state
        .store
        .insert_entry(NewEntry {
            user_id: auth_user.id,
            text: input.text_or_default(),
            notes: input.notes_or_default(),
            created_at: Utc::now(),
        })
        .await?;

    audit(&state, &auth_user, Operation::Create, entry.id);
    Ok(ApiResponse::created(EntryView::from(entry)))
}
