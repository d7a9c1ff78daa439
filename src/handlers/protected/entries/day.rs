use axum::{
    extract::{Query, State},
    Extension,
};
use std::collections::HashMap;

use crate::api::EntryView;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::day_query::{day_bounds, resolve_day, today};
use crate::state::AppState;

/// GET /entries/day?day=2023-05-01 - The caller's entries created on one calendar day
///
/// A missing or unreadable `day` means today. Never fails on the parameter.
pub async fn get(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<EntryView>> {
    let zone = state.config.api.day_zone;
    let day = resolve_day(params.get("day").map(String::as_str), today(zone));
    let (start, end) = day_bounds(day, zone);

    let entries = state
        .store
        .entries_created_between(auth_user.id, start, end)
        .await?;

    tracing::debug!("Day query for user {} on {}: {} entries", auth_user.id, day, entries.len());
    Ok(ApiResponse::success(EntryView::many(entries)))
}
