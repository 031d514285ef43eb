use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::dto::{CreateEntryRequest, EntriesQuery};
use crate::error::AppResult;
use crate::models::mood::MoodEntry;
use crate::services::history;
use crate::AppState;

pub async fn create_entry(
    State(state): State<AppState>,
    Json(body): Json<CreateEntryRequest>,
) -> AppResult<(StatusCode, Json<MoodEntry>)> {
    body.validate()?;

    // File writes block; on a failed write the entry is still kept in memory.
    let entries = state.entries.clone();
    let draft = body.into_draft();
    let entry = tokio::task::spawn_blocking(move || entries.append(draft)).await??;

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<EntriesQuery>,
) -> Json<Vec<MoodEntry>> {
    let history = state.entries.history();
    match query.limit {
        Some(n) => Json(history::recent(&history, n).to_vec()),
        None => Json(history),
    }
}

pub async fn today_entry(State(state): State<AppState>) -> Json<Option<MoodEntry>> {
    let history = state.entries.history();
    Json(history::today_entry(&history, state.clock.as_ref()).cloned())
}
