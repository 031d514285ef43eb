use axum::{
    extract::{Query, State},
    Json,
};
use validator::Validate;

use crate::dto::{DailyAverageQuery, MoodCountsQuery};
use crate::error::AppResult;
use crate::services::history::{
    self, DailyAverage, MoodCount, DEFAULT_COUNT_WINDOW, DEFAULT_WINDOW_DAYS,
};
use crate::AppState;

pub async fn mood_counts(
    State(state): State<AppState>,
    Query(query): Query<MoodCountsQuery>,
) -> Json<Vec<MoodCount>> {
    let history = state.entries.history();
    let n = query.n.unwrap_or(DEFAULT_COUNT_WINDOW);
    Json(history::mood_counts(&history, n))
}

pub async fn daily_average(
    State(state): State<AppState>,
    Query(query): Query<DailyAverageQuery>,
) -> AppResult<Json<Vec<DailyAverage>>> {
    query.validate()?;

    let history = state.entries.history();
    let window = query.window_days.unwrap_or(DEFAULT_WINDOW_DAYS);
    Ok(Json(history::daily_average(&history, state.clock.as_ref(), window)))
}
