use axum::Json;

use crate::models::mood::{MoodOption, MOOD_OPTIONS};

pub async fn list_moods() -> Json<Vec<MoodOption>> {
    Json(MOOD_OPTIONS.to_vec())
}
