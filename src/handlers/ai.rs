use axum::{extract::State, Json};

use crate::dto::MovieRecommendationRequest;
use crate::error::{AppError, AppResult};
use crate::services::actions::{self, ActionResult, ActionState};
use crate::services::gateway::{JournalingPrompt, MovieRecommendation};
use crate::AppState;

/// Generation failures come back as `{"error": ...}` with 200; only a
/// duplicate in-flight request is an HTTP error.
pub async fn generate_journal_prompt(
    State(state): State<AppState>,
) -> AppResult<Json<ActionResult<JournalingPrompt>>> {
    let pending = state.journal_prompt.begin().map_err(|_| {
        AppError::Conflict("A journaling prompt is already being generated".into())
    })?;

    let history = state.entries.history();
    let result = actions::journaling_prompt(&state.gateway, &history).await;
    pending.finish(result.clone());

    Ok(Json(result.into()))
}

pub async fn journal_prompt_status(
    State(state): State<AppState>,
) -> Json<ActionState<JournalingPrompt>> {
    Json(state.journal_prompt.state())
}

pub async fn recommend_movie(
    State(state): State<AppState>,
    Json(body): Json<MovieRecommendationRequest>,
) -> AppResult<Json<ActionResult<MovieRecommendation>>> {
    let pending = state.movie_recommendation.begin().map_err(|_| {
        AppError::Conflict("A recommendation is already being generated".into())
    })?;

    tracing::debug!(mood = %body.mood, "Requesting movie recommendation");
    let result = actions::movie_recommendation(&state.gateway, body.mood).await;
    pending.finish(result.clone());

    Ok(Json(result.into()))
}

pub async fn movie_recommendation_status(
    State(state): State<AppState>,
) -> Json<ActionState<MovieRecommendation>> {
    Json(state.movie_recommendation.state())
}
