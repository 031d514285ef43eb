use axum::{extract::State, Json};
use validator::Validate;

use crate::error::AppResult;
use crate::models::settings::ReminderSettings;
use crate::AppState;

pub async fn get_settings(State(state): State<AppState>) -> Json<ReminderSettings> {
    Json(state.settings.load())
}

pub async fn update_settings(
    State(state): State<AppState>,
    Json(body): Json<ReminderSettings>,
) -> AppResult<Json<ReminderSettings>> {
    body.validate()?;

    let settings = state.settings.clone();
    let body = tokio::task::spawn_blocking(move || settings.save(&body).map(|()| body)).await??;
    tracing::info!(
        reminders_enabled = body.reminders_enabled,
        reminder_time = %body.reminder_time,
        "Reminder settings saved"
    );
    Ok(Json(body))
}
