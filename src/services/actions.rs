//! Request/response actions invoked by the UI, plus the per-action state
//! machine that keeps at most one request in flight for each control.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::models::mood::{Mood, MoodEntry};
use crate::services::gateway::{Gateway, GenerationError, JournalingPrompt, MovieRecommendation};
use crate::services::history::{self, DEFAULT_COUNT_WINDOW};

pub const SEED_PROMPT: &str = "What's on your mind today?";

const PROMPT_UNEXPECTED: &str = "An unexpected error occurred while generating the prompt.";
const PROMPT_INVALID: &str = "Could not generate a prompt. Please try again.";
const MOVIE_UNEXPECTED: &str = "An unexpected error occurred while generating the recommendation.";
const MOVIE_INVALID: &str = "Could not generate a recommendation. Please try again.";

/// Either the payload itself or `{"error": "..."}` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionResult<T> {
    Ok(T),
    Error { error: String },
}

impl<T> From<Result<T, String>> for ActionResult<T> {
    fn from(result: Result<T, String>) -> Self {
        match result {
            Ok(data) => ActionResult::Ok(data),
            Err(error) => ActionResult::Error { error },
        }
    }
}

/// Journaling prompt from the last week of moods. An empty history gets
/// the seed prompt without calling the generator.
pub async fn journaling_prompt(
    gateway: &Gateway,
    history: &[MoodEntry],
) -> Result<JournalingPrompt, String> {
    let counts = history::mood_counts(history, DEFAULT_COUNT_WINDOW);
    let Some(summary) = history::mood_summary(&counts) else {
        return Ok(JournalingPrompt {
            prompt: SEED_PROMPT.to_string(),
        });
    };

    gateway
        .request_journaling_prompt(&summary)
        .await
        .map_err(|e| user_message(&e, PROMPT_INVALID, PROMPT_UNEXPECTED))
}

pub async fn movie_recommendation(
    gateway: &Gateway,
    mood: Mood,
) -> Result<MovieRecommendation, String> {
    gateway
        .request_movie_recommendation(mood)
        .await
        .map_err(|e| user_message(&e, MOVIE_INVALID, MOVIE_UNEXPECTED))
}

fn user_message(err: &GenerationError, invalid: &str, unexpected: &str) -> String {
    match err {
        GenerationError::InvalidReply(detail) => {
            tracing::warn!(detail = %detail, "Generator reply failed validation");
            invalid.to_string()
        }
        GenerationError::Status { status, .. } => {
            tracing::error!(status = *status, error = %err, "Generator returned an error");
            unexpected.to_string()
        }
        _ => {
            tracing::error!(error = %err, "Generation failed");
            unexpected.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ActionState<T> {
    Idle,
    Pending,
    Succeeded { data: T },
    Failed { error: String },
}

#[derive(Debug, thiserror::Error)]
#[error("action already pending")]
pub struct AlreadyPending;

/// One slot per UI affordance.
#[derive(Debug)]
pub struct ActionSlot<T> {
    state: Arc<Mutex<ActionState<T>>>,
}

impl<T> Clone for ActionSlot<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T> Default for ActionSlot<T> {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(ActionState::Idle)),
        }
    }
}

impl<T: Clone> ActionSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ActionState<T> {
        self.state.lock().clone()
    }

    /// Move to `Pending`, refusing if a request is already outstanding.
    pub fn begin(&self) -> Result<PendingAction<T>, AlreadyPending> {
        let mut state = self.state.lock();
        if matches!(*state, ActionState::Pending) {
            return Err(AlreadyPending);
        }
        *state = ActionState::Pending;
        Ok(PendingAction {
            state: self.state.clone(),
            finished: false,
        })
    }
}

/// Outstanding request. Dropping it unfinished (e.g. the caller went away)
/// returns the slot to `Idle`.
#[derive(Debug)]
pub struct PendingAction<T> {
    state: Arc<Mutex<ActionState<T>>>,
    finished: bool,
}

impl<T> PendingAction<T> {
    pub fn finish(mut self, result: Result<T, String>) {
        *self.state.lock() = match result {
            Ok(data) => ActionState::Succeeded { data },
            Err(error) => ActionState::Failed { error },
        };
        self.finished = true;
    }
}

impl<T> Drop for PendingAction<T> {
    fn drop(&mut self) {
        if !self.finished {
            *self.state.lock() = ActionState::Idle;
        }
    }
}
