//! Journaling-prompt and movie-recommendation generation.
//!
//! The gateway owns the instruction templates and validates every reply
//! against a fixed schema before anything leaves this module. Replies that
//! are missing required fields are errors, never partial results.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::mood::Mood;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("text generation is not configured")]
    Disabled,

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generator returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid reply: {0}")]
    InvalidReply(String),
}

/// Opaque text-generation service.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, instruction: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalingPrompt {
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecommendation {
    pub title: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailer_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
struct JournalingPromptReply {
    #[validate(required, custom = "non_blank")]
    prompt: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct MovieRecommendationReply {
    #[validate(required, custom = "non_blank")]
    title: Option<String>,

    #[validate(required, custom = "non_blank")]
    reason: Option<String>,

    #[validate(custom = "validate_imdb_id")]
    imdb_id: Option<String>,

    #[validate(url)]
    trailer_url: Option<String>,
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn validate_imdb_id(value: &str) -> Result<(), ValidationError> {
    let digits = value.strip_prefix("tt").unwrap_or("");
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("imdb_id"))
    }
}

pub struct Gateway {
    generator: Arc<dyn TextGenerator>,
}

impl Gateway {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn request_journaling_prompt(
        &self,
        summary: &str,
    ) -> Result<JournalingPrompt, GenerationError> {
        let instruction = journaling_instruction(summary);
        let text = self.generator.generate(&instruction).await?;
        let reply: JournalingPromptReply = parse_reply(&text)?;

        Ok(JournalingPrompt {
            prompt: reply.prompt.unwrap_or_default().trim().to_string(),
        })
    }

    pub async fn request_movie_recommendation(
        &self,
        mood: Mood,
    ) -> Result<MovieRecommendation, GenerationError> {
        let instruction = movie_instruction(mood);
        let text = self.generator.generate(&instruction).await?;
        let reply: MovieRecommendationReply = parse_reply(&text)?;

        Ok(MovieRecommendation {
            title: reply.title.unwrap_or_default().trim().to_string(),
            reason: reply.reason.unwrap_or_default().trim().to_string(),
            imdb_id: reply.imdb_id,
            trailer_url: reply.trailer_url,
        })
    }
}

fn journaling_instruction(summary: &str) -> String {
    format!(
        r#"Based on the user's recent mood history, create a tailored journaling prompt to help them explore their emotions more deeply and gain new insights.

Mood History: Recent moods: {summary}

Respond with JSON only, using this exact schema:
{{
  "prompt": "the journaling prompt"
}}"#
    )
}

fn movie_instruction(mood: Mood) -> String {
    format!(
        r#"You are a movie expert. Based on the user's mood, recommend a single Hollywood movie that would be a good fit. Provide the movie title, its IMDB ID, a short, compelling, and casual reason, and a valid YouTube URL for its official trailer.

Mood: {mood}

Respond with JSON only, using this exact schema:
{{
  "title": "movie title",
  "imdbId": "tt0000000",
  "reason": "why it fits the mood",
  "trailerUrl": "https://www.youtube.com/watch?v=..."
}}"#
    )
}

/// Parse and validate a reply. Models like to wrap JSON in a Markdown fence,
/// so anything outside the outermost braces is ignored.
fn parse_reply<T: DeserializeOwned + Validate>(text: &str) -> Result<T, GenerationError> {
    let start = text.find('{');
    let end = text.rfind('}');
    let body = match (start, end) {
        (Some(s), Some(e)) if s < e => &text[s..=e],
        _ => return Err(GenerationError::InvalidReply("reply contains no JSON object".into())),
    };

    let reply: T = serde_json::from_str(body)
        .map_err(|e| GenerationError::InvalidReply(format!("malformed JSON: {e}")))?;
    reply
        .validate()
        .map_err(|e| GenerationError::InvalidReply(e.to_string()))?;
    Ok(reply)
}
