//! # ReflectFlow — Request/Response DTOs
//!
//! API contract types that are not domain models themselves.
//!
//! Conventions:
//! - `*Request` → deserialized from client JSON body
//! - `*Query`   → deserialized from query params
//! - Validation is expressed via `validator` derive macros

use serde::Deserialize;
use validator::Validate;

use crate::models::mood::{Mood, MoodEntryDraft};

// ============================================================================
// Entries
// ============================================================================

/// POST /api/entries
///
/// `emoji` and `value` default to the catalog values for `mood`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEntryRequest {
    pub mood: Mood,

    #[validate(length(min = 1, max = 16, message = "Emoji must be 1-16 characters"))]
    pub emoji: Option<String>,

    #[validate(range(min = 1, max = 5, message = "Value must be between 1 and 5"))]
    pub value: Option<i32>,

    #[validate(length(max = 5000, message = "Journal must be under 5000 characters"))]
    pub journal: Option<String>,
}

impl CreateEntryRequest {
    pub fn into_draft(self) -> MoodEntryDraft {
        let mut draft = MoodEntryDraft::from_catalog(self.mood, self.journal);
        if let Some(emoji) = self.emoji {
            draft.emoji = emoji;
        }
        if let Some(value) = self.value {
            draft.value = value;
        }
        draft
    }
}

/// GET /api/entries
#[derive(Debug, Default, Deserialize)]
pub struct EntriesQuery {
    pub limit: Option<usize>,
}

// ============================================================================
// Stats
// ============================================================================

/// GET /api/stats/mood-counts
#[derive(Debug, Default, Deserialize)]
pub struct MoodCountsQuery {
    pub n: Option<usize>,
}

/// GET /api/stats/daily-average
#[derive(Debug, Default, Deserialize, Validate)]
pub struct DailyAverageQuery {
    #[validate(range(min = 1, max = 366, message = "window_days must be 1-366"))]
    pub window_days: Option<i64>,
}

// ============================================================================
// AI actions
// ============================================================================

/// POST /api/ai/movie-recommendation
#[derive(Debug, Deserialize)]
pub struct MovieRecommendationRequest {
    pub mood: Mood,
}
