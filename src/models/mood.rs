use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Happy,
    Excited,
    Calm,
    Sad,
    Anxious,
    Proud,
    Grateful,
    Tired,
    Angry,
    Stressed,
    Content,
}

impl Mood {
    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Excited => "Excited",
            Mood::Calm => "Calm",
            Mood::Sad => "Sad",
            Mood::Anxious => "Anxious",
            Mood::Proud => "Proud",
            Mood::Grateful => "Grateful",
            Mood::Tired => "Tired",
            Mood::Angry => "Angry",
            Mood::Stressed => "Stressed",
            Mood::Content => "Content",
        }
    }

    /// Catalog entry for this mood. Every variant has exactly one.
    pub fn option(self) -> &'static MoodOption {
        MOOD_OPTIONS
            .iter()
            .find(|o| o.mood == self)
            .unwrap_or(&MOOD_OPTIONS[0])
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MoodOption {
    pub mood: Mood,
    pub emoji: &'static str,
    pub value: i32,
}

/// Fixed vocabulary offered to the user, in display order.
pub static MOOD_OPTIONS: [MoodOption; 11] = [
    MoodOption { mood: Mood::Happy, emoji: "😊", value: 5 },
    MoodOption { mood: Mood::Excited, emoji: "🤩", value: 5 },
    MoodOption { mood: Mood::Proud, emoji: "🥳", value: 5 },
    MoodOption { mood: Mood::Grateful, emoji: "🙏", value: 4 },
    MoodOption { mood: Mood::Calm, emoji: "😌", value: 4 },
    MoodOption { mood: Mood::Content, emoji: "🙂", value: 4 },
    MoodOption { mood: Mood::Sad, emoji: "😢", value: 2 },
    MoodOption { mood: Mood::Tired, emoji: "😴", value: 2 },
    MoodOption { mood: Mood::Anxious, emoji: "😟", value: 1 },
    MoodOption { mood: Mood::Angry, emoji: "😠", value: 1 },
    MoodOption { mood: Mood::Stressed, emoji: "😫", value: 1 },
];

/// One logged mood. `emoji` and `value` are copied from the catalog at
/// creation time and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: String,
    pub mood: Mood,
    pub emoji: String,
    #[serde(with = "iso_millis")]
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    pub value: i32,
}

/// Everything the caller supplies for a new entry; `id` and `date` are
/// assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodEntryDraft {
    pub mood: Mood,
    pub emoji: String,
    pub value: i32,
    pub journal: Option<String>,
}

impl MoodEntryDraft {
    pub fn from_catalog(mood: Mood, journal: Option<String>) -> Self {
        let option = mood.option();
        Self {
            mood,
            emoji: option.emoji.to_string(),
            value: option.value,
            journal,
        }
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2026-10-19T08:30:00.000Z`.
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(date: &DateTime<Utc>) -> String {
        date.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|d| d.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
