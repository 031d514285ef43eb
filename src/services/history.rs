//! Read-only summaries over a mood history.
//!
//! All functions take the history as stored (newest first). Calendar days
//! come from the [`Clock`], which converts each entry with the offset in
//! effect at that entry's instant.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::clock::Clock;
use crate::models::mood::{Mood, MoodEntry};

pub const DEFAULT_COUNT_WINDOW: usize = 7;
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoodCount {
    pub mood: Mood,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAverage {
    /// Chart label, e.g. "Oct 9"
    pub day: String,
    pub date: NaiveDate,
    pub avg_value: i32,
}

/// First entry logged on the current local day. Duplicates are allowed in
/// the store; the most recent one wins.
pub fn today_entry<'a>(history: &'a [MoodEntry], clock: &dyn Clock) -> Option<&'a MoodEntry> {
    let today = clock.today();
    history.iter().find(|e| clock.local_date(e.date) == today)
}

pub fn recent(history: &[MoodEntry], n: usize) -> &[MoodEntry] {
    &history[..n.min(history.len())]
}

/// Tally of moods over the `n` most recent entries, in first-seen order.
pub fn mood_counts(history: &[MoodEntry], n: usize) -> Vec<MoodCount> {
    let mut counts: Vec<MoodCount> = Vec::new();
    for entry in recent(history, n) {
        match counts.iter_mut().find(|c| c.mood == entry.mood) {
            Some(c) => c.count += 1,
            None => counts.push(MoodCount {
                mood: entry.mood,
                count: 1,
            }),
        }
    }
    counts
}

/// Per-day mean valence over the trailing window, oldest day first.
///
/// Days without entries are omitted. Means are rounded half-up.
pub fn daily_average(
    history: &[MoodEntry],
    clock: &dyn Clock,
    window_days: i64,
) -> Vec<DailyAverage> {
    let cutoff = clock.now() - Duration::days(window_days);
    let mut days: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();

    for entry in history.iter().filter(|e| e.date > cutoff) {
        let bucket = days.entry(clock.local_date(entry.date)).or_insert((0, 0));
        bucket.0 += i64::from(entry.value);
        bucket.1 += 1;
    }

    days.into_iter()
        .map(|(date, (sum, count))| DailyAverage {
            day: date.format("%b %-d").to_string(),
            date,
            avg_value: round_half_up(sum, count),
        })
        .collect()
}

fn round_half_up(sum: i64, count: i64) -> i32 {
    // floor(sum / count + 1/2) without going through floats
    (2 * sum + count).div_euclid(2 * count) as i32
}

/// "<count> day(s) feeling <mood>" joined by commas, or `None` for no entries.
pub fn mood_summary(counts: &[MoodCount]) -> Option<String> {
    if counts.is_empty() {
        return None;
    }
    let parts: Vec<String> = counts
        .iter()
        .map(|c| format!("{} day(s) feeling {}", c.count, c.mood))
        .collect();
    Some(format!("{}.", parts.join(", ")))
}
