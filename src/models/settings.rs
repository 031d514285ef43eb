use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Reminder preferences. Purely cosmetic: nothing schedules reminders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSettings {
    pub reminders_enabled: bool,

    /// 24h wall-clock time, "HH:MM"
    #[validate(custom = "validate_reminder_time")]
    pub reminder_time: String,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            reminders_enabled: false,
            reminder_time: "19:00".into(),
        }
    }
}

fn validate_reminder_time(value: &str) -> Result<(), ValidationError> {
    // NaiveTime accepts "9:00" too; require the zero-padded form.
    if value.len() == 5 && NaiveTime::parse_from_str(value, "%H:%M").is_ok() {
        Ok(())
    } else {
        let mut err = ValidationError::new("reminder_time");
        err.message = Some("reminderTime must be HH:MM".into());
        Err(err)
    }
}
