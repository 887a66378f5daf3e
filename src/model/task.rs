use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Recurrence
// ---------------------------------------------------------------------------

/// Schedule unit for a recurring task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    /// Accepted in stored data but carries no schedule rule. A custom
    /// task never comes due and never spawns successors.
    Custom,
}

/// Error type for recurrence pattern validation
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("recurrence interval must be at least 1")]
    ZeroInterval,
    #[error("custom recurrence has no schedule; use daily, weekly, monthly, or yearly")]
    CustomUnsupported,
    #[error("weekday index {0} out of range (0 = Sunday .. 6 = Saturday)")]
    WeekdayOutOfRange(u8),
    #[error("day of month {0} out of range (1..=31)")]
    DayOfMonthOutOfRange(u32),
    #[error("{field} only applies to {kind} recurrence")]
    FieldNotApplicable {
        field: &'static str,
        kind: &'static str,
    },
}

/// How and until when a task repeats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrencePattern {
    pub kind: RecurrenceKind,
    /// Number of kind-units between instances (every 2 weeks = 2).
    pub interval: u32,
    /// No successor is created on or after this date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDateTime>,
    /// Weekday indices, 0 = Sunday through 6 = Saturday. Weekly only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<u8>>,
    /// Day the instance falls on, 1..=31. Monthly only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
}

impl RecurrencePattern {
    pub fn new(kind: RecurrenceKind, interval: u32) -> Self {
        RecurrencePattern {
            kind,
            interval,
            end_date: None,
            days_of_week: None,
            day_of_month: None,
        }
    }

    /// Check structural validity. Stored data is not re-validated on
    /// load, so the scan must still tolerate anything here.
    pub fn validate(&self) -> Result<(), PatternError> {
        if self.interval == 0 {
            return Err(PatternError::ZeroInterval);
        }
        if self.kind == RecurrenceKind::Custom {
            return Err(PatternError::CustomUnsupported);
        }
        if let Some(days) = &self.days_of_week {
            if self.kind != RecurrenceKind::Weekly {
                return Err(PatternError::FieldNotApplicable {
                    field: "days_of_week",
                    kind: "weekly",
                });
            }
            for &day in days {
                if day > 6 {
                    return Err(PatternError::WeekdayOutOfRange(day));
                }
            }
        }
        if let Some(day) = self.day_of_month {
            if self.kind != RecurrenceKind::Monthly {
                return Err(PatternError::FieldNotApplicable {
                    field: "day_of_month",
                    kind: "monthly",
                });
            }
            if day == 0 || day > 31 {
                return Err(PatternError::DayOfMonthOutOfRange(day));
            }
        }
        Ok(())
    }

    /// Human-readable summary, e.g. "every 2 weeks until 15.03.2024".
    pub fn describe(&self) -> String {
        let unit = match self.kind {
            RecurrenceKind::Daily => "day",
            RecurrenceKind::Weekly => "week",
            RecurrenceKind::Monthly => "month",
            RecurrenceKind::Yearly => "year",
            RecurrenceKind::Custom => return "custom".to_string(),
        };
        let mut out = if self.interval == 1 {
            format!("every {}", unit)
        } else {
            format!("every {} {}s", self.interval, unit)
        };
        if let Some(days) = &self.days_of_week {
            let names: Vec<&str> = days.iter().map(|&d| weekday_short(d)).collect();
            if !names.is_empty() {
                out.push_str(&format!(" on {}", names.join(", ")));
            }
        }
        if let Some(day) = self.day_of_month {
            out.push_str(&format!(" on day {}", day));
        }
        if let Some(end) = self.end_date {
            out.push_str(&format!(" until {}", end.format("%d.%m.%Y")));
        }
        out
    }
}

fn weekday_short(index: u8) -> &'static str {
    match index {
        0 => "Sun",
        1 => "Mon",
        2 => "Tue",
        3 => "Wed",
        4 => "Thu",
        5 => "Fri",
        6 => "Sat",
        _ => "?",
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// A single task as stored in tasks.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring: Option<RecurrencePattern>,
    /// Completion time of the last instance a successor was spawned
    /// for. Guards the scan against creating duplicates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_recurred_at: Option<NaiveDateTime>,
}

impl Task {
    /// True when this task carries a recurrence rule.
    pub fn is_recurring(&self) -> bool {
        self.recurring.is_some()
    }
}

/// Draft of a task before the store assigns an id and creation time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub list: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub reminder_date: Option<NaiveDateTime>,
    pub recurring: Option<RecurrencePattern>,
}

impl NewTask {
    pub fn new(title: String) -> Self {
        NewTask {
            title,
            ..Default::default()
        }
    }
}
