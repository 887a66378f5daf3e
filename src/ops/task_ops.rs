use chrono::NaiveDateTime;

use crate::model::task::{PatternError, RecurrencePattern, Task};

// ---------------------------------------------------------------------------
// Completion transitions
// ---------------------------------------------------------------------------

/// Mark a task completed at `now`. Returns false when it was already
/// completed, in which case the original completion time is kept so a
/// repeated `done` cannot retrigger the recurrence scan.
pub fn complete(task: &mut Task, now: NaiveDateTime) -> bool {
    if task.is_completed {
        return false;
    }
    task.is_completed = true;
    task.completed_at = Some(now);
    true
}

/// Put a completed task back on the list, clearing the completion
/// time and the recurrence watermark. Returns false when the task
/// was not completed.
pub fn reopen(task: &mut Task) -> bool {
    if !task.is_completed {
        return false;
    }
    task.is_completed = false;
    task.completed_at = None;
    task.last_recurred_at = None;
    true
}

// ---------------------------------------------------------------------------
// Schedule edits
// ---------------------------------------------------------------------------

/// Set or clear the due date.
pub fn set_due(task: &mut Task, due: Option<NaiveDateTime>) {
    task.due_date = due;
}

/// Set or clear the reminder.
pub fn set_reminder(task: &mut Task, reminder: Option<NaiveDateTime>) {
    task.reminder_date = reminder;
}

/// Attach a recurrence pattern after validating it.
pub fn set_pattern(task: &mut Task, pattern: RecurrencePattern) -> Result<(), PatternError> {
    pattern.validate()?;
    task.recurring = Some(pattern);
    Ok(())
}

/// Remove the recurrence pattern. Returns false when none was set.
pub fn clear_pattern(task: &mut Task) -> bool {
    task.recurring.take().is_some()
}
