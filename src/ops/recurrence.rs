use chrono::NaiveDateTime;

use crate::io::store::{StoreError, TaskStore};
use crate::model::task::{NewTask, RecurrenceKind, Task};
use crate::util::calendar;

// ---------------------------------------------------------------------------
// Due checks and successor drafts
// ---------------------------------------------------------------------------

/// True when a completed recurring task has waited out its interval.
/// Daily and weekly intervals count whole elapsed days since the
/// completion; monthly and yearly intervals compare calendar
/// components, so Jan 31 to Feb 1 already counts as one month.
pub fn is_due(task: &Task, now: NaiveDateTime) -> bool {
    let Some(pattern) = &task.recurring else {
        return false;
    };
    if !task.is_completed {
        return false;
    }
    let Some(completed_at) = task.completed_at else {
        return false;
    };

    let elapsed = match pattern.kind {
        RecurrenceKind::Daily => (now - completed_at).num_days(),
        RecurrenceKind::Weekly => (now - completed_at).num_days() / 7,
        RecurrenceKind::Monthly => {
            calendar::months_between(completed_at.date(), now.date()) as i64
        }
        RecurrenceKind::Yearly => calendar::years_between(completed_at.date(), now.date()) as i64,
        RecurrenceKind::Custom => return false,
    };
    elapsed >= pattern.interval as i64
}

/// Draft the follow-up instance, due exactly one interval after the
/// current due date. A reminder keeps its offset from the due date.
/// Returns None for custom patterns, for tasks with no due date, and
/// when the advanced date would land on or past the pattern's end.
pub fn next_instance(task: &Task) -> Option<NewTask> {
    let pattern = task.recurring.as_ref()?;
    let due = task.due_date?;

    let next_due = match pattern.kind {
        RecurrenceKind::Daily => calendar::add_days(due, pattern.interval as i64),
        RecurrenceKind::Weekly => calendar::add_days(due, pattern.interval as i64 * 7),
        RecurrenceKind::Monthly => calendar::add_months(due, pattern.interval),
        RecurrenceKind::Yearly => calendar::add_years(due, pattern.interval),
        RecurrenceKind::Custom => return None,
    };

    if let Some(end) = pattern.end_date
        && next_due >= end
    {
        return None;
    }

    Some(NewTask {
        title: task.title.clone(),
        notes: task.notes.clone(),
        tags: task.tags.clone(),
        list: task.list.clone(),
        due_date: Some(next_due),
        reminder_date: task.reminder_date.map(|r| next_due + (r - due)),
        recurring: task.recurring.clone(),
    })
}

// ---------------------------------------------------------------------------
// The scan
// ---------------------------------------------------------------------------

/// One successor created by a scan
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRecord {
    pub template_id: u64,
    pub successor_id: u64,
    pub due_date: Option<NaiveDateTime>,
}

/// Outcome of a scan over the whole store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanResult {
    /// Number of tasks examined.
    pub scanned: usize,
    /// Successors created, in store order of their templates.
    pub spawned: Vec<SpawnRecord>,
    /// Recurring tasks whose end date blocked a successor.
    pub exhausted: Vec<u64>,
}

impl ScanResult {
    pub fn is_empty(&self) -> bool {
        self.spawned.is_empty() && self.exhausted.is_empty()
    }
}

/// Walks the store and creates successor instances for completed
/// recurring tasks. Works against any `TaskStore`, which is how the
/// dry-run mode and the tests substitute a memory store.
pub struct RecurrenceEngine<'a, S: TaskStore> {
    store: &'a mut S,
}

impl<'a, S: TaskStore> RecurrenceEngine<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        RecurrenceEngine { store }
    }

    /// Scan every task once. Each completion spawns at most one
    /// successor, however long ago it happened; there is no catch-up
    /// backlog for missed intervals.
    pub fn process_all(&mut self, now: NaiveDateTime) -> Result<ScanResult, StoreError> {
        let tasks = self.store.all_tasks()?;
        let mut result = ScanResult {
            scanned: tasks.len(),
            ..Default::default()
        };

        for task in &tasks {
            if !task.is_recurring() || !task.is_completed {
                continue;
            }
            let Some(completed_at) = task.completed_at else {
                continue;
            };
            // Already spawned for this completion
            if task.last_recurred_at.is_some_and(|seen| seen >= completed_at) {
                continue;
            }
            if !is_due(task, now) {
                continue;
            }

            match next_instance(task) {
                Some(draft) => {
                    let successor = self.store.create_task(draft)?;
                    let mut stamped = task.clone();
                    stamped.last_recurred_at = Some(completed_at);
                    self.store.update_task(&stamped)?;
                    result.spawned.push(SpawnRecord {
                        template_id: task.id,
                        successor_id: successor.id,
                        due_date: successor.due_date,
                    });
                }
                None if task.due_date.is_some() => {
                    // End date reached. The task stays unstamped, so
                    // pushing the end date back revives the schedule.
                    result.exhausted.push(task.id);
                }
                None => {}
            }
        }
        Ok(result)
    }
}
