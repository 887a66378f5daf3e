use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::model::config::Locale;
use crate::model::task::Task;
use crate::ops::recurrence::ScanResult;
use crate::parse::date_expr;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: u64,
    pub title: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct TaskListJson {
    pub workspace: String,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct ScanJson {
    pub scanned: usize,
    pub created: Vec<SpawnJson>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exhausted: Vec<u64>,
    pub dry_run: bool,
}

#[derive(Serialize)]
pub struct SpawnJson {
    pub template: u64,
    pub task: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
}

#[derive(Serialize)]
pub struct ParsedDateJson {
    pub input: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub label: String,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

fn iso(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}

pub fn task_to_json(task: &Task, today: NaiveDate, locale: Locale) -> TaskJson {
    TaskJson {
        id: task.id,
        title: task.title.clone(),
        completed: task.is_completed,
        due: task.due_date.map(iso),
        due_label: task
            .due_date
            .map(|d| date_expr::format_for_display(d, today, locale)),
        reminder: task.reminder_date.map(iso),
        recurring: task.recurring.as_ref().map(|r| r.describe()),
        tags: task.tags.clone(),
        list: task.list.clone(),
        notes: task.notes.clone(),
        completed_at: task.completed_at.map(iso),
        created_at: iso(task.created_at),
    }
}

pub fn scan_to_json(result: &ScanResult, dry_run: bool) -> ScanJson {
    ScanJson {
        scanned: result.scanned,
        created: result
            .spawned
            .iter()
            .map(|s| SpawnJson {
                template: s.template_id,
                task: s.successor_id,
                due: s.due_date.map(iso),
            })
            .collect(),
        exhausted: result.exhausted.clone(),
        dry_run,
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Format a single task as a one-line summary
pub fn format_task_line(task: &Task, today: NaiveDate, locale: Locale) -> String {
    let mark = if task.is_completed { 'x' } else { ' ' };
    let due_str = task
        .due_date
        .map(|d| format!("  @{}", date_expr::format_for_display(d, today, locale)))
        .unwrap_or_default();
    let repeat_str = if task.is_recurring() { " ↻" } else { "" };
    let tags_str = if task.tags.is_empty() {
        String::new()
    } else {
        format!(
            " {}",
            task.tags
                .iter()
                .map(|t| format!("#{}", t))
                .collect::<Vec<_>>()
                .join(" ")
        )
    };
    format!(
        "[{}] {:>3}  {}{}{}{}",
        mark, task.id, task.title, due_str, repeat_str, tags_str
    )
}

/// Format detailed task view
pub fn format_task_detail(task: &Task, today: NaiveDate, locale: Locale) -> Vec<String> {
    let mut lines = vec![format_task_line(task, today, locale)];
    if let Some(due) = task.due_date {
        lines.push(format!(
            "  due:       {} ({})",
            due.format("%d.%m.%Y %H:%M"),
            date_expr::format_for_display(due, today, locale)
        ));
    }
    if let Some(reminder) = task.reminder_date {
        lines.push(format!(
            "  reminder:  {}",
            reminder.format("%d.%m.%Y %H:%M")
        ));
    }
    if let Some(rule) = &task.recurring {
        lines.push(format!("  repeats:   {}", rule.describe()));
    }
    if let Some(list) = &task.list {
        lines.push(format!("  list:      {}", list));
    }
    if let Some(notes) = &task.notes {
        lines.push("  notes:".to_string());
        for line in notes.lines() {
            lines.push(format!("    {}", line));
        }
    }
    lines.push(format!(
        "  created:   {}",
        task.created_at.format("%d.%m.%Y %H:%M")
    ));
    if let Some(done_at) = task.completed_at {
        lines.push(format!(
            "  completed: {}",
            done_at.format("%d.%m.%Y %H:%M")
        ));
    }
    lines
}

/// Format the outcome of a recurrence scan
pub fn format_scan_result(result: &ScanResult, dry_run: bool) -> Vec<String> {
    if result.is_empty() {
        return vec!["(nothing to reschedule)".to_string()];
    }
    let mut lines = Vec::new();
    for spawn in &result.spawned {
        let due_str = spawn
            .due_date
            .map(|d| format!("  due {}", d.format("%d.%m.%Y")))
            .unwrap_or_default();
        if dry_run {
            lines.push(format!(
                "would create a follow-up of #{}{}",
                spawn.template_id, due_str
            ));
        } else {
            lines.push(format!(
                "created #{} from #{}{}",
                spawn.successor_id, spawn.template_id, due_str
            ));
        }
    }
    for id in &result.exhausted {
        lines.push(format!("#{} reached its end date", id));
    }
    lines
}
