//! End-to-end recurrence behavior through the JSON store.
//!
//! These tests drive the engine against a real task file, reloading the
//! store between steps the way separate CLI invocations would.

use std::path::Path;

use chores::io::store::{JsonStore, MemoryStore, TaskStore};
use chores::model::task::{NewTask, RecurrenceKind, RecurrencePattern};
use chores::ops::recurrence::RecurrenceEngine;
use chores::ops::task_ops;
use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;

fn dt(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

/// Add a weekly task due 2024-01-08 and return its id.
fn add_weekly(store: &mut JsonStore, end_date: Option<NaiveDateTime>) -> u64 {
    let mut pattern = RecurrencePattern::new(RecurrenceKind::Weekly, 1);
    pattern.end_date = end_date;

    let mut draft = NewTask::new("Change towels".to_string());
    draft.due_date = Some(dt(2024, 1, 8, 0));
    draft.tags = vec!["home".to_string()];
    draft.recurring = Some(pattern);
    store.create_task(draft).unwrap().id
}

fn complete(store: &mut JsonStore, id: u64, at: NaiveDateTime) {
    let mut task = store.get_task(id).unwrap();
    assert!(task_ops::complete(&mut task, at));
    store.update_task(&task).unwrap();
}

fn scan(path: &Path, now: NaiveDateTime) -> chores::ops::recurrence::ScanResult {
    let mut store = JsonStore::open(path).unwrap();
    RecurrenceEngine::new(&mut store).process_all(now).unwrap()
}

#[test]
fn successor_persists_across_reload() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("tasks.json");

    let mut store = JsonStore::create(&path).unwrap();
    let id = add_weekly(&mut store, None);
    complete(&mut store, id, dt(2024, 1, 8, 10));

    // Scan runs against a fresh handle, as a later invocation would
    let result = scan(&path, dt(2024, 1, 20, 9));
    assert_eq!(result.spawned.len(), 1);
    let spawn = &result.spawned[0];
    assert_eq!(spawn.template_id, id);
    assert_eq!(spawn.due_date, Some(dt(2024, 1, 15, 0)));

    let store = JsonStore::open(&path).unwrap();
    let successor = store.get_task(spawn.successor_id).unwrap();
    assert_eq!(successor.title, "Change towels");
    assert_eq!(successor.tags, vec!["home".to_string()]);
    assert!(!successor.is_completed);
    assert!(successor.recurring.is_some());

    let template = store.get_task(id).unwrap();
    assert!(template.is_completed);
    assert_eq!(template.last_recurred_at, Some(dt(2024, 1, 8, 10)));
}

#[test]
fn watermark_survives_reload() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("tasks.json");

    let mut store = JsonStore::create(&path).unwrap();
    let id = add_weekly(&mut store, None);
    complete(&mut store, id, dt(2024, 1, 8, 10));

    let first = scan(&path, dt(2024, 1, 20, 9));
    assert_eq!(first.spawned.len(), 1);

    // The same completion must not spawn again, even much later
    let second = scan(&path, dt(2024, 3, 1, 9));
    assert!(second.is_empty());
}

#[test]
fn three_generation_chain() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("tasks.json");

    let mut store = JsonStore::create(&path).unwrap();
    let gen1 = add_weekly(&mut store, None);
    drop(store);

    // Each generation is finished late; the due date still advances by
    // exactly one week per completion, with no catch-up copies.
    let mut store = JsonStore::open(&path).unwrap();
    complete(&mut store, gen1, dt(2024, 1, 8, 10));
    drop(store);
    let result = scan(&path, dt(2024, 1, 20, 9));
    let gen2 = result.spawned[0].successor_id;
    assert_eq!(result.spawned[0].due_date, Some(dt(2024, 1, 15, 0)));

    let mut store = JsonStore::open(&path).unwrap();
    complete(&mut store, gen2, dt(2024, 1, 20, 10));
    drop(store);
    let result = scan(&path, dt(2024, 2, 1, 9));
    let gen3 = result.spawned[0].successor_id;
    assert_eq!(result.spawned[0].due_date, Some(dt(2024, 1, 22, 0)));

    let mut store = JsonStore::open(&path).unwrap();
    complete(&mut store, gen3, dt(2024, 2, 1, 10));
    drop(store);
    let result = scan(&path, dt(2024, 2, 15, 9));
    let gen4 = result.spawned[0].successor_id;
    assert_eq!(result.spawned[0].due_date, Some(dt(2024, 1, 29, 0)));

    assert_eq!((gen1, gen2, gen3, gen4), (1, 2, 3, 4));

    // Three completed generations plus one pending
    let store = JsonStore::open(&path).unwrap();
    let tasks = store.all_tasks().unwrap();
    assert_eq!(tasks.len(), 4);
    assert_eq!(tasks.iter().filter(|t| t.is_completed).count(), 3);
    assert!(!store.get_task(gen4).unwrap().is_completed);
}

#[test]
fn end_date_stops_the_chain() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("tasks.json");

    let mut store = JsonStore::create(&path).unwrap();
    let gen1 = add_weekly(&mut store, Some(dt(2024, 1, 16, 0)));
    complete(&mut store, gen1, dt(2024, 1, 8, 10));
    drop(store);

    // First successor lands on Jan 15, inside the window
    let result = scan(&path, dt(2024, 1, 20, 9));
    let gen2 = result.spawned[0].successor_id;
    assert_eq!(result.spawned[0].due_date, Some(dt(2024, 1, 15, 0)));

    let mut store = JsonStore::open(&path).unwrap();
    complete(&mut store, gen2, dt(2024, 1, 20, 10));
    drop(store);

    // The next one would land on Jan 22, past the end date
    let result = scan(&path, dt(2024, 2, 1, 9));
    assert!(result.spawned.is_empty());
    assert_eq!(result.exhausted, vec![gen2]);

    let store = JsonStore::open(&path).unwrap();
    assert_eq!(store.all_tasks().unwrap().len(), 2);
}

#[test]
fn dry_run_predicts_real_scan() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("tasks.json");

    let mut store = JsonStore::create(&path).unwrap();
    let first = add_weekly(&mut store, None);
    let second = add_weekly(&mut store, None);
    complete(&mut store, first, dt(2024, 1, 8, 10));
    complete(&mut store, second, dt(2024, 1, 9, 10));

    let now = dt(2024, 1, 20, 9);

    // Dry run over a seeded memory copy
    let mut copy = MemoryStore::seeded(store.all_tasks().unwrap(), store.next_id());
    let predicted = RecurrenceEngine::new(&mut copy).process_all(now).unwrap();

    // Real run over the file
    let actual = RecurrenceEngine::new(&mut store).process_all(now).unwrap();

    assert_eq!(predicted, actual);
    assert_eq!(actual.spawned.len(), 2);
}
