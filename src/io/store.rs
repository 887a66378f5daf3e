use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::model::task::{NewTask, Task};

/// Error type for task persistence
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("task not found: {0}")]
    TaskNotFound(u64),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid task file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not serialize task file: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Persistence seam for tasks. The JSON-backed store is the production
/// implementation; the memory store backs unit tests and dry runs.
pub trait TaskStore {
    /// All tasks in stored order.
    fn all_tasks(&self) -> Result<Vec<Task>, StoreError>;
    /// Look up a single task by id.
    fn get_task(&self, id: u64) -> Result<Task, StoreError>;
    /// Persist a draft, assigning the next id and the creation time.
    fn create_task(&mut self, draft: NewTask) -> Result<Task, StoreError>;
    /// Replace the stored task carrying the same id.
    fn update_task(&mut self, task: &Task) -> Result<(), StoreError>;
    /// Remove a task and return it. Its id is never handed out again.
    fn delete_task(&mut self, id: u64) -> Result<Task, StoreError>;
}

/// On-disk layout of tasks.json
#[derive(Debug, Serialize, Deserialize)]
struct TaskDocument {
    version: u32,
    next_id: u64,
    tasks: Vec<Task>,
}

impl Default for TaskDocument {
    fn default() -> Self {
        TaskDocument {
            version: 1,
            next_id: 1,
            tasks: Vec::new(),
        }
    }
}

/// Fill in the store-assigned fields of a draft.
fn materialize(draft: NewTask, id: u64) -> Task {
    Task {
        id,
        title: draft.title,
        notes: draft.notes,
        tags: draft.tags,
        list: draft.list,
        due_date: draft.due_date,
        reminder_date: draft.reminder_date,
        is_completed: false,
        completed_at: None,
        created_at: Local::now().naive_local(),
        recurring: draft.recurring,
        last_recurred_at: None,
    }
}

// ---------------------------------------------------------------------------
// JSON-backed store
// ---------------------------------------------------------------------------

/// Task store persisted to a single tasks.json document. Every mutation
/// writes the whole document back atomically.
pub struct JsonStore {
    path: PathBuf,
    doc: TaskDocument,
}

impl JsonStore {
    /// Open an existing task file.
    pub fn open(path: &Path) -> Result<JsonStore, StoreError> {
        let text = fs::read_to_string(path).map_err(|e| StoreError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let doc = serde_json::from_str(&text).map_err(|e| StoreError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(JsonStore {
            path: path.to_path_buf(),
            doc,
        })
    }

    /// Create a fresh task file holding no tasks.
    pub fn create(path: &Path) -> Result<JsonStore, StoreError> {
        let store = JsonStore {
            path: path.to_path_buf(),
            doc: TaskDocument::default(),
        };
        store.save()?;
        Ok(store)
    }

    /// The id the next created task will receive.
    pub fn next_id(&self) -> u64 {
        self.doc.next_id
    }

    /// Write the document to a temp file in the same directory, then
    /// rename it over the target so readers never see a partial file.
    fn save(&self) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&self.doc)?;
        let dir = self.path.parent().unwrap_or(Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.write_error(e))?;
        tmp.write_all(text.as_bytes())
            .map_err(|e| self.write_error(e))?;
        tmp.flush().map_err(|e| self.write_error(e))?;
        tmp.persist(&self.path)
            .map_err(|e| self.write_error(e.error))?;
        Ok(())
    }

    fn write_error(&self, source: std::io::Error) -> StoreError {
        StoreError::WriteError {
            path: self.path.clone(),
            source,
        }
    }
}

impl TaskStore for JsonStore {
    fn all_tasks(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.doc.tasks.clone())
    }

    fn get_task(&self, id: u64) -> Result<Task, StoreError> {
        self.doc
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(StoreError::TaskNotFound(id))
    }

    fn create_task(&mut self, draft: NewTask) -> Result<Task, StoreError> {
        let task = materialize(draft, self.doc.next_id);
        self.doc.next_id += 1;
        self.doc.tasks.push(task.clone());
        self.save()?;
        Ok(task)
    }

    fn update_task(&mut self, task: &Task) -> Result<(), StoreError> {
        let slot = self
            .doc
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or(StoreError::TaskNotFound(task.id))?;
        *slot = task.clone();
        self.save()
    }

    fn delete_task(&mut self, id: u64) -> Result<Task, StoreError> {
        let index = self
            .doc
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::TaskNotFound(id))?;
        let task = self.doc.tasks.remove(index);
        self.save()?;
        Ok(task)
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Store backed by a plain vector, used by tests and `scan --dry-run`.
#[derive(Debug)]
pub struct MemoryStore {
    next_id: u64,
    tasks: Vec<Task>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore {
            next_id: 1,
            tasks: Vec::new(),
        }
    }

    /// Build a store over an existing snapshot, continuing its id
    /// sequence. Dry runs use this to predict the ids a real run
    /// would assign.
    pub fn seeded(tasks: Vec<Task>, next_id: u64) -> MemoryStore {
        MemoryStore { next_id, tasks }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new()
    }
}

impl TaskStore for MemoryStore {
    fn all_tasks(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.tasks.clone())
    }

    fn get_task(&self, id: u64) -> Result<Task, StoreError> {
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(StoreError::TaskNotFound(id))
    }

    fn create_task(&mut self, draft: NewTask) -> Result<Task, StoreError> {
        let task = materialize(draft, self.next_id);
        self.next_id += 1;
        self.tasks.push(task.clone());
        Ok(task)
    }

    fn update_task(&mut self, task: &Task) -> Result<(), StoreError> {
        let slot = self
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or(StoreError::TaskNotFound(task.id))?;
        *slot = task.clone();
        Ok(())
    }

    fn delete_task(&mut self, id: u64) -> Result<Task, StoreError> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::TaskNotFound(id))?;
        Ok(self.tasks.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tasks_path(tmp: &TempDir) -> PathBuf {
        tmp.path().join("tasks.json")
    }

    // --- Creation and ids ---

    #[test]
    fn test_create_writes_empty_document() {
        let tmp = TempDir::new().unwrap();
        let path = tasks_path(&tmp);
        let store = JsonStore::create(&path).unwrap();
        assert!(path.exists());
        assert!(store.all_tasks().unwrap().is_empty());
        assert_eq!(store.next_id(), 1);
    }

    #[test]
    fn test_ids_are_sequential() {
        let tmp = TempDir::new().unwrap();
        let mut store = JsonStore::create(&tasks_path(&tmp)).unwrap();
        let a = store.create_task(NewTask::new("a".into())).unwrap();
        let b = store.create_task(NewTask::new("b".into())).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert!(!a.is_completed);
        assert!(a.completed_at.is_none());
    }

    #[test]
    fn test_ids_are_never_reused_after_delete() {
        let tmp = TempDir::new().unwrap();
        let mut store = JsonStore::create(&tasks_path(&tmp)).unwrap();
        store.create_task(NewTask::new("a".into())).unwrap();
        let b = store.create_task(NewTask::new("b".into())).unwrap();
        store.delete_task(b.id).unwrap();
        let c = store.create_task(NewTask::new("c".into())).unwrap();
        assert_eq!(c.id, 3);
    }

    // --- Persistence round trips ---

    #[test]
    fn test_reopen_sees_created_tasks() {
        let tmp = TempDir::new().unwrap();
        let path = tasks_path(&tmp);
        let created = {
            let mut store = JsonStore::create(&path).unwrap();
            store.create_task(NewTask::new("Water plants".into())).unwrap()
        };
        let store = JsonStore::open(&path).unwrap();
        assert_eq!(store.all_tasks().unwrap(), vec![created]);
        assert_eq!(store.next_id(), 2);
    }

    #[test]
    fn test_update_persists() {
        let tmp = TempDir::new().unwrap();
        let path = tasks_path(&tmp);
        let mut store = JsonStore::create(&path).unwrap();
        let mut task = store.create_task(NewTask::new("a".into())).unwrap();
        task.title = "renamed".into();
        store.update_task(&task).unwrap();

        let reloaded = JsonStore::open(&path).unwrap();
        assert_eq!(reloaded.get_task(task.id).unwrap().title, "renamed");
    }

    #[test]
    fn test_delete_persists_and_returns_task() {
        let tmp = TempDir::new().unwrap();
        let path = tasks_path(&tmp);
        let mut store = JsonStore::create(&path).unwrap();
        let task = store.create_task(NewTask::new("a".into())).unwrap();
        let removed = store.delete_task(task.id).unwrap();
        assert_eq!(removed.title, "a");

        let reloaded = JsonStore::open(&path).unwrap();
        assert!(reloaded.all_tasks().unwrap().is_empty());
    }

    #[test]
    fn test_save_leaves_no_temp_artifacts() {
        let tmp = TempDir::new().unwrap();
        let path = tasks_path(&tmp);
        let mut store = JsonStore::create(&path).unwrap();
        for title in ["one", "two", "three"] {
            store.create_task(NewTask::new(title.into())).unwrap();
        }

        // Every save goes through a sibling temp file; after the rename
        // only the task file itself may remain.
        let entries: Vec<String> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["tasks.json"]);

        let reloaded = JsonStore::open(&path).unwrap();
        assert_eq!(reloaded.all_tasks().unwrap().len(), 3);
        assert_eq!(reloaded.next_id(), 4);
    }

    // --- Errors ---

    #[test]
    fn test_missing_ids_report_not_found() {
        let tmp = TempDir::new().unwrap();
        let mut store = JsonStore::create(&tasks_path(&tmp)).unwrap();
        assert!(matches!(
            store.get_task(42),
            Err(StoreError::TaskNotFound(42))
        ));
        assert!(matches!(
            store.delete_task(42),
            Err(StoreError::TaskNotFound(42))
        ));
    }

    #[test]
    fn test_open_missing_file_fails() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            JsonStore::open(&tasks_path(&tmp)),
            Err(StoreError::ReadError { .. })
        ));
    }

    #[test]
    fn test_open_corrupt_file_fails() {
        let tmp = TempDir::new().unwrap();
        let path = tasks_path(&tmp);
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JsonStore::open(&path),
            Err(StoreError::ParseError { .. })
        ));
    }

    // --- Memory store ---

    #[test]
    fn test_memory_store_matches_json_semantics() {
        let mut store = MemoryStore::new();
        let a = store.create_task(NewTask::new("a".into())).unwrap();
        let b = store.create_task(NewTask::new("b".into())).unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        store.delete_task(a.id).unwrap();
        assert_eq!(store.create_task(NewTask::new("c".into())).unwrap().id, 3);
    }

    #[test]
    fn test_seeded_store_continues_id_sequence() {
        let mut source = MemoryStore::new();
        source.create_task(NewTask::new("a".into())).unwrap();
        let snapshot = source.all_tasks().unwrap();

        let mut copy = MemoryStore::seeded(snapshot, 2);
        let b = copy.create_task(NewTask::new("b".into())).unwrap();
        assert_eq!(b.id, 2);
        assert_eq!(copy.all_tasks().unwrap().len(), 2);
    }
}
