//! The authoritative task collection.
//!
//! `TaskStore` is the single system of record that every view reads from and
//! writes through. All operations are synchronous and infallible: operations
//! on an unknown id are no-ops, and `add` never fails. Snapshot load/save is
//! a thin optional layer beneath the operations.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::fields::Status;
use crate::task::{Task, TaskFields};

/// In-memory task collection in insertion order.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskStore {
    tasks: Vec<Task>,
    #[serde(default = "first_id")]
    next_id: u64,
}

fn first_id() -> u64 {
    1
}

/// Largest id or counter value a snapshot may carry.
const MAX_ID: u64 = i64::MAX as u64;

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self { tasks: Vec::new(), next_id: first_id() }
    }

    /// Load a snapshot from JSON, returning an empty store if the file is absent.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            info!(path = %path.display(), "no task snapshot, starting empty");
            return Ok(Self::new());
        }
        let buf = fs::read_to_string(path)?;
        let mut store: TaskStore = serde_json::from_str(&buf)?;
        store.check_ids()?;
        info!(path = %path.display(), tasks = store.tasks.len(), "loaded task snapshot");
        Ok(store)
    }

    /// Reject duplicate or oversized ids and move the counter past the largest id.
    fn check_ids(&mut self) -> Result<(), StoreError> {
        let mut seen = HashSet::with_capacity(self.tasks.len());
        for task in &self.tasks {
            if task.id > MAX_ID {
                return Err(StoreError::IdOutOfRange(task.id));
            }
            if !seen.insert(task.id) {
                return Err(StoreError::DuplicateId(task.id));
            }
        }
        if self.next_id > MAX_ID {
            return Err(StoreError::IdOutOfRange(self.next_id));
        }
        // Ids must stay fresh even if the counter was lost or hand-edited.
        if let Some(max_id) = seen.into_iter().max() {
            self.next_id = self.next_id.max(max_id.saturating_add(1));
        }
        Ok(())
    }

    /// Save a snapshot to JSON using an atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(self)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        info!(path = %path.display(), tasks = self.tasks.len(), "saved task snapshot");
        Ok(())
    }

    /// Insert a task, or merge into the existing task with the same title and due date.
    ///
    /// Returns the id of the inserted or merged task.
    pub fn add(&mut self, fields: TaskFields) -> u64 {
        let now = Utc::now();
        if let Some(existing) = self
            .tasks
            .iter_mut()
            .find(|t| t.title == fields.title && t.due_date == fields.due_date)
        {
            existing.apply(fields, now);
            debug!(id = existing.id, "merged resubmitted task");
            return existing.id;
        }

        let id = self.next_id;
        self.next_id = id.saturating_add(1);
        self.tasks.push(Task {
            id,
            title: fields.title,
            description: fields.description,
            category: fields.category,
            due_date: fields.due_date,
            status: fields.status,
            attachment: fields.attachment,
            created_at: now,
            updated_at: now,
        });
        debug!(id, "added task");
        id
    }

    /// Replace every editable field of a task. Returns false for an unknown id.
    pub fn update(&mut self, id: u64, fields: TaskFields) -> bool {
        match self.get_mut(id) {
            Some(task) => {
                task.apply(fields, Utc::now());
                debug!(id, "updated task");
                true
            }
            None => {
                warn!(id, "update of unknown task ignored");
                false
            }
        }
    }

    /// Move a task to another status. Returns false for an unknown id.
    pub fn set_status(&mut self, id: u64, status: Status) -> bool {
        match self.get_mut(id) {
            Some(task) => {
                task.status = status;
                task.updated_at = Utc::now();
                debug!(id, %status, "set task status");
                true
            }
            None => {
                warn!(id, %status, "status change of unknown task ignored");
                false
            }
        }
    }

    /// Remove a task. Returns false if it was not present.
    pub fn delete(&mut self, id: u64) -> bool {
        self.delete_many(&[id]) == 1
    }

    /// Remove every listed task, returning how many were present.
    pub fn delete_many(&mut self, ids: &[u64]) -> usize {
        let ids: HashSet<u64> = ids.iter().copied().collect();
        let before = self.tasks.len();
        self.tasks.retain(|t| !ids.contains(&t.id));
        let removed = before - self.tasks.len();
        debug!(requested = ids.len(), removed, "deleted tasks");
        removed
    }

    /// Read-only snapshot in insertion order.
    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Category;
    use chrono::{DateTime, Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    fn due(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, day, 10, 0, 0).unwrap()
    }

    fn fields(title: &str, day: u32) -> TaskFields {
        TaskFields::new(title, Category::Work, due(day), Status::ToDo)
    }

    #[fixture]
    fn five_tasks() -> (TaskStore, Vec<u64>) {
        let mut store = TaskStore::new();
        let ids = (1..=5).map(|d| store.add(fields(&format!("task {d}"), d))).collect();
        (store, ids)
    }

    #[test]
    fn ids_are_pairwise_distinct() {
        let mut store = TaskStore::new();
        let mut seen = HashSet::new();
        for i in 0..50 {
            let id = store.add(fields(&format!("t{i}"), 1 + (i % 28)));
            assert!(seen.insert(id), "duplicate id {id}");
        }
        assert_eq!(store.len(), 50);
    }

    #[test]
    fn resubmission_merges_on_title_and_due_date() {
        let mut store = TaskStore::new();
        let first = store.add(fields("Gym", 3));

        let mut again = fields("Gym", 3);
        again.category = Category::Personal;
        again.description = "leg day".into();
        let second = store.add(again);

        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
        let task = store.get(first).unwrap();
        assert_eq!(task.category, Category::Personal);
        assert_eq!(task.description, "leg day");
    }

    #[test]
    fn same_title_different_due_date_is_a_new_task() {
        let mut store = TaskStore::new();
        let a = store.add(fields("Gym", 3));
        let b = store.add(fields("Gym", 4));
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[rstest]
    fn bulk_delete_removes_exactly_the_listed_ids(five_tasks: (TaskStore, Vec<u64>)) {
        let (mut store, ids) = five_tasks;
        let removed = store.delete_many(&[ids[1], ids[3]]);
        assert_eq!(removed, 2);
        assert_eq!(store.len(), 3);
        assert!(store.list().iter().all(|t| t.id != ids[1] && t.id != ids[3]));
    }

    #[rstest]
    fn unknown_ids_are_no_ops(five_tasks: (TaskStore, Vec<u64>)) {
        let (mut store, _) = five_tasks;
        assert!(!store.update(999, fields("ghost", 9)));
        assert!(!store.set_status(999, Status::Completed));
        assert!(!store.delete(999));
        assert_eq!(store.delete_many(&[998, 999]), 0);
        assert_eq!(store.len(), 5);
    }

    #[rstest]
    fn update_preserves_id_and_insertion_order(five_tasks: (TaskStore, Vec<u64>)) {
        let (mut store, ids) = five_tasks;
        let mut changed = fields("renamed", 20);
        changed.status = Status::InProgress;
        assert!(store.update(ids[2], changed));

        let order: Vec<u64> = store.list().iter().map(|t| t.id).collect();
        assert_eq!(order, ids);
        let task = store.get(ids[2]).unwrap();
        assert_eq!(task.title, "renamed");
        assert_eq!(task.status, Status::InProgress);
        assert!(task.updated_at >= task.created_at);
    }

    #[test]
    fn set_status_is_visible_on_next_read() {
        let mut store = TaskStore::new();
        let id = store.add(fields("ship", 1));
        store.set_status(id, Status::Completed);
        assert_eq!(store.get(id).unwrap().status, Status::Completed);
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let mut store = TaskStore::new();
        let a = store.add(fields("a", 1));
        store.delete(a);
        let b = store.add(fields("b", 2));
        assert_ne!(a, b);
    }

    #[test]
    fn snapshot_round_trip_keeps_counter_ahead() {
        let dir = std::env::temp_dir().join(format!("taskboard-store-{}", std::process::id()));
        let path = dir.join("tasks.json");
        let mut store = TaskStore::new();
        let a = store.add(fields("a", 1));
        store.add(fields("b", 2));
        store.delete(a);
        store.save(&path).unwrap();

        let mut loaded = TaskStore::load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        let c = loaded.add(TaskFields::new("c", Category::Personal, due(1) + Duration::days(1), Status::ToDo));
        assert!(c > a);
        fs::remove_dir_all(dir).ok();
    }

    fn write_snapshot(name: &str, json: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("taskboard-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tasks.json");
        fs::write(&path, json).unwrap();
        path
    }

    fn task_json(id: u64) -> String {
        format!(
            r#"{{"id":{id},"title":"t{id}","category":"work","due_date":"2024-12-01T10:00:00Z","status":"TO-DO","created_at":"2024-12-01T10:00:00Z","updated_at":"2024-12-01T10:00:00Z"}}"#
        )
    }

    #[test]
    fn load_rejects_duplicate_ids() {
        let json = format!(r#"{{"tasks":[{},{}],"next_id":8}}"#, task_json(7), task_json(7));
        let path = write_snapshot("dup", &json);
        let err = TaskStore::load(&path).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(7)), "{err}");
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[rstest]
    #[case("max-task-id", format!(r#"{{"tasks":[{}],"next_id":1}}"#, task_json(u64::MAX)))]
    #[case("max-counter", format!(r#"{{"tasks":[{}],"next_id":{}}}"#, task_json(2), u64::MAX))]
    fn load_rejects_ids_the_counter_cannot_pass(#[case] name: &str, #[case] json: String) {
        let path = write_snapshot(name, &json);
        let err = TaskStore::load(&path).unwrap_err();
        assert!(matches!(err, StoreError::IdOutOfRange(u64::MAX)), "{err}");
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn load_moves_counter_past_largest_id() {
        let json = format!(r#"{{"tasks":[{},{}],"next_id":1}}"#, task_json(4), task_json(9));
        let path = write_snapshot("counter", &json);
        let mut store = TaskStore::load(&path).unwrap();
        assert_eq!(store.add(fields("fresh", 1)), 10);
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn missing_snapshot_is_empty() {
        let store = TaskStore::load(Path::new("/definitely/not/here/tasks.json")).unwrap();
        assert!(store.is_empty());
    }
}
