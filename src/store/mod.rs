pub mod storage;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::DateTime;

use crate::shared::errors::StorageError;
use crate::shared::now_ms;
use types::{Streak, Task, TaskDraft, TasksData};

/// Thread-safe in-memory task store with file persistence.
/// Every mutation is written back to `tasks.json` under the store directory.
pub struct TaskStore {
    data: RwLock<TasksData>,
    dir: PathBuf,
}

impl TaskStore {
    /// Opens the store at `dir`, loading (and migrating) any persisted data.
    pub fn open(dir: &Path) -> Self {
        let data = storage::load_or_migrate(dir);
        tracing::info!(
            target: "store",
            "Task store initialized: {} tasks, streak {}",
            data.tasks.len(),
            data.streak.count
        );
        Self {
            data: RwLock::new(data),
            dir: dir.to_path_buf(),
        }
    }

    pub fn list_tasks(&self) -> Vec<Task> {
        self.data.read().unwrap().tasks.clone()
    }

    pub fn streak(&self) -> Streak {
        self.data.read().unwrap().streak.clone()
    }

    /// Creates a task from a draft, assigning a current-time-based id and
    /// creation timestamp. New tasks always start incomplete.
    pub fn add_task(&self, draft: TaskDraft) -> Result<Task, StorageError> {
        let mut data = self.data.write().unwrap();

        let now = now_ms();
        let max_id = data.tasks.iter().map(|t| t.id).max().unwrap_or(0);
        // Time-based ids collide when two adds land in the same millisecond.
        let id = now.max(max_id + 1);

        let task = Task {
            id,
            text: draft.text,
            completed: false,
            project: draft.project,
            priority: draft.priority,
            summary: draft.summary,
            description: draft.description,
            due_date: draft.due_date,
            tags: draft.tags,
            created_at: now,
            completed_at: None,
            archived: false,
        };

        data.tasks.push(task.clone());
        storage::save(&self.dir, &data)?;

        Ok(task)
    }

    /// Flips completion state. Completing stamps `completed_at` and bumps
    /// the streak when the completion lands on a new day; un-completing
    /// clears the timestamp and the summary.
    pub fn toggle_completion(&self, id: i64) -> Result<Task, StorageError> {
        let mut data = self.data.write().unwrap();

        let now = now_ms();
        let task = data
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StorageError::not_found(format!("Task not found: {}", id)))?;

        task.completed = !task.completed;
        if task.completed {
            task.completed_at = Some(now);
        } else {
            task.completed_at = None;
            task.summary = String::new();
        }
        let task = task.clone();

        if task.completed && !same_day(data.streak.last_updated, now) {
            data.streak.count += 1;
            data.streak.last_updated = now;
        }

        storage::save(&self.dir, &data)?;
        Ok(task)
    }

    pub fn edit_task(&self, id: i64, text: &str) -> Result<(), StorageError> {
        let text = text.trim();
        let mut data = self.data.write().unwrap();

        let task = data
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StorageError::not_found(format!("Task not found: {}", id)))?;

        task.text = text.to_string();
        storage::save(&self.dir, &data)?;
        Ok(())
    }

    pub fn set_summary(&self, id: i64, summary: &str) -> Result<(), StorageError> {
        let mut data = self.data.write().unwrap();

        let task = data
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StorageError::not_found(format!("Task not found: {}", id)))?;

        task.summary = summary.to_string();
        storage::save(&self.dir, &data)?;
        Ok(())
    }

    pub fn delete_task(&self, id: i64) -> Result<(), StorageError> {
        let mut data = self.data.write().unwrap();

        let existed = data.tasks.iter().any(|t| t.id == id);
        if !existed {
            return Err(StorageError::not_found(format!("Task not found: {}", id)));
        }

        data.tasks.retain(|t| t.id != id);
        storage::save(&self.dir, &data)?;
        Ok(())
    }

    /// Cascade delete: removes every task belonging to the project.
    pub fn delete_project(&self, name: &str) -> Result<usize, StorageError> {
        let mut data = self.data.write().unwrap();

        let before = data.tasks.len();
        data.tasks.retain(|t| t.project != name);
        let removed = before - data.tasks.len();

        storage::save(&self.dir, &data)?;
        tracing::debug!(target: "store", "Deleted project {:?}: {} tasks removed", name, removed);
        Ok(removed)
    }

    pub fn clear_completed(&self) -> Result<usize, StorageError> {
        let mut data = self.data.write().unwrap();

        let before = data.tasks.len();
        data.tasks.retain(|t| !t.completed);
        let removed = before - data.tasks.len();

        storage::save(&self.dir, &data)?;
        Ok(removed)
    }
}

fn same_day(a_ms: i64, b_ms: i64) -> bool {
    match (
        DateTime::from_timestamp_millis(a_ms),
        DateTime::from_timestamp_millis(b_ms),
    ) {
        (Some(a), Some(b)) => a.date_naive() == b.date_naive(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::Priority;

    fn open_store() -> (tempfile::TempDir, TaskStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::open(dir.path());
        (dir, store)
    }

    #[test]
    fn test_add_then_list_round_trip() {
        let (_dir, store) = open_store();

        let added = store.add_task(TaskDraft::new("Buy groceries")).unwrap();
        assert!(added.id > 0);
        assert!(added.created_at > 0);
        assert!(!added.completed);
        assert_eq!(added.completed_at, None);

        let tasks = store.list_tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0], added);
    }

    #[test]
    fn test_ids_unique_for_rapid_adds() {
        let (_dir, store) = open_store();

        let a = store.add_task(TaskDraft::new("one")).unwrap();
        let b = store.add_task(TaskDraft::new("two")).unwrap();
        let c = store.add_task(TaskDraft::new("three")).unwrap();

        assert!(a.id < b.id);
        assert!(b.id < c.id);
    }

    #[test]
    fn test_toggle_completion_invariant() {
        let (_dir, store) = open_store();
        let task = store.add_task(TaskDraft::new("Ship release")).unwrap();

        let done = store.toggle_completion(task.id).unwrap();
        assert!(done.completed);
        assert!(done.completed_at.is_some());

        let undone = store.toggle_completion(task.id).unwrap();
        assert!(!undone.completed);
        assert_eq!(undone.completed_at, None);
        assert!(undone.summary.is_empty());
    }

    #[test]
    fn test_streak_increments_on_new_day_only() {
        let (_dir, store) = open_store();
        let a = store.add_task(TaskDraft::new("first")).unwrap();
        let b = store.add_task(TaskDraft::new("second")).unwrap();

        assert_eq!(store.streak().count, 0);
        store.toggle_completion(a.id).unwrap();
        assert_eq!(store.streak().count, 1);

        // Second completion on the same day leaves the streak alone.
        store.toggle_completion(b.id).unwrap();
        assert_eq!(store.streak().count, 1);
    }

    #[test]
    fn test_delete_project_cascades() {
        let (_dir, store) = open_store();

        let mut draft = TaskDraft::new("in finance");
        draft.project = "Finance".to_string();
        store.add_task(draft.clone()).unwrap();
        draft.text = "also finance".to_string();
        store.add_task(draft).unwrap();
        store.add_task(TaskDraft::new("elsewhere")).unwrap();

        let removed = store.delete_project("Finance").unwrap();
        assert_eq!(removed, 2);

        let tasks = store.list_tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].project, "Default");
    }

    #[test]
    fn test_clear_completed() {
        let (_dir, store) = open_store();
        let a = store.add_task(TaskDraft::new("done")).unwrap();
        store.add_task(TaskDraft::new("pending")).unwrap();
        store.toggle_completion(a.id).unwrap();

        let removed = store.clear_completed().unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.list_tasks().len(), 1);
        assert!(!store.list_tasks()[0].completed);
    }

    #[test]
    fn test_not_found_errors() {
        let (_dir, store) = open_store();

        assert!(matches!(
            store.toggle_completion(42),
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_task(42),
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            store.edit_task(42, "nope"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn test_mutations_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let store = TaskStore::open(dir.path());
            let mut draft = TaskDraft::new("persisted");
            draft.priority = Priority::High;
            let task = store.add_task(draft).unwrap();
            store.toggle_completion(task.id).unwrap();
            task.id
        };

        let store = TaskStore::open(dir.path());
        let tasks = store.list_tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, id);
        assert!(tasks[0].completed);
        assert_eq!(tasks[0].priority, Priority::High);
    }
}
