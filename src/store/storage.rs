use std::path::{Path, PathBuf};

use chrono::DateTime;
use serde::Deserialize;

use super::types::{Priority, Streak, Task, TasksData};
use crate::shared::errors::StorageError;
use crate::shared::paths::ensure_dir;

/// Current persisted schema version. Files without a `schemaVersion` field
/// are treated as legacy v1 (the original localStorage shape) and migrated.
pub const SCHEMA_VERSION: u32 = 2;

fn get_tasks_path(dir: &Path) -> PathBuf {
    dir.join("tasks.json")
}

/// Loads the task data, migrating legacy files as needed.
/// A missing or malformed file fails closed to the empty default state.
pub fn load_or_migrate(dir: &Path) -> TasksData {
    let path = get_tasks_path(dir);
    if !path.exists() {
        return TasksData {
            schema_version: SCHEMA_VERSION,
            ..Default::default()
        };
    }

    match load_from_file(&path) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(
                target: "store",
                path = %path.display(),
                "Could not load task data, starting empty: {}",
                e
            );
            TasksData {
                schema_version: SCHEMA_VERSION,
                ..Default::default()
            }
        }
    }
}

fn load_from_file(path: &Path) -> Result<TasksData, StorageError> {
    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;

    let has_version = value
        .as_object()
        .map(|obj| obj.contains_key("schemaVersion"))
        .unwrap_or(false);

    if has_version {
        let data: TasksData = serde_json::from_value(value)?;
        return Ok(data);
    }

    let legacy: LegacyData = serde_json::from_value(value)?;
    let data = migrate_legacy(legacy);
    tracing::info!(
        target: "store",
        "Migrated {} tasks from legacy storage to schema v{}",
        data.tasks.len(),
        SCHEMA_VERSION
    );
    Ok(data)
}

/// Saves the task data, always stamping the current schema version.
pub fn save(dir: &Path, data: &TasksData) -> Result<(), StorageError> {
    ensure_dir(dir).map_err(|e| StorageError::directory(e.to_string()))?;

    let data = TasksData {
        schema_version: SCHEMA_VERSION,
        tasks: data.tasks.clone(),
        streak: data.streak.clone(),
    };

    let path = get_tasks_path(dir);
    let content = serde_json::to_string_pretty(&data)?;
    std::fs::write(&path, content)?;
    Ok(())
}

// Legacy (v1) shapes: the original app persisted completion as an ISO
// `completedDate` string and carried no createdAt, tags or archived flag.

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyTask {
    id: i64,
    text: String,
    #[serde(default)]
    completed: bool,
    #[serde(default = "default_project")]
    project: String,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    completed_date: Option<String>,
}

fn default_project() -> String {
    "Default".to_string()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyStreak {
    #[serde(default)]
    count: u32,
    #[serde(default)]
    last_updated: Option<String>,
}

#[derive(Deserialize)]
struct LegacyData {
    #[serde(default)]
    tasks: Vec<LegacyTask>,
    #[serde(default)]
    streak: Option<LegacyStreak>,
}

fn iso_to_ms(iso: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(iso)
        .ok()
        .map(|dt| dt.timestamp_millis())
}

fn migrate_legacy(legacy: LegacyData) -> TasksData {
    let tasks = legacy
        .tasks
        .into_iter()
        .map(|t| {
            let completed_at = t.completed_date.as_deref().and_then(iso_to_ms);
            let completed = t.completed || completed_at.is_some();
            Task {
                // Legacy ids were Date.now() values, so the id doubles as
                // the creation timestamp.
                created_at: t.id,
                id: t.id,
                text: t.text,
                completed,
                project: t.project,
                priority: t.priority,
                summary: t.summary,
                description: t.description,
                due_date: None,
                tags: Vec::new(),
                completed_at: if completed { completed_at } else { None },
                archived: false,
            }
        })
        .collect();

    let streak = legacy
        .streak
        .map(|s| Streak {
            count: s.count,
            last_updated: s.last_updated.as_deref().and_then(iso_to_ms).unwrap_or(0),
        })
        .unwrap_or_default();

    TasksData {
        schema_version: SCHEMA_VERSION,
        tasks,
        streak,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let data = TasksData {
            schema_version: SCHEMA_VERSION,
            tasks: vec![Task {
                id: 1700000000000,
                text: "Write docs".to_string(),
                completed: false,
                project: "Default".to_string(),
                priority: Priority::Medium,
                summary: String::new(),
                description: String::new(),
                due_date: None,
                tags: vec!["docs".to_string()],
                created_at: 1700000000000,
                completed_at: None,
                archived: false,
            }],
            streak: Streak {
                count: 3,
                last_updated: 1700000000000,
            },
        };

        save(dir.path(), &data).unwrap();
        let loaded = load_or_migrate(dir.path());

        assert_eq!(loaded.schema_version, SCHEMA_VERSION);
        assert_eq!(loaded.tasks, data.tasks);
        assert_eq!(loaded.streak, data.streak);
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let data = load_or_migrate(dir.path());
        assert_eq!(data.schema_version, SCHEMA_VERSION);
        assert!(data.tasks.is_empty());
    }

    #[test]
    fn test_malformed_file_fails_closed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tasks.json"), "{not json").unwrap();

        let data = load_or_migrate(dir.path());
        assert!(data.tasks.is_empty());
        assert_eq!(data.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_legacy_migration() {
        let dir = tempfile::tempdir().unwrap();
        let legacy = serde_json::json!({
            "tasks": [
                {
                    "id": 1690000000000i64,
                    "text": "Old task",
                    "completed": true,
                    "project": "Work",
                    "priority": "high",
                    "summary": "Old task",
                    "completedDate": "2023-07-22T10:00:00.000Z"
                },
                {
                    "id": 1690000001000i64,
                    "text": "Open task"
                }
            ],
            "streak": { "count": 2, "lastUpdated": "2023-07-22T10:00:00.000Z" }
        });
        std::fs::write(
            dir.path().join("tasks.json"),
            serde_json::to_string(&legacy).unwrap(),
        )
        .unwrap();

        let data = load_or_migrate(dir.path());
        assert_eq!(data.schema_version, SCHEMA_VERSION);
        assert_eq!(data.tasks.len(), 2);

        let done = &data.tasks[0];
        assert!(done.completed);
        assert!(done.completed_at.is_some());
        assert_eq!(done.priority, Priority::High);
        assert_eq!(done.created_at, done.id);

        let open = &data.tasks[1];
        assert!(!open.completed);
        assert_eq!(open.completed_at, None);
        assert_eq!(open.project, "Default");
        assert_eq!(open.priority, Priority::Medium);

        assert_eq!(data.streak.count, 2);
        assert!(data.streak.last_updated > 0);
    }

    #[test]
    fn test_schema_version_written_on_save() {
        let dir = tempfile::tempdir().unwrap();
        let data = TasksData::default();
        save(dir.path(), &data).unwrap();

        let content = std::fs::read_to_string(dir.path().join("tasks.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["schemaVersion"], SCHEMA_VERSION);
    }
}
