use serde::{Deserialize, Serialize};

/// Task priority. Serialized lowercase to match the persisted JSON shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Weight used by the productivity-score priority bonus.
    pub fn weight(self) -> u32 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub text: String,
    pub completed: bool,
    pub project: String,
    pub priority: Priority,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: i64,
    #[serde(default)]
    pub completed_at: Option<i64>,
    #[serde(default)]
    pub archived: bool,
}

/// Fields supplied when creating a task. Id, timestamps and completion
/// state are assigned by the store.
#[derive(Clone, Debug, Default)]
pub struct TaskDraft {
    pub text: String,
    pub description: String,
    pub due_date: Option<i64>,
    pub priority: Priority,
    pub project: String,
    pub summary: String,
    pub tags: Vec<String>,
}

impl TaskDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            project: "Default".to_string(),
            ..Default::default()
        }
    }
}

/// Completion streak: count of distinct days with at least one completion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub count: u32,
    pub last_updated: i64,
}

impl Default for Streak {
    fn default() -> Self {
        Self {
            count: 0,
            last_updated: 0,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TasksData {
    pub schema_version: u32,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub streak: Streak,
}
