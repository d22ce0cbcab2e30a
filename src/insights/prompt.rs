use std::collections::BTreeMap;
use std::fmt::Write;

use crate::store::types::{Priority, Task};

/// Aggregate counts over one task snapshot. Project counts are kept in a
/// BTreeMap so the generated prompt is deterministic.
#[derive(Debug, Default, PartialEq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub completed_by_project: BTreeMap<String, usize>,
    pub recent_completed: Vec<String>,
}

impl TaskStats {
    pub fn completion_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}

pub fn aggregate(tasks: &[Task]) -> TaskStats {
    let mut stats = TaskStats {
        total: tasks.len(),
        ..Default::default()
    };

    for task in tasks {
        match task.priority {
            Priority::High => stats.high += 1,
            Priority::Medium => stats.medium += 1,
            Priority::Low => stats.low += 1,
        }
        if task.completed {
            stats.completed += 1;
            *stats
                .completed_by_project
                .entry(task.project.clone())
                .or_insert(0) += 1;
        }
    }

    // Five most recently completed titles, oldest first.
    let mut completed: Vec<&Task> = tasks.iter().filter(|t| t.completed_at.is_some()).collect();
    completed.sort_by_key(|t| (t.completed_at, t.id));
    stats.recent_completed = completed
        .iter()
        .rev()
        .take(5)
        .rev()
        .map(|t| t.text.clone())
        .collect();

    stats
}

/// Builds the analysis prompt. Same stats in, same prompt out.
pub fn build_prompt(stats: &TaskStats) -> String {
    let mut prompt = String::new();

    let _ = writeln!(prompt, "Task Analysis:");
    let _ = writeln!(prompt, "- Total Tasks: {}", stats.total);
    let _ = writeln!(prompt, "- Completed: {}", stats.completed);
    let _ = writeln!(
        prompt,
        "- Completion Rate: {:.1}%",
        stats.completion_percent()
    );
    let _ = writeln!(
        prompt,
        "- Priority Breakdown: high {}, medium {}, low {}",
        stats.high, stats.medium, stats.low
    );

    let _ = writeln!(prompt, "- Completions by Project:");
    if stats.completed_by_project.is_empty() {
        let _ = writeln!(prompt, "  (none)");
    } else {
        for (project, count) in &stats.completed_by_project {
            let _ = writeln!(prompt, "  - {}: {}", project, count);
        }
    }

    let _ = writeln!(prompt, "\nRecent Tasks:");
    for title in &stats.recent_completed {
        let _ = writeln!(prompt, "- {}", title);
    }

    prompt.push_str(
        r#"
Please analyze this data and provide JSON with:
{
  "id": "unique-id",
  "timestamp": "ISO date",
  "overview": "Overall productivity analysis",
  "keyAchievements": [
    { "id": "1", "title": "Achievement", "description": "Details" }
  ],
  "projectInsights": [
    {
      "id": "1",
      "projectName": "Project",
      "progress": "Status",
      "analysis": "Details",
      "challenges": "Issues",
      "opportunities": "Potential improvements",
      "suggestedTasks": ["Task 1", "Task 2"]
    }
  ],
  "focusRecommendation": "What to focus on next"
}
"#,
    );

    prompt
}
