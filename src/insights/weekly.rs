use std::collections::BTreeMap;
use std::fmt::Write;

use crate::profile::Profile;
use crate::store::types::{Priority, Task};

const WEEK_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Roll-up of the trailing week, fed to the weekly analysis prompt.
#[derive(Debug, Default, PartialEq)]
pub struct WeeklyData {
    pub completed: usize,
    pub added: usize,
    pub high_priority_completed: usize,
    pub by_project: BTreeMap<String, usize>,
}

/// Free-text analysis split into its three requested sections.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WeeklyAnalysis {
    pub summary: String,
    pub insights: String,
    pub recommendations: String,
}

pub fn aggregate_weekly_data(tasks: &[Task]) -> WeeklyData {
    let window_start = crate::shared::now_ms() - WEEK_MS;
    let mut data = WeeklyData::default();

    for task in tasks {
        if task.created_at >= window_start {
            data.added += 1;
        }
        let completed_this_week = task
            .completed_at
            .map(|at| at >= window_start)
            .unwrap_or(false);
        if completed_this_week {
            data.completed += 1;
            if task.priority == Priority::High {
                data.high_priority_completed += 1;
            }
            *data.by_project.entry(task.project.clone()).or_insert(0) += 1;
        }
    }

    data
}

/// Builds the weekly prompt, folding in what the user told us about
/// themselves during onboarding.
pub fn build_weekly_prompt(data: &WeeklyData, profile: &Profile) -> String {
    let mut prompt = String::new();

    let _ = writeln!(prompt, "Weekly Productivity Review:");
    let _ = writeln!(prompt, "- Tasks completed this week: {}", data.completed);
    let _ = writeln!(prompt, "- Tasks added this week: {}", data.added);
    let _ = writeln!(
        prompt,
        "- High priority completions: {}",
        data.high_priority_completed
    );

    let _ = writeln!(prompt, "- Completions by project:");
    if data.by_project.is_empty() {
        let _ = writeln!(prompt, "  (none)");
    } else {
        for (project, count) in &data.by_project {
            let _ = writeln!(prompt, "  - {}: {}", project, count);
        }
    }

    let _ = writeln!(prompt, "\nUser Context:");
    if !profile.name.is_empty() {
        let _ = writeln!(prompt, "- Name: {}", profile.name);
    }
    if !profile.preferences.work_style.is_empty() {
        let _ = writeln!(prompt, "- Work style: {}", profile.preferences.work_style);
    }
    if !profile.preferences.motivation_factors.is_empty() {
        let _ = writeln!(
            prompt,
            "- Motivated by: {}",
            profile.preferences.motivation_factors.join(", ")
        );
    }
    let _ = writeln!(
        prompt,
        "- Typical weekly volume: {} tasks",
        profile.historical_data.average_tasks_per_week
    );

    prompt.push_str(
        "\nRespond in plain text with three numbered sections:\n\
         1. Summary - how the week went overall\n\
         2. Insights - patterns worth noticing\n\
         3. Recommendations - what to adjust next week\n",
    );

    prompt
}

/// Splits a numbered-section response back apart. A response that does not
/// follow the numbering lands whole in `summary`.
pub fn split_sections(response: &str) -> WeeklyAnalysis {
    let mut sections: [String; 3] = Default::default();
    let mut current: Option<usize> = None;

    for line in response.lines() {
        let trimmed = line.trim_start();
        let header = match trimmed.chars().next() {
            Some('1') => Some(0),
            Some('2') => Some(1),
            Some('3') => Some(2),
            _ => None,
        };
        // Only treat "N." as a header, not any digit-leading line.
        let header = header.filter(|_| trimmed.as_bytes().get(1) == Some(&b'.'));

        match header {
            Some(index) => current = Some(index),
            None => {
                if let Some(index) = current {
                    if !sections[index].is_empty() {
                        sections[index].push('\n');
                    }
                    sections[index].push_str(line.trim());
                }
            }
        }
    }

    if current.is_none() {
        return WeeklyAnalysis {
            summary: response.trim().to_string(),
            ..Default::default()
        };
    }

    let [summary, insights, recommendations] = sections;
    WeeklyAnalysis {
        summary: summary.trim().to_string(),
        insights: insights.trim().to_string(),
        recommendations: recommendations.trim().to_string(),
    }
}
