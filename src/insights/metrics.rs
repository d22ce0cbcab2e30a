use crate::store::types::Task;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;
const MS_PER_DAY_F: f64 = DAY_MS as f64;

/// Percentage of tasks completed, rounded. Defined as 0 for an empty list.
pub fn completion_rate(tasks: &[Task]) -> u32 {
    if tasks.is_empty() {
        return 0;
    }
    let completed = tasks.iter().filter(|t| t.completed).count();
    (completed as f64 / tasks.len() as f64 * 100.0).round() as u32
}

/// Composite 0-100 productivity score:
/// `min(100, round(0.5 * rate24h + 0.3 * consistency + 0.2 * priority))`.
pub fn productivity_score(tasks: &[Task], now_ms: i64) -> u32 {
    let rate = completion_rate_last_24h(tasks, now_ms);
    let consistency = consistency_bonus(tasks);
    let priority = priority_bonus(tasks, now_ms);

    let score = 0.5 * rate + 0.3 * consistency + 0.2 * priority;
    (score.round() as u32).min(100)
}

/// Percentage of all tasks completed within the trailing 24 hours.
fn completion_rate_last_24h(tasks: &[Task], now_ms: i64) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    let window_start = now_ms - DAY_MS;
    let recent = tasks
        .iter()
        .filter(|t| t.completed_at.map(|at| at >= window_start).unwrap_or(false))
        .count();
    recent as f64 / tasks.len() as f64 * 100.0
}

/// `max(0, 100 - stddev(inter-completion gaps in days))` over completion
/// timestamps sorted ascending. Needs at least two completions.
fn consistency_bonus(tasks: &[Task]) -> f64 {
    let mut completions: Vec<i64> = tasks.iter().filter_map(|t| t.completed_at).collect();
    if completions.len() < 2 {
        return 0.0;
    }
    completions.sort_unstable();

    let gaps: Vec<f64> = completions
        .windows(2)
        .map(|w| (w[1] - w[0]) as f64 / MS_PER_DAY_F)
        .collect();

    let mean = gaps.iter().sum::<f64>() / gaps.len() as f64;
    let variance = gaps.iter().map(|g| (g - mean).powi(2)).sum::<f64>() / gaps.len() as f64;
    (100.0 - variance.sqrt()).max(0.0)
}

/// Mean priority weight of tasks completed in the trailing 24 hours,
/// scaled so an all-high day reads 100.
fn priority_bonus(tasks: &[Task], now_ms: i64) -> f64 {
    let window_start = now_ms - DAY_MS;
    let recent: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.completed_at.map(|at| at >= window_start).unwrap_or(false))
        .collect();

    if recent.is_empty() {
        return 0.0;
    }

    let total_weight: u32 = recent.iter().map(|t| t.priority.weight()).sum();
    total_weight as f64 / recent.len() as f64 / 3.0 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::Priority;

    fn task(id: i64, priority: Priority, completed_at: Option<i64>) -> Task {
        Task {
            id,
            text: format!("task {}", id),
            completed: completed_at.is_some(),
            project: "Default".to_string(),
            priority,
            summary: String::new(),
            description: String::new(),
            due_date: None,
            tags: Vec::new(),
            created_at: id,
            completed_at,
            archived: false,
        }
    }

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn test_completion_rate_bounds() {
        assert_eq!(completion_rate(&[]), 0);

        let all_done = vec![task(1, Priority::Medium, Some(NOW))];
        assert_eq!(completion_rate(&all_done), 100);

        let third = vec![
            task(1, Priority::Medium, Some(NOW)),
            task(2, Priority::Medium, None),
            task(3, Priority::Medium, None),
        ];
        assert_eq!(completion_rate(&third), 33);
    }

    #[test]
    fn test_score_zero_for_empty() {
        assert_eq!(productivity_score(&[], NOW), 0);
    }

    #[test]
    fn test_score_never_exceeds_100() {
        // Everything completed moments ago at high priority, evenly spaced.
        let tasks: Vec<Task> = (0..4)
            .map(|i| task(i, Priority::High, Some(NOW - i * 1000)))
            .collect();
        let score = productivity_score(&tasks, NOW);
        assert!(score <= 100);
        assert!(score > 0);
    }

    #[test]
    fn test_consistency_needs_two_completions() {
        let one = vec![task(1, Priority::Medium, Some(NOW))];
        assert_eq!(consistency_bonus(&one), 0.0);

        // Two completions give a single gap, whose deviation is zero.
        let two = vec![
            task(1, Priority::Medium, Some(NOW - DAY_MS)),
            task(2, Priority::Medium, Some(NOW)),
        ];
        assert_eq!(consistency_bonus(&two), 100.0);
    }

    #[test]
    fn test_old_completions_do_not_count_toward_24h_rate() {
        let tasks = vec![
            task(1, Priority::High, Some(NOW - 2 * DAY_MS)),
            task(2, Priority::High, None),
        ];
        assert_eq!(completion_rate_last_24h(&tasks, NOW), 0.0);
        assert_eq!(priority_bonus(&tasks, NOW), 0.0);
    }

    #[test]
    fn test_priority_bonus_scales_with_weight() {
        let high = vec![task(1, Priority::High, Some(NOW))];
        assert!((priority_bonus(&high, NOW) - 100.0).abs() < f64::EPSILON);

        let low = vec![task(1, Priority::Low, Some(NOW))];
        assert!((priority_bonus(&low, NOW) - 100.0 / 3.0).abs() < 1e-9);
    }
}
