//! Keyword extraction for voice-transcribed task input.
//!
//! A transcript like "Buy groceries due tomorrow high priority" becomes a
//! structured draft. Extraction is a pure function of the transcript and
//! the current date, matching is ASCII case insensitive, and the original
//! casing of the transcript is preserved in every extracted field.

use chrono::{Datelike, Days, NaiveDate, NaiveTime, Utc, Weekday};

use crate::store::types::{Priority, TaskDraft};

const SUMMARY_WORDS: usize = 5;

/// Parses spoken keywords out of a transcript into a task draft.
pub fn extract_task_details(text: &str) -> TaskDraft {
    extract_at(text, Utc::now().date_naive())
}

fn extract_at(text: &str, today: NaiveDate) -> TaskDraft {
    let source = text.trim();
    let lower = source.to_ascii_lowercase();
    let mut draft = TaskDraft::new(source);

    if find_word(&lower, "high priority").is_some() {
        draft.priority = Priority::High;
    } else if find_word(&lower, "low priority").is_some() {
        draft.priority = Priority::Low;
    }

    if let Some(pos) = find_word(&lower, "for project") {
        let after = source[pos + "for project".len()..].trim_start();
        if let Some(name) = after.split_whitespace().next() {
            let name = name.trim_end_matches(['.', ',', '!', '?']);
            if !name.is_empty() {
                draft.project = name.to_string();
            }
        }
    }

    // The description keyword claims the rest of the transcript; only the
    // part before it is scanned for a due phrase.
    let mut region_end = source.len();
    if let Some(pos) = find_word(&lower, "description") {
        let after = source[pos + "description".len()..].trim();
        if !after.is_empty() {
            draft.description = after.to_string();
        }
        region_end = pos;
    }

    let mut task_text = source[..region_end].trim_end().to_string();
    if let Some(pos) = find_word(&lower[..region_end], "due") {
        let phrase = strip_trailing_markers(source[pos + "due".len()..region_end].trim());
        if let Some(date) = parse_due_phrase(&phrase, today) {
            draft.due_date = Some(date.and_time(NaiveTime::MIN).and_utc().timestamp_millis());
            task_text = source[..pos].trim_end().to_string();
        }
    }

    let task_text = strip_trailing_markers(&task_text);
    if !task_text.is_empty() {
        draft.text = task_text;
    }

    draft.summary = summarize(&draft.text);
    draft
}

/// Resolves a spoken due phrase against `today`. Understands "today",
/// "tomorrow", weekday names (next occurrence) and YYYY-MM-DD dates.
fn parse_due_phrase(phrase: &str, today: NaiveDate) -> Option<NaiveDate> {
    let first = phrase.split_whitespace().next()?;
    let first = first
        .trim_end_matches(['.', ',', '!', '?'])
        .to_ascii_lowercase();

    match first.as_str() {
        "today" => Some(today),
        "tomorrow" => today.succ_opt(),
        other => {
            if let Ok(weekday) = other.parse::<Weekday>() {
                let ahead = (weekday.num_days_from_monday() + 7
                    - today.weekday().num_days_from_monday())
                    % 7;
                let ahead = if ahead == 0 { 7 } else { ahead };
                today.checked_add_days(Days::new(u64::from(ahead)))
            } else {
                NaiveDate::parse_from_str(other, "%Y-%m-%d").ok()
            }
        }
    }
}

/// Removes trailing priority and project phrases so they do not pollute
/// the task text or a due phrase.
fn strip_trailing_markers(text: &str) -> String {
    let mut out = text.trim().to_string();
    loop {
        let lower = out.to_ascii_lowercase();
        let cut = if lower.ends_with("high priority") {
            out.len() - "high priority".len()
        } else if lower.ends_with("low priority") {
            out.len() - "low priority".len()
        } else if let Some(pos) = find_word(&lower, "for project") {
            let after = lower[pos + "for project".len()..].trim();
            if after.split_whitespace().count() <= 1 {
                pos
            } else {
                break;
            }
        } else {
            break;
        };
        out.truncate(cut);
        out = out.trim_end().to_string();
    }
    out
}

/// First occurrence of `word` bounded by non-alphanumeric bytes, so "due"
/// does not match inside "dues". Works for multi-word needles too.
fn find_word(haystack: &str, word: &str) -> Option<usize> {
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(word) {
        let at = start + pos;
        let end = at + word.len();
        let before_ok = at == 0 || !haystack.as_bytes()[at - 1].is_ascii_alphanumeric();
        let after_ok =
            end == haystack.len() || !haystack.as_bytes()[end].is_ascii_alphanumeric();
        if before_ok && after_ok {
            return Some(at);
        }
        start = end;
    }
    None
}

fn summarize(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().take(SUMMARY_WORDS).collect();
    format!("{}...", words.join(" "))
}
