use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::types::Insight;

/// Default time a generation result stays valid.
const CACHE_DURATION: Duration = Duration::from_secs(5 * 60);

/// Cache key: a generation is reusable while the task snapshot it described
/// is shape-identical (same counts and streak).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub task_count: usize,
    pub completed_count: usize,
    pub streak: u32,
}

pub struct InsightCache {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, (Insight, Instant)>>,
}

impl InsightCache {
    pub fn new() -> Self {
        Self::with_ttl(CACHE_DURATION)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns a fresh entry for the key, dropping it if expired.
    pub fn get(&self, key: &CacheKey) -> Option<Insight> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((_, stored_at)) if stored_at.elapsed() > self.ttl => {
                entries.remove(key);
                None
            }
            Some((insight, _)) => Some(insight.clone()),
            None => None,
        }
    }

    pub fn insert(&self, key: CacheKey, insight: Insight) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key, (insight, Instant::now()));
    }
}

impl Default for InsightCache {
    fn default() -> Self {
        Self::new()
    }
}
