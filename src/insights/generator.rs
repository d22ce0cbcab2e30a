use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use tokio::sync::watch;
use uuid::Uuid;

use super::cache::{CacheKey, InsightCache};
use super::types::{Insight, InsightDocument, InsightMetrics, InsightState, Stage, StageName};
use super::{metrics, prompt, weekly, GenerateError};
use crate::api::AnalysisApi;
use crate::events::Analytics;
use crate::profile::Profile;
use crate::shared::now_ms;
use crate::store::types::Task;

/// Retries after the first failed attempt; four attempts total.
const MAX_RETRIES: u32 = 3;
const INITIAL_DELAY: Duration = Duration::from_millis(1000);

fn iso_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Turns a task snapshot into a single insight document with bounded
/// retries and observable stage progress.
///
/// Each call bumps a monotonic epoch. A call that has been superseded by a
/// newer one stops publishing and bails at its next suspension point, so
/// the shared state always reflects the latest invocation only.
pub struct InsightGenerator<C> {
    client: C,
    analytics: Arc<Analytics>,
    cache: InsightCache,
    epoch: AtomicU64,
    state_tx: watch::Sender<InsightState>,
}

impl<C: AnalysisApi> InsightGenerator<C> {
    pub fn new(client: C, analytics: Arc<Analytics>) -> Self {
        Self::with_cache(client, analytics, InsightCache::new())
    }

    pub fn with_cache(client: C, analytics: Arc<Analytics>, cache: InsightCache) -> Self {
        let (state_tx, _) = watch::channel(InsightState::default());
        Self {
            client,
            analytics,
            cache,
            epoch: AtomicU64::new(0),
            state_tx,
        }
    }

    /// Watch the shared generation state.
    pub fn subscribe(&self) -> watch::Receiver<InsightState> {
        self.state_tx.subscribe()
    }

    /// Snapshot of the current generation state.
    pub fn state(&self) -> InsightState {
        self.state_tx.borrow().clone()
    }

    fn is_stale(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) != epoch
    }

    /// Applies a state update unless the epoch has moved on.
    fn publish(&self, epoch: u64, update: impl FnOnce(&mut InsightState)) -> bool {
        if self.is_stale(epoch) {
            return false;
        }
        self.state_tx.send_modify(update);
        true
    }

    fn set_stage(&self, epoch: u64, name: StageName) -> Result<(), GenerateError> {
        let published = self.publish(epoch, |state| {
            state.loading = true;
            state.stage = Some(Stage::new(name));
            state.last_updated = Some(iso_now());
        });
        if published {
            tracing::debug!(target: "insights", stage = ?name, "Stage entered");
            Ok(())
        } else {
            Err(GenerateError::Superseded)
        }
    }

    /// Runs the full generation pipeline over one task snapshot.
    ///
    /// `streak` is the store's current completion streak, used only for
    /// cache keying. A cache hit publishes the stored insight immediately
    /// with no stage transitions.
    pub async fn generate(&self, tasks: &[Task], streak: u32) -> Result<Insight, GenerateError> {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let key = CacheKey {
            task_count: tasks.len(),
            completed_count: tasks.iter().filter(|t| t.completed).count(),
            streak,
        };
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!(target: "insights", "Serving cached insight");
            let result = cached.clone();
            self.publish(epoch, |state| {
                state.loading = false;
                state.stage = None;
                state.error = None;
                state.insight = Some(cached);
                state.last_updated = Some(iso_now());
            });
            return Ok(result);
        }

        self.publish(epoch, |state| {
            state.loading = true;
            state.error = None;
        });

        let mut retries_left = MAX_RETRIES;
        let mut delay = INITIAL_DELAY;

        loop {
            match self.attempt(epoch, tasks).await {
                Ok(insight) => {
                    self.cache.insert(key, insight.clone());
                    let published = self.publish(epoch, |state| {
                        state.loading = false;
                        state.stage = None;
                        state.error = None;
                        state.insight = Some(insight.clone());
                        state.last_updated = Some(iso_now());
                    });
                    if !published {
                        return Err(GenerateError::Superseded);
                    }
                    self.analytics.track(
                        "insights_generated",
                        serde_json::json!({
                            "tasksAnalyzed": tasks.len(),
                            "productivityScore": insight.metrics.productivity_score,
                        }),
                    );
                    return Ok(insight);
                }
                Err(GenerateError::Superseded) => return Err(GenerateError::Superseded),
                Err(err) if retries_left > 0 => {
                    retries_left -= 1;
                    tracing::warn!(
                        target: "insights",
                        retries_left,
                        "Generation attempt failed, retrying in {:?}: {}",
                        delay,
                        err
                    );
                    tokio::time::sleep(delay).await;
                    delay = delay * 3 / 2;
                    if self.is_stale(epoch) {
                        return Err(GenerateError::Superseded);
                    }
                }
                Err(err) => {
                    let message = err.to_string();
                    tracing::error!(target: "insights", "Generation failed: {}", message);
                    self.publish(epoch, |state| {
                        state.loading = false;
                        state.stage = None;
                        state.error = Some(message.clone());
                        state.last_updated = Some(iso_now());
                    });
                    self.analytics.track(
                        "insights_generation_failed",
                        serde_json::json!({ "error": message }),
                    );
                    return Err(err);
                }
            }
        }
    }

    async fn attempt(&self, epoch: u64, tasks: &[Task]) -> Result<Insight, GenerateError> {
        self.set_stage(epoch, StageName::Analyzing)?;
        let stats = prompt::aggregate(tasks);
        let prompt = prompt::build_prompt(&stats);

        self.set_stage(epoch, StageName::Generating)?;
        let response = self.client.analyze(&prompt).await?;
        if self.is_stale(epoch) {
            return Err(GenerateError::Superseded);
        }

        self.set_stage(epoch, StageName::Processing)?;
        let document: InsightDocument = serde_json::from_str(response.trim())?;

        let now = now_ms();
        let computed = InsightMetrics {
            tasks_completed: tasks.iter().filter(|t| t.completed).count(),
            completion_rate: metrics::completion_rate(tasks),
            productivity_score: metrics::productivity_score(tasks, now),
        };

        self.set_stage(epoch, StageName::Finalizing)?;
        let id = if document.id.trim().is_empty() {
            Uuid::new_v4().to_string()
        } else {
            document.id
        };

        Ok(Insight {
            id,
            timestamp: iso_now(),
            overview: document.overview,
            metrics: computed,
            project_insights: document.project_insights,
            key_achievements: document.key_achievements,
            focus_recommendation: document.focus_recommendation,
        })
    }

    /// One-shot weekly analysis: aggregate the week, fold in the profile,
    /// single call, no stages and no retry.
    pub async fn generate_weekly(
        &self,
        tasks: &[Task],
        profile: &Profile,
    ) -> Result<weekly::WeeklyAnalysis, GenerateError> {
        let data = weekly::aggregate_weekly_data(tasks);
        let prompt = weekly::build_weekly_prompt(&data, profile);
        let response = self.client.analyze(&prompt).await?;
        Ok(weekly::split_sections(&response))
    }
}
