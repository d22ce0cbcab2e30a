//! AI insight generation: prompt building, the staged retry pipeline,
//! locally computed metrics, result caching and the weekly review.

pub mod cache;
pub mod generator;
pub mod metrics;
pub mod prompt;
pub mod types;
pub mod weekly;

pub use cache::InsightCache;
pub use generator::InsightGenerator;
pub use types::{Insight, InsightState, Stage, StageName};
pub use weekly::WeeklyAnalysis;

use crate::api::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to parse analysis response: {0}")]
    Parse(#[from] serde_json::Error),

    /// A newer generation started while this one was in flight.
    #[error("Superseded by a newer generation")]
    Superseded,
}
