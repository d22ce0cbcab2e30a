//! Personal task management with AI-generated productivity insights.
//!
//! The crate is organized around a JSON-file-backed [`store::TaskStore`],
//! an [`insights::InsightGenerator`] that turns task snapshots into
//! AI-written insight documents, and keyword extraction for voice input
//! in [`voice`].

pub mod api;
pub mod events;
pub mod insights;
pub mod logging;
pub mod profile;
pub mod settings;
pub mod shared;
pub mod store;
pub mod voice;

pub use api::{AnalysisApi, AnalysisClient, ApiError};
pub use events::{Analytics, ErrorMonitor};
pub use insights::{GenerateError, Insight, InsightGenerator, InsightState};
pub use settings::AppSettings;
pub use store::types::{Priority, Task, TaskDraft};
pub use store::TaskStore;
pub use voice::extract_task_details;
