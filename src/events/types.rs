use serde::Serialize;

/// One analytics event, persisted as a JSONL line.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub ts: i64,
    pub session: String,
    pub name: String,
    pub properties: serde_json::Value,
}

/// An error captured for the in-memory recent-errors list.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedError {
    pub ts: i64,
    pub source: String,
    pub message: String,
}
