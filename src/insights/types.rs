use serde::{Deserialize, Serialize};

/// Named steps of the generation pipeline, in order. Transitions only move
/// forward within one generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StageName {
    Analyzing,
    Generating,
    Processing,
    Finalizing,
}

impl StageName {
    pub fn progress(self) -> u8 {
        match self {
            StageName::Analyzing => 25,
            StageName::Generating => 50,
            StageName::Processing => 75,
            StageName::Finalizing => 90,
        }
    }

    pub fn detail(self) -> &'static str {
        match self {
            StageName::Analyzing => "Examining your task history and completion patterns",
            StageName::Generating => "Creating meaningful insights based on your work style",
            StageName::Processing => "Calculating metrics and identifying achievements",
            StageName::Finalizing => "Organizing information for optimal viewing",
        }
    }
}

/// One pipeline step with its progress percentage, for display.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub name: StageName,
    pub progress: u8,
    pub detail: String,
}

impl Stage {
    pub fn new(name: StageName) -> Self {
        Self {
            name,
            progress: name.progress(),
            detail: name.detail().to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInsight {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub progress: String,
    #[serde(default)]
    pub analysis: String,
    #[serde(default)]
    pub challenges: String,
    #[serde(default)]
    pub opportunities: String,
    #[serde(default)]
    pub suggested_tasks: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightMetrics {
    pub tasks_completed: usize,
    pub completion_rate: u32,
    pub productivity_score: u32,
}

/// The document shape the model is asked to return. Metrics and the final
/// timestamp are computed locally, not trusted from the model.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub key_achievements: Vec<Achievement>,
    #[serde(default)]
    pub project_insights: Vec<ProjectInsight>,
    #[serde(default)]
    pub focus_recommendation: String,
}

/// A published insight. Immutable once stored; superseded, not merged, by
/// the next successful generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: String,
    pub timestamp: String,
    pub overview: String,
    pub metrics: InsightMetrics,
    pub project_insights: Vec<ProjectInsight>,
    pub key_achievements: Vec<Achievement>,
    pub focus_recommendation: String,
}

/// Shared generation state observed by the presentation layer.
/// At most one of in-progress stage / error / insight is authoritative.
#[derive(Clone, Debug, Default)]
pub struct InsightState {
    pub loading: bool,
    pub stage: Option<Stage>,
    pub error: Option<String>,
    pub insight: Option<Insight>,
    pub last_updated: Option<String>,
}
