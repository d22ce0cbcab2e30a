use serde::{Deserialize, Serialize};

use super::{AnalysisApi, ApiError, ResponseBody};
use crate::settings::AppSettings;

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct AnalysisRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

/// HTTP client for the local analysis proxy.
pub struct AnalysisClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl AnalysisClient {
    pub fn new(settings: &AppSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: settings.api_base_url.clone(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
        }
    }

    async fn post_prompt(&self, prompt: &str) -> Result<String, ApiError> {
        tracing::debug!(target: "api", url = %self.base_url, "Sending analysis request");

        let request = AnalysisRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self.http.post(&self.base_url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| {
                    if body.trim().is_empty() {
                        status.to_string()
                    } else {
                        body.trim().to_string()
                    }
                });
            tracing::warn!(target: "api", status = status.as_u16(), "Analysis request failed: {}", message);
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        ResponseBody::decode(&body).into_text()
    }
}

impl AnalysisApi for AnalysisClient {
    fn analyze(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<String, ApiError>> + Send {
        self.post_prompt(prompt)
    }
}
