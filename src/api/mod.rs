pub mod client;

use std::future::Future;

use serde::Deserialize;
use thiserror::Error;

pub use client::AnalysisClient;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    #[error("Empty response from analysis API")]
    EmptyResponse,
}

/// Seam for the analysis call. The insight generator is generic over this
/// so tests can script responses without a network.
pub trait AnalysisApi {
    /// Sends one prompt and resolves to the model's text output.
    fn analyze(&self, prompt: &str) -> impl Future<Output = Result<String, ApiError>> + Send;
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

#[derive(Deserialize)]
struct ChatBody {
    content: Vec<ContentBlock>,
}

/// The two wire shapes the proxy may return: a chat-style envelope with
/// content blocks, or the model text as-is.
#[derive(Debug, PartialEq)]
pub enum ResponseBody {
    Chat(Vec<String>),
    Raw(String),
}

impl ResponseBody {
    /// Decodes a response body into one of the two known shapes. A body
    /// that does not parse as the chat envelope is raw text by definition.
    pub fn decode(body: &str) -> Self {
        match serde_json::from_str::<ChatBody>(body) {
            Ok(chat) => ResponseBody::Chat(chat.content.into_iter().map(|b| b.text).collect()),
            Err(_) => ResponseBody::Raw(body.to_string()),
        }
    }

    /// Extracts the model text: the first content block, or the raw body.
    pub fn into_text(self) -> Result<String, ApiError> {
        match self {
            ResponseBody::Chat(blocks) => blocks.into_iter().next().ok_or(ApiError::EmptyResponse),
            ResponseBody::Raw(text) => {
                if text.trim().is_empty() {
                    Err(ApiError::EmptyResponse)
                } else {
                    Ok(text)
                }
            }
        }
    }
}
