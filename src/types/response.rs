// src/types/response.rs
use serde::{Deserialize, Serialize};

/// Wire body returned by the analysis service on success.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponseBody {
    pub message: Option<String>,
    pub extracted_text_preview: Option<String>,
}

/// Interpreted outcome of a 2xx analysis response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisResponse {
    /// Markdown report text.
    Success(String),
    /// 2xx body without a usable `message` field.
    MalformedResponse,
}

impl From<AnalysisResponseBody> for AnalysisResponse {
    fn from(body: AnalysisResponseBody) -> Self {
        match body.message {
            Some(message) if !message.trim().is_empty() => Self::Success(message),
            _ => Self::MalformedResponse,
        }
    }
}
