// src/core/service_client.rs
//! HTTP client for the résumé analysis service - multipart upload, JSON reply

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, trace};

use super::workflow::AnalysisTransport;
use crate::config::ClientConfig;
use crate::error::AnalysisError;
use crate::types::{AnalysisResponse, AnalysisResponseBody, FileDescriptor};

/// Multipart field the service reads the résumé from.
pub const RESUME_FIELD: &str = "resumeFile";

pub struct ServiceClient {
    client: reqwest::Client,
    url: String,
    timeout_seconds: Option<u64>,
}

impl ServiceClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: config.analysis_url(),
            timeout_seconds: config.timeout_seconds,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn transport_error(&self, e: reqwest::Error) -> AnalysisError {
        match self.timeout_seconds {
            Some(secs) if e.is_timeout() => AnalysisError::Timeout(secs),
            _ => AnalysisError::Transport(e.to_string()),
        }
    }
}

#[async_trait]
impl AnalysisTransport for ServiceClient {
    async fn analyze(&self, file: &FileDescriptor) -> Result<AnalysisResponse, AnalysisError> {
        let part = Part::bytes(file.content().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.mime_type())
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;
        let form = Form::new().part(RESUME_FIELD, part);

        info!("Calling analysis service: {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        trace!("Response status: {}", status);

        if status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| self.transport_error(e))?;
            interpret_response(status, &body)
        } else {
            let body = response.text().await.unwrap_or_default();
            error!("Analysis service error response {}: {}", status, body);
            interpret_response(status, &body)
        }
    }
}

/// Map a status code and raw body to the workflow's view of the reply.
pub fn interpret_response(status: StatusCode, body: &str) -> Result<AnalysisResponse, AnalysisError> {
    if !status.is_success() {
        return Err(AnalysisError::Server {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body: body.trim().to_string(),
        });
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|e| AnalysisError::Transport(format!("Failed to parse response body: {}", e)))?;

    // Fields are read one at a time so a bad preview never hides the report.
    let text_field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);
    let parsed = AnalysisResponseBody {
        message: text_field("message"),
        extracted_text_preview: text_field("extractedTextPreview"),
    };
    if let Some(preview) = parsed.extracted_text_preview.as_deref() {
        debug!("Extracted text preview: {}", preview);
    }

    Ok(AnalysisResponse::from(parsed))
}
