// src/error.rs
//! Error taxonomy for selection, transport and workflow misuse

use thiserror::Error;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Fallback shown when a failed response carries no body.
pub const EMPTY_BODY_FALLBACK: &str = "No error details provided";

/// Fallback shown when a transport failure has no message of its own.
pub const TRANSPORT_FALLBACK: &str = "Unable to reach the analysis service";

/// Size in megabytes, two decimals, trailing zeros dropped ("5", "2.5", "7.34").
fn megabytes(bytes: &u64) -> String {
    let formatted = format!("{:.2}", *bytes as f64 / BYTES_PER_MB);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

fn transport_message(message: &str) -> &str {
    if message.trim().is_empty() {
        TRANSPORT_FALLBACK
    } else {
        message
    }
}

fn status_line(status: &u16, status_text: &str) -> String {
    match status_text.trim() {
        "" => status.to_string(),
        reason => format!("{} {}", status, reason),
    }
}

fn server_detail(body: &str) -> &str {
    let body = body.trim();
    if body.is_empty() {
        EMPTY_BODY_FALLBACK
    } else {
        body
    }
}

/// Why a candidate file was refused by the upload selector.
///
/// Raised synchronously and never reaches the network layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No file was provided.")]
    NoFile,

    #[error("Please upload a single file.")]
    TooManyFiles { count: usize },

    #[error("File type not accepted. Please upload PDF, DOCX, or TXT.")]
    UnsupportedType { mime_type: Option<String> },

    #[error(
        "File is too large ({} MB). Maximum size is {} MB.",
        megabytes(.size_bytes),
        megabytes(.limit_bytes)
    )]
    TooLarge { size_bytes: u64, limit_bytes: u64 },
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoFile => "NO_FILE",
            Self::TooManyFiles { .. } => "TOO_MANY_FILES",
            Self::UnsupportedType { .. } => "INVALID_FORMAT",
            Self::TooLarge { .. } => "FILE_TOO_LARGE",
        }
    }

    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::NoFile => "Drop a résumé file or pick one with the file selector",
            Self::TooManyFiles { .. } => "Select only one résumé at a time",
            Self::UnsupportedType { .. } => "Export your résumé as .pdf, .docx or .txt",
            Self::TooLarge { .. } => "Compress the document or remove embedded images",
        }
    }
}

/// Broad class of an analysis failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Server,
    Protocol,
}

/// Failure of a single analysis request. Every variant ends in the `Failed` state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("{}", transport_message(.0))]
    Transport(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Server responded with {}: {}", status_line(.status, .status_text), server_detail(.body))]
    Server {
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("unexpected response format")]
    Protocol,
}

impl AnalysisError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport(_) | Self::Timeout(_) => FailureKind::Transport,
            Self::Server { .. } => FailureKind::Server,
            Self::Protocol => FailureKind::Protocol,
        }
    }
}

/// Caller errors on the analysis workflow. These never change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("Please select a file to upload")]
    NoFileSelected,

    #[error("An analysis is already in progress")]
    AlreadyAnalyzing,
}
