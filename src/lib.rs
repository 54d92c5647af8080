//! Résumé checker client: pick a résumé, send it to the analysis service,
//! and show the formatted report or the failure.

pub mod config;
pub mod core;
pub mod error;
pub mod presentation;
pub mod report;
pub mod session;
pub mod types;

pub use crate::config::ClientConfig;
pub use crate::core::{
    AnalysisState, AnalysisTransport, AnalysisWorkflow, SelectionEvent, ServiceClient,
    UploadSelector, ValidationOutcome,
};
pub use crate::error::{AnalysisError, ValidationError, WorkflowError};
pub use crate::presentation::View;
pub use crate::report::ReportDocument;
pub use crate::types::{DocumentKind, FileCandidate, FileDescriptor};
