// src/core/mod.rs
//! Selection, request lifecycle and service transport

pub mod file_source;
pub mod service_client;
pub mod upload_selector;
pub mod workflow;

pub use service_client::ServiceClient;
pub use upload_selector::{SelectionEvent, UploadSelector, ValidationOutcome};
pub use workflow::{
    AnalysisState, AnalysisTransport, AnalysisWorkflow, ApplyOutcome, PendingAnalysis, Resolution,
};
