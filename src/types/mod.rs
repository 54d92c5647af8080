// src/types/mod.rs
pub mod file_descriptor;
pub mod response;

pub use file_descriptor::{DocumentKind, FileCandidate, FileDescriptor};
pub use response::{AnalysisResponse, AnalysisResponseBody};
