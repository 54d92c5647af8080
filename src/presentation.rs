// src/presentation.rs
//! What the user sees for each workflow state

use std::fmt;

use crate::core::AnalysisState;
use crate::report::ReportDocument;
use crate::types::DocumentKind;

pub const PROMPT: &str = "Drag 'n' drop your resume here, or click to select";

/// Accepted types line, e.g. `"PDF, DOCX, or TXT (Max 5MB)"`.
pub fn accepted_types_hint(max_file_bytes: u64) -> String {
    let labels: Vec<&str> = DocumentKind::ALL.iter().map(DocumentKind::label).collect();
    let types = match labels.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{}, or {}", rest.join(", "), last),
        Some((last, _)) => last.to_string(),
        None => String::new(),
    };
    let mb = max_file_bytes as f64 / (1024.0 * 1024.0);
    format!("{} (Max {}MB)", types, format_mb(mb))
}

fn format_mb(mb: f64) -> String {
    if mb.fract() == 0.0 {
        format!("{}", mb as u64)
    } else {
        format!("{:.1}", mb)
    }
}

/// One screen, derived from a single `AnalysisState`. Only one of these is
/// ever shown, so a spinner and a report can never appear together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Prompt,
    SelectedFile { name: String, size: String },
    Busy { name: String },
    Report(ReportDocument),
    ErrorBanner { message: String },
}

impl View {
    pub fn for_state(state: &AnalysisState) -> Self {
        match state {
            AnalysisState::Idle => Self::Prompt,
            AnalysisState::Ready(file) => Self::SelectedFile {
                name: file.name().to_string(),
                size: file.display_size(),
            },
            AnalysisState::Analyzing(file) => Self::Busy {
                name: file.name().to_string(),
            },
            AnalysisState::Succeeded(report) => Self::Report(ReportDocument::parse(report)),
            AnalysisState::Failed(message) => Self::ErrorBanner {
                message: message.clone(),
            },
        }
    }

    /// Terminal text for this view.
    pub fn render(&self, ansi: bool) -> String {
        match self {
            Self::Prompt => format!("{}\n", PROMPT),
            Self::SelectedFile { name, size } => {
                format!("📄 {}\n   {}\n   [remove] [analyze]\n", name, size)
            }
            Self::Busy { name } => format!("⏳ Analyzing {}...\n", name),
            Self::Report(document) => document.to_terminal(ansi),
            Self::ErrorBanner { message } => {
                if ansi {
                    format!("\x1b[31m✖ {}\x1b[0m\n", message)
                } else {
                    format!("✖ {}\n", message)
                }
            }
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}
