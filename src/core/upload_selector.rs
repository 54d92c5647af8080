// src/core/upload_selector.rs
//! File acquisition: validates dropped or picked files and tracks the selection

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::DEFAULT_MAX_FILE_BYTES;
use crate::error::ValidationError;
use crate::types::{DocumentKind, FileCandidate, FileDescriptor};

/// Result of a single submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted(FileDescriptor),
    Rejected(ValidationError),
}

/// Notification sent to the selector's listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    Selected(FileDescriptor),
    Rejected(ValidationError),
    Cleared,
}

type Listener = Box<dyn FnMut(&SelectionEvent) + Send>;

pub struct UploadSelector {
    max_file_bytes: u64,
    selected: Option<FileDescriptor>,
    error: Option<ValidationError>,
    listener: Option<Listener>,
}

impl Default for UploadSelector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_BYTES)
    }
}

impl UploadSelector {
    pub fn new(max_file_bytes: u64) -> Self {
        Self {
            max_file_bytes,
            selected: None,
            error: None,
            listener: None,
        }
    }

    /// Register the callback that receives every selection change.
    pub fn set_listener(&mut self, listener: impl FnMut(&SelectionEvent) + Send + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Route selection changes into a channel, replacing any previous listener.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SelectionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.set_listener(move |event| {
            // receiver gone means nobody is watching anymore
            let _ = tx.send(event.clone());
        });
        rx
    }

    pub fn selected(&self) -> Option<&FileDescriptor> {
        self.selected.as_ref()
    }

    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes
    }

    /// Validate one drop or picker result.
    ///
    /// Any previous selection and error are discarded first, so a rejection
    /// never leaves a stale file selected behind it.
    pub fn submit(&mut self, mut candidates: Vec<FileCandidate>) -> ValidationOutcome {
        self.selected = None;
        self.error = None;

        let outcome = match candidates.len() {
            0 => ValidationOutcome::Rejected(ValidationError::NoFile),
            1 => match validate(candidates.remove(0), self.max_file_bytes) {
                Ok(file) => ValidationOutcome::Accepted(file),
                Err(e) => ValidationOutcome::Rejected(e),
            },
            count => ValidationOutcome::Rejected(ValidationError::TooManyFiles { count }),
        };

        let event = match &outcome {
            ValidationOutcome::Accepted(file) => {
                info!(
                    "Selected {} ({}, {} bytes)",
                    file.name(),
                    file.kind(),
                    file.size_bytes()
                );
                self.selected = Some(file.clone());
                SelectionEvent::Selected(file.clone())
            }
            ValidationOutcome::Rejected(error) => {
                warn!("Rejected file submission [{}]: {}", error.code(), error);
                self.error = Some(error.clone());
                SelectionEvent::Rejected(error.clone())
            }
        };

        self.notify(&event);
        outcome
    }

    /// Drop the current selection and any pending error.
    pub fn clear(&mut self) {
        self.selected = None;
        self.error = None;
        info!("Selection cleared");
        self.notify(&SelectionEvent::Cleared);
    }

    fn notify(&mut self, event: &SelectionEvent) {
        if let Some(listener) = self.listener.as_mut() {
            listener(event);
        }
    }
}

/// Check a single candidate against the type allow-list and size ceiling.
pub fn validate(candidate: FileCandidate, max_file_bytes: u64) -> Result<FileDescriptor, ValidationError> {
    let kind = candidate
        .mime_type
        .as_deref()
        .and_then(DocumentKind::from_mime)
        .ok_or_else(|| ValidationError::UnsupportedType {
            mime_type: candidate.mime_type.clone(),
        })?;

    if candidate.size_bytes > max_file_bytes {
        return Err(ValidationError::TooLarge {
            size_bytes: candidate.size_bytes,
            limit_bytes: max_file_bytes,
        });
    }

    Ok(FileDescriptor::new(
        candidate.name,
        candidate.size_bytes,
        kind,
        candidate.content,
    ))
}
