// src/core/workflow.rs
//! Analysis request lifecycle: one selection, at most one request in flight,
//! and stale results dropped once the selection has moved on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::upload_selector::SelectionEvent;
use crate::error::{AnalysisError, WorkflowError};
use crate::types::{AnalysisResponse, FileDescriptor};

/// Sends a résumé to the analysis service.
#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    async fn analyze(&self, file: &FileDescriptor) -> Result<AnalysisResponse, AnalysisError>;
}

/// Exactly one of these is active at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisState {
    Idle,
    Ready(FileDescriptor),
    Analyzing(FileDescriptor),
    Succeeded(String),
    Failed(String),
}

impl AnalysisState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Ready(_) => "ready",
            Self::Analyzing(_) => "analyzing",
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
        }
    }
}

/// Identifies the selection a request was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub request_id: Uuid,
    generation: u64,
}

/// A request that has been admitted by the workflow but not yet sent.
///
/// Dropping it, or dropping the `Resolution` it produces without applying
/// it, releases the workflow from `Analyzing` on the next request.
#[must_use = "the workflow stays in Analyzing until this is sent and applied"]
pub struct PendingAnalysis {
    ticket: RequestTicket,
    lease: Arc<()>,
    file: FileDescriptor,
    transport: Arc<dyn AnalysisTransport>,
    issued_at: DateTime<Utc>,
}

impl PendingAnalysis {
    pub fn ticket(&self) -> RequestTicket {
        self.ticket
    }

    pub fn file(&self) -> &FileDescriptor {
        &self.file
    }

    /// Perform the request. Holds no reference to the workflow, so the
    /// selection may change while this is awaited.
    pub async fn send(self) -> Resolution {
        info!(
            request_id = %self.ticket.request_id,
            "Sending {} for analysis",
            self.file.name()
        );

        let outcome = self.transport.analyze(&self.file).await;
        let elapsed_ms = (Utc::now() - self.issued_at).num_milliseconds();

        Resolution {
            ticket: self.ticket,
            outcome,
            elapsed_ms,
            lease: self.lease,
        }
    }
}

/// Completed request, waiting to be applied.
#[derive(Debug, Clone)]
#[must_use]
pub struct Resolution {
    pub ticket: RequestTicket,
    pub outcome: Result<AnalysisResponse, AnalysisError>,
    pub elapsed_ms: i64,
    lease: Arc<()>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The selection changed after the request was issued.
    Discarded,
}

struct InFlight {
    ticket: RequestTicket,
    lease: Weak<()>,
}

impl InFlight {
    fn abandoned(&self) -> bool {
        self.lease.strong_count() == 0
    }
}

pub struct AnalysisWorkflow {
    state: AnalysisState,
    selection: Option<FileDescriptor>,
    generation: u64,
    in_flight: Option<InFlight>,
    transport: Arc<dyn AnalysisTransport>,
}

impl AnalysisWorkflow {
    pub fn new(transport: Arc<dyn AnalysisTransport>) -> Self {
        Self {
            state: AnalysisState::Idle,
            selection: None,
            generation: 0,
            in_flight: None,
            transport,
        }
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    pub fn selection(&self) -> Option<&FileDescriptor> {
        self.selection.as_ref()
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.state, AnalysisState::Analyzing(_))
    }

    /// Whether "request analysis" is currently offered to the user.
    pub fn can_request(&self) -> bool {
        self.selection.is_some() && !self.is_analyzing()
    }

    /// React to a change reported by the upload selector. Any request in
    /// flight becomes stale.
    pub fn handle_selection(&mut self, event: SelectionEvent) {
        self.generation += 1;
        if let Some(in_flight) = self.in_flight.take() {
            info!(
                request_id = %in_flight.ticket.request_id,
                "Selection changed, in-flight result will be ignored"
            );
        }

        match event {
            SelectionEvent::Selected(file) => {
                self.state = AnalysisState::Ready(file.clone());
                self.selection = Some(file);
            }
            SelectionEvent::Rejected(_) | SelectionEvent::Cleared => {
                self.state = AnalysisState::Idle;
                self.selection = None;
            }
        }
    }

    /// Apply every event queued on a selector subscription.
    pub fn sync(&mut self, events: &mut mpsc::UnboundedReceiver<SelectionEvent>) {
        while let Ok(event) = events.try_recv() {
            self.handle_selection(event);
        }
    }

    /// Admit a request for the current selection and move to `Analyzing`.
    ///
    /// Refused without side effects when nothing is selected or a request is
    /// already in flight. From `Succeeded` or `Failed` this re-analyzes the
    /// still-selected file.
    pub fn request_analysis(&mut self) -> Result<PendingAnalysis, WorkflowError> {
        let abandoned = self
            .in_flight
            .as_ref()
            .filter(|in_flight| in_flight.abandoned())
            .map(|in_flight| in_flight.ticket);
        if let Some(ticket) = abandoned {
            self.abandon(ticket);
        }

        if self.is_analyzing() {
            warn!("Analysis requested while one is already in flight");
            return Err(WorkflowError::AlreadyAnalyzing);
        }

        let file = match &self.selection {
            Some(file) => file.clone(),
            None => {
                warn!("Analysis requested with no file selected");
                return Err(WorkflowError::NoFileSelected);
            }
        };

        let ticket = RequestTicket {
            request_id: Uuid::new_v4(),
            generation: self.generation,
        };
        let lease = Arc::new(());
        self.in_flight = Some(InFlight {
            ticket,
            lease: Arc::downgrade(&lease),
        });
        self.state = AnalysisState::Analyzing(file.clone());

        Ok(PendingAnalysis {
            ticket,
            lease,
            file,
            transport: Arc::clone(&self.transport),
            issued_at: Utc::now(),
        })
    }

    /// Give up on an admitted request that will never be applied and return
    /// to `Ready` for the same selection. Returns `false` when `ticket` is not
    /// the request in flight.
    pub fn abandon(&mut self, ticket: RequestTicket) -> bool {
        if self.in_flight.as_ref().map(|in_flight| in_flight.ticket) != Some(ticket) {
            return false;
        }
        self.in_flight = None;

        warn!(request_id = %ticket.request_id, "Analysis request abandoned before it resolved");
        if let AnalysisState::Analyzing(file) = &self.state {
            self.state = AnalysisState::Ready(file.clone());
        }
        true
    }

    /// Fold a finished request into the state, unless it has gone stale.
    pub fn apply(&mut self, resolution: Resolution) -> ApplyOutcome {
        let Resolution {
            ticket,
            outcome,
            elapsed_ms,
            ..
        } = resolution;

        let current = self.in_flight.as_ref().map(|in_flight| in_flight.ticket) == Some(ticket)
            && ticket.generation == self.generation
            && self.is_analyzing();
        if !current {
            warn!(
                request_id = %ticket.request_id,
                "Discarding stale analysis result after {}ms",
                elapsed_ms
            );
            return ApplyOutcome::Discarded;
        }
        self.in_flight = None;

        self.state = match outcome {
            Ok(AnalysisResponse::Success(report)) => {
                info!(request_id = %ticket.request_id, "Analysis succeeded in {}ms", elapsed_ms);
                AnalysisState::Succeeded(report)
            }
            Ok(AnalysisResponse::MalformedResponse) => {
                let e = AnalysisError::Protocol;
                error!(request_id = %ticket.request_id, "Analysis failed: {}", e);
                AnalysisState::Failed(e.to_string())
            }
            Err(e) => {
                error!(request_id = %ticket.request_id, "Analysis failed ({:?}): {}", e.kind(), e);
                AnalysisState::Failed(e.to_string())
            }
        };

        ApplyOutcome::Applied
    }

    /// Request, await and apply in one step.
    pub async fn analyze(&mut self) -> Result<&AnalysisState, WorkflowError> {
        let pending = self.request_analysis()?;
        let resolution = pending.send().await;
        self.apply(resolution);
        Ok(&self.state)
    }
}
