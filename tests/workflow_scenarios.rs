//! End-to-end workflow scenarios against a scripted transport.

use async_trait::async_trait;
use resume_checker::core::{ApplyOutcome, SelectionEvent};
use resume_checker::session::{self, Session};
use resume_checker::types::file_descriptor::{PDF_MIME, TEXT_MIME};
use resume_checker::types::AnalysisResponse;
use resume_checker::{
    AnalysisError, AnalysisState, AnalysisTransport, AnalysisWorkflow, FileCandidate,
    FileDescriptor, UploadSelector, ValidationOutcome, View, WorkflowError,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const MB: usize = 1024 * 1024;

type Reply = Result<AnalysisResponse, AnalysisError>;

#[derive(Default)]
struct ScriptedTransport {
    replies: Mutex<VecDeque<(Duration, Reply)>>,
    seen: Mutex<Vec<(String, usize)>>,
}

impl ScriptedTransport {
    fn with(replies: Vec<(Duration, Reply)>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn replying(reply: Reply) -> Arc<Self> {
        Self::with(vec![(Duration::ZERO, reply)])
    }

    fn calls(&self) -> Vec<(String, usize)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisTransport for ScriptedTransport {
    async fn analyze(&self, file: &FileDescriptor) -> Result<AnalysisResponse, AnalysisError> {
        let (delay, reply) = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted reply left");
        self.seen
            .lock()
            .unwrap()
            .push((file.name().to_string(), file.content().len()));
        tokio::time::sleep(delay).await;
        reply
    }
}

fn pdf(name: &str, size: usize) -> FileCandidate {
    FileCandidate::new(name, Some(PDF_MIME), vec![b'%'; size])
}

fn success(text: &str) -> Reply {
    Ok(AnalysisResponse::Success(text.to_string()))
}

struct Harness {
    selector: UploadSelector,
    events: tokio::sync::mpsc::UnboundedReceiver<SelectionEvent>,
    workflow: AnalysisWorkflow,
}

impl Harness {
    fn new(transport: Arc<ScriptedTransport>) -> Self {
        let mut selector = UploadSelector::default();
        let events = selector.subscribe();
        Self {
            selector,
            events,
            workflow: AnalysisWorkflow::new(transport),
        }
    }

    fn drop_files(&mut self, files: Vec<FileCandidate>) -> ValidationOutcome {
        let outcome = self.selector.submit(files);
        self.workflow.sync(&mut self.events);
        outcome
    }

    fn clear(&mut self) {
        self.selector.clear();
        self.workflow.sync(&mut self.events);
    }
}

#[tokio::test]
async fn test_drop_analyze_and_render_report() {
    let transport = ScriptedTransport::replying(success("# Report\n- Strong\n- Improve formatting"));
    let mut harness = Harness::new(transport.clone());

    let outcome = harness.drop_files(vec![pdf("resume.pdf", 2 * MB)]);
    assert!(matches!(outcome, ValidationOutcome::Accepted(_)));
    assert!(matches!(harness.workflow.state(), AnalysisState::Ready(f) if f.name() == "resume.pdf"));

    let pending = harness.workflow.request_analysis().unwrap();
    assert!(matches!(harness.workflow.state(), AnalysisState::Analyzing(f) if f.name() == "resume.pdf"));
    assert!(matches!(View::for_state(harness.workflow.state()), View::Busy { .. }));

    let resolution = pending.send().await;
    assert_eq!(harness.workflow.apply(resolution), ApplyOutcome::Applied);

    match View::for_state(harness.workflow.state()) {
        View::Report(document) => {
            let headings: Vec<String> = document.headings().map(|b| b.plain_text()).collect();
            let items: Vec<String> = document.list_items().map(|b| b.plain_text()).collect();
            assert_eq!(headings, vec!["Report"]);
            assert_eq!(items, vec!["Strong", "Improve formatting"]);
        }
        other => panic!("expected report view, got {other:?}"),
    }

    assert_eq!(transport.calls(), vec![("resume.pdf".to_string(), 2 * MB)]);
}

#[tokio::test]
async fn test_analyze_without_selection_sends_nothing() {
    let transport = ScriptedTransport::replying(success("unused"));
    let mut harness = Harness::new(transport.clone());

    assert_eq!(
        harness.workflow.analyze().await.err(),
        Some(WorkflowError::NoFileSelected)
    );
    assert_eq!(harness.workflow.state(), &AnalysisState::Idle);
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_disallowed_type_clears_selection_and_resets_workflow() {
    let transport = ScriptedTransport::replying(success("unused"));
    let mut harness = Harness::new(transport);

    harness.drop_files(vec![pdf("resume.pdf", 100)]);
    assert!(harness.workflow.selection().is_some());

    let outcome = harness.drop_files(vec![FileCandidate::new("me.png", Some("image/png"), vec![0u8; 10])]);
    assert!(matches!(outcome, ValidationOutcome::Rejected(_)));
    assert!(harness.selector.selected().is_none());
    assert!(harness.workflow.selection().is_none());
    assert_eq!(harness.workflow.state(), &AnalysisState::Idle);
}

#[tokio::test]
async fn test_oversized_file_never_reaches_transport() {
    let transport = ScriptedTransport::replying(success("unused"));
    let mut harness = Harness::new(transport.clone());

    let outcome = harness.drop_files(vec![pdf("huge.pdf", 5 * MB + 1)]);
    match outcome {
        ValidationOutcome::Rejected(error) => assert_eq!(error.code(), "FILE_TOO_LARGE"),
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(
        harness.workflow.request_analysis().err(),
        Some(WorkflowError::NoFileSelected)
    );
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_server_error_then_new_file_returns_to_ready() {
    let transport = ScriptedTransport::replying(Err(AnalysisError::Server {
        status: 500,
        status_text: "Internal Server Error".to_string(),
        body: "server exploded".to_string(),
    }));
    let mut harness = Harness::new(transport);

    harness.drop_files(vec![pdf("resume.pdf", 100)]);
    let state = harness.workflow.analyze().await.unwrap().clone();
    match &state {
        AnalysisState::Failed(message) => {
            assert!(message.contains("500"));
            assert!(message.contains("server exploded"));
        }
        other => panic!("expected failure, got {other:?}"),
    }

    harness.drop_files(vec![FileCandidate::new("resume.txt", Some(TEXT_MIME), "Jane Doe")]);
    assert!(matches!(harness.workflow.state(), AnalysisState::Ready(f) if f.name() == "resume.txt"));
}

#[tokio::test]
async fn test_clear_while_analyzing_discards_late_success() {
    let transport = ScriptedTransport::with(vec![(Duration::from_millis(50), success("late report"))]);
    let mut harness = Harness::new(transport);

    harness.drop_files(vec![pdf("resume.pdf", 100)]);
    let pending = harness.workflow.request_analysis().unwrap();
    let request = tokio::spawn(pending.send());

    harness.clear();
    assert_eq!(harness.workflow.state(), &AnalysisState::Idle);

    let resolution = request.await.unwrap();
    assert!(resolution.outcome.is_ok());
    assert_eq!(harness.workflow.apply(resolution), ApplyOutcome::Discarded);
    assert_eq!(harness.workflow.state(), &AnalysisState::Idle);
}

#[tokio::test]
async fn test_dropped_request_can_be_retried() {
    let transport = ScriptedTransport::replying(success("# Report"));
    let mut harness = Harness::new(transport.clone());
    harness.drop_files(vec![pdf("resume.pdf", 100)]);

    drop(harness.workflow.request_analysis().unwrap());
    assert!(transport.calls().is_empty());

    let state = harness.workflow.analyze().await.unwrap().clone();
    assert_eq!(state, AnalysisState::Succeeded("# Report".to_string()));
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn test_session_applies_only_latest_request() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.pdf");
    let second = dir.path().join("second.txt");
    std::fs::write(&first, b"%PDF-1.7 first").unwrap();
    std::fs::write(&second, b"second resume").unwrap();

    let transport = ScriptedTransport::with(vec![
        (Duration::from_millis(300), success("# Stale")),
        (Duration::from_millis(10), success("# Fresh\n- kept")),
    ]);

    let script = format!(
        "select {}\nanalyze\nselect {}\nanalyze\n",
        first.display(),
        second.display()
    );
    let mut out = Vec::new();
    let state = Session::new(transport.clone(), 5 * MB as u64, &mut out, false)
        .run(script.as_bytes())
        .await
        .unwrap();

    assert_eq!(state, AnalysisState::Succeeded("# Fresh\n- kept".to_string()));
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("# Fresh"));
    assert!(!printed.contains("# Stale"));
    assert_eq!(
        transport.calls(),
        vec![("first.pdf".to_string(), 14), ("second.txt".to_string(), 13)]
    );
}

#[tokio::test]
async fn test_session_refuses_second_analyze_and_reports_notices() {
    let dir = tempfile::tempdir().unwrap();
    let resume = dir.path().join("resume.pdf");
    std::fs::write(&resume, b"%PDF").unwrap();

    let transport = ScriptedTransport::with(vec![(Duration::from_millis(20), success("done"))]);
    let script = format!(
        "analyze\nselect {} {}\nselect {}\nanalyze\nanalyze\nfrobnicate\n",
        resume.display(),
        resume.display(),
        resume.display()
    );
    let mut out = Vec::new();
    let state = Session::new(transport.clone(), 5 * MB as u64, &mut out, false)
        .run(script.as_bytes())
        .await
        .unwrap();

    assert_eq!(state, AnalysisState::Succeeded("done".to_string()));
    assert_eq!(transport.calls().len(), 1);

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.starts_with("PDF, DOCX, or TXT (Max 5MB)\n"));
    assert!(printed.contains("Please select a file to upload"));
    assert!(printed.contains("Please upload a single file."));
    assert!(printed.contains("An analysis is already in progress"));
    assert!(printed.contains("Unknown command 'frobnicate'"));
}

#[tokio::test]
async fn test_check_command_reports_success() {
    let dir = tempfile::tempdir().unwrap();
    let resume = dir.path().join("resume.txt");
    std::fs::write(&resume, "Jane Doe, Rust engineer").unwrap();

    let transport = ScriptedTransport::replying(success("## Strengths\n- Rust"));
    let mut out = Vec::new();
    let ok = session::check(transport, 5 * MB as u64, &[resume], &mut out, false)
        .await
        .unwrap();

    assert!(ok);
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("resume.txt"));
    assert!(printed.contains("## Strengths"));
    assert!(printed.contains("• Rust"));

    let busy = printed.find("⏳ Analyzing resume.txt...").expect("busy view not shown");
    let report = printed.find("## Strengths").unwrap();
    assert!(busy < report);
}

#[tokio::test]
async fn test_check_command_rejects_unsupported_file() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("photo.jpg");
    std::fs::write(&image, [0xFF, 0xD8, 0xFF]).unwrap();

    let transport = ScriptedTransport::replying(success("unused"));
    let mut out = Vec::new();
    let ok = session::check(transport.clone(), 5 * MB as u64, &[image], &mut out, false)
        .await
        .unwrap();

    assert!(!ok);
    assert!(transport.calls().is_empty());
    assert!(String::from_utf8(out)
        .unwrap()
        .contains("File type not accepted. Please upload PDF, DOCX, or TXT."));
}
