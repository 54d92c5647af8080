// src/session.rs
//! Terminal front end: one-shot check and the interactive command loop

use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::core::file_source::load_candidates;
use crate::core::{
    AnalysisState, AnalysisTransport, AnalysisWorkflow, ApplyOutcome, Resolution, SelectionEvent,
    UploadSelector, ValidationOutcome,
};
use crate::error::ValidationError;
use crate::presentation::{accepted_types_hint, View};

const HELP: &str = "\
Commands:
  select <path>...  choose the résumé to analyze
  clear             remove the current selection
  analyze           send the selected résumé for analysis
  status            show the current screen
  help              show this message
  quit              leave the session
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Select(Vec<PathBuf>),
    Clear,
    Analyze,
    Status,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };

        let command = match verb.to_lowercase().as_str() {
            "select" | "drop" | "open" => Self::Select(words.map(PathBuf::from).collect()),
            "clear" | "remove" => Self::Clear,
            "analyze" | "analyse" => Self::Analyze,
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("Unknown command '{}'. Type 'help' for a list.", other)),
        };
        Ok(Some(command))
    }
}

fn rejection_notice(error: &ValidationError) -> String {
    format!("⚠ {}\n  {}\n", error, error.suggestion())
}

pub struct Session<W: Write> {
    selector: UploadSelector,
    events: mpsc::UnboundedReceiver<SelectionEvent>,
    workflow: AnalysisWorkflow,
    out: W,
    ansi: bool,
}

impl<W: Write> Session<W> {
    pub fn new(transport: Arc<dyn AnalysisTransport>, max_file_bytes: u64, out: W, ansi: bool) -> Self {
        let mut selector = UploadSelector::new(max_file_bytes);
        let events = selector.subscribe();
        Self {
            selector,
            events,
            workflow: AnalysisWorkflow::new(transport),
            out,
            ansi,
        }
    }

    pub fn state(&self) -> &AnalysisState {
        self.workflow.state()
    }

    /// Read commands until `quit` or end of input. A request still in
    /// flight at end of input is awaited so its outcome is shown.
    pub async fn run<R>(mut self, input: R) -> Result<AnalysisState>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Resolution>();
        let mut input_open = true;

        writeln!(self.out, "{}", accepted_types_hint(self.selector.max_file_bytes()))?;
        self.show()?;

        loop {
            if !input_open && !self.workflow.is_analyzing() {
                break;
            }

            tokio::select! {
                line = lines.next_line(), if input_open => {
                    match line.context("Failed to read command")? {
                        Some(line) => {
                            if !self.handle_line(&line, &done_tx).await? {
                                break;
                            }
                        }
                        None => input_open = false,
                    }
                }
                Some(resolution) = done_rx.recv() => {
                    if self.workflow.apply(resolution) == ApplyOutcome::Applied {
                        self.show()?;
                    }
                }
                else => break,
            }
        }

        info!("Session ended in state {}", self.workflow.state().name());
        Ok(self.workflow.state().clone())
    }

    /// Returns `false` when the session should end.
    async fn handle_line(
        &mut self,
        line: &str,
        done_tx: &mpsc::UnboundedSender<Resolution>,
    ) -> Result<bool> {
        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(true),
            Err(message) => {
                writeln!(self.out, "{}", message)?;
                return Ok(true);
            }
        };
        debug!("Command: {:?}", command);

        match command {
            Command::Select(paths) => {
                match load_candidates(&paths).await {
                    Ok(candidates) => {
                        if let ValidationOutcome::Rejected(error) = self.selector.submit(candidates) {
                            write!(self.out, "{}", rejection_notice(&error))?;
                        }
                    }
                    Err(e) => writeln!(self.out, "⚠ {:#}", e)?,
                }
                self.workflow.sync(&mut self.events);
                self.show()?;
            }
            Command::Clear => {
                self.selector.clear();
                self.workflow.sync(&mut self.events);
                self.show()?;
            }
            Command::Analyze => match self.workflow.request_analysis() {
                Ok(pending) => {
                    let done_tx = done_tx.clone();
                    tokio::spawn(async move {
                        // the session may already be gone
                        let _ = done_tx.send(pending.send().await);
                    });
                    self.show()?;
                }
                Err(e) => writeln!(self.out, "⚠ {}", e)?,
            },
            Command::Status => self.show()?,
            Command::Help => write!(self.out, "{}", HELP)?,
            Command::Quit => return Ok(false),
        }

        Ok(true)
    }

    fn show(&mut self) -> Result<()> {
        let view = View::for_state(self.workflow.state());
        write!(self.out, "{}", view.render(self.ansi))?;
        self.out.flush()?;
        Ok(())
    }
}

/// Select `paths` as one drop, analyze once and print the outcome.
/// Returns whether a report was produced.
pub async fn check<W: Write>(
    transport: Arc<dyn AnalysisTransport>,
    max_file_bytes: u64,
    paths: &[PathBuf],
    out: &mut W,
    ansi: bool,
) -> Result<bool> {
    let mut selector = UploadSelector::new(max_file_bytes);
    let mut events = selector.subscribe();
    let mut workflow = AnalysisWorkflow::new(transport);

    let candidates = load_candidates(paths).await?;
    let outcome = selector.submit(candidates);
    workflow.sync(&mut events);

    if let ValidationOutcome::Rejected(error) = outcome {
        write!(out, "{}", rejection_notice(&error))?;
        return Ok(false);
    }

    write!(out, "{}", View::for_state(workflow.state()).render(ansi))?;
    let pending = workflow.request_analysis()?;
    write!(out, "{}", View::for_state(workflow.state()).render(ansi))?;
    out.flush()?;

    let resolution = pending.send().await;
    workflow.apply(resolution);
    let state = workflow.state();
    write!(out, "{}", View::for_state(state).render(ansi))?;

    Ok(matches!(state, AnalysisState::Succeeded(_)))
}
