//! # Print Sinks
//!
//! Where a rendered print page goes once the bill is recorded.
//!
//! ## Print Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CounterSession::print()                                                │
//! │       │  PrintJob { record, title, html }                               │
//! │       ▼                                                                 │
//! │  ┌──────────────────────┐                                               │
//! │  │ HtmlFileSink         │ ──► {dir}/20261019-090500-takeaway-23-1a2b.html│
//! │  │                      │ ──► spawn `lp -o landscape <file>` (optional) │
//! │  └──────────────────────┘      reaped by a detached task; delivery     │
//! │                                never waits on the spooler               │
//! │  ┌──────────────────────┐                                               │
//! │  │ DiscardSink          │ ──► nothing (--no-print, tests)               │
//! │  └──────────────────────┘                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use queuebill_core::BillRecord;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::CounterResult;

/// A page ready for the printer.
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub record: BillRecord,
    pub title: String,
    pub html: String,
}

impl PrintJob {
    /// File name for this job, unique per bill.
    pub fn file_name(&self) -> String {
        let short_id: String = self.record.id.chars().filter(|c| *c != '-').take(8).collect();
        format!(
            "{}-{}-{}-{}.html",
            self.record.issued_at.format("%Y%m%d-%H%M%S"),
            self.record.mode.as_str().to_lowercase(),
            self.record.number,
            short_id
        )
    }
}

/// Hands print pages to a printer.
#[async_trait]
pub trait PrintSink: Send + Sync {
    /// Delivers `job`. Returns where the page went, if anywhere.
    async fn deliver(&self, job: &PrintJob) -> CounterResult<Option<PathBuf>>;
}

// =============================================================================
// HTML File Sink
// =============================================================================

/// Writes each page to a directory and optionally launches a print command.
#[derive(Debug, Clone)]
pub struct HtmlFileSink {
    dir: PathBuf,
    command: Option<Vec<String>>,
}

impl HtmlFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        HtmlFileSink {
            dir: dir.into(),
            command: None,
        }
    }

    /// Program and arguments to run with the page path appended.
    pub fn with_command(mut self, command: &str) -> Self {
        let parts: Vec<String> = command.split_whitespace().map(str::to_string).collect();
        self.command = (!parts.is_empty()).then_some(parts);
        self
    }

    /// Starts the print command on `path` and reaps it in the background.
    /// Returns the reaper task, or `None` when there is nothing to run.
    fn launch(&self, path: &Path) -> Option<JoinHandle<()>> {
        let (program, args) = self.command.as_ref().and_then(|c| c.split_first())?;

        let mut child = match tokio::process::Command::new(program)
            .args(args)
            .arg(path)
            .kill_on_drop(false)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                warn!(program = %program, error = %e, "Failed to launch print command");
                return None;
            }
        };
        debug!(program = %program, pid = ?child.id(), "Print command launched");

        let program = program.clone();
        Some(tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => {
                    debug!(program = %program, "Print command finished");
                }
                Ok(status) => {
                    warn!(program = %program, %status, "Print command failed");
                }
                Err(e) => {
                    warn!(program = %program, error = %e, "Lost track of print command");
                }
            }
        }))
    }
}

#[async_trait]
impl PrintSink for HtmlFileSink {
    async fn deliver(&self, job: &PrintJob) -> CounterResult<Option<PathBuf>> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.dir.join(job.file_name());
        tokio::fs::write(&path, job.html.as_bytes()).await?;
        info!(path = %path.display(), "Print page written");

        self.launch(&path);
        Ok(Some(path))
    }
}

// =============================================================================
// Discard Sink
// =============================================================================

/// Drops every page.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

#[async_trait]
impl PrintSink for DiscardSink {
    async fn deliver(&self, job: &PrintJob) -> CounterResult<Option<PathBuf>> {
        debug!(title = %job.title, "Print page discarded");
        Ok(None)
    }
}
