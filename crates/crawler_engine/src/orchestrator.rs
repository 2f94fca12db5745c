use std::path::PathBuf;
use std::sync::Arc;

use crawl_logging::{crawl_debug, crawl_error, crawl_info, crawl_warn};
use futures_util::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::events::{ErrorEvent, EventSink, ProgressEvent, RunEvent, RunStatus, RunSummary};
use crate::filename::derive_output_filename;
use crate::invoke::FetchInvoker;
use crate::persist::{ensure_output_dir, PersistError, ResultWriter};
use crate::render::RenderEngine;
use crate::types::{FetchOutcome, RenderOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub urls: Vec<String>,
    pub output_dir: PathBuf,
    pub max_concurrent: usize,
}

/// Errors that keep a run from starting, or from being joined.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("no URLs to crawl")]
    NoUrls,
    #[error("concurrency limit must be at least 1")]
    InvalidConcurrency,
    #[error("failed to prepare output directory: {0}")]
    OutputDir(#[from] PersistError),
    #[error("run worker failed: {0}")]
    Worker(String),
}

/// A validated request whose output directory is known to be writable.
#[derive(Debug)]
pub struct PreparedRun {
    urls: Vec<String>,
    limit: usize,
    writer: ResultWriter,
}

impl PreparedRun {
    pub fn total(&self) -> usize {
        self.urls.len()
    }
}

struct RunState {
    total: usize,
    completed: usize,
    written: usize,
    failed: usize,
}

impl RunState {
    fn new(total: usize) -> Self {
        Self {
            total,
            completed: 0,
            written: 0,
            failed: 0,
        }
    }

    fn complete_one(&mut self) -> ProgressEvent {
        debug_assert!(self.completed < self.total);
        self.completed += 1;
        ProgressEvent {
            percent: (self.completed * 100 / self.total) as u8,
            message: format!("Processed {}/{} URLs", self.completed, self.total),
        }
    }

    fn summary(&self, status: RunStatus) -> RunSummary {
        RunSummary {
            status,
            total: self.total,
            completed: self.completed,
            written: self.written,
            failed: self.failed,
        }
    }
}

/// Drives a URL list through the render engine in batches of `max_concurrent`.
///
/// Each batch runs fully concurrently and is joined before any of its events
/// are emitted. Cancellation is honoured between batches only; fetches already
/// in flight are allowed to finish.
#[derive(Clone)]
pub struct BatchOrchestrator {
    engine: Arc<dyn RenderEngine>,
    options: RenderOptions,
}

impl BatchOrchestrator {
    pub fn new(engine: Arc<dyn RenderEngine>, options: RenderOptions) -> Self {
        Self { engine, options }
    }

    /// Validate a request and make sure the output directory exists.
    pub fn prepare(&self, request: RunRequest) -> Result<PreparedRun, RunError> {
        if request.urls.is_empty() {
            return Err(RunError::NoUrls);
        }
        if request.max_concurrent == 0 {
            return Err(RunError::InvalidConcurrency);
        }
        ensure_output_dir(&request.output_dir)?;
        Ok(PreparedRun {
            urls: request.urls,
            limit: request.max_concurrent,
            writer: ResultWriter::new(request.output_dir),
        })
    }

    /// `prepare` followed by `execute`. Validation errors are returned without emitting events.
    pub async fn run(
        &self,
        request: RunRequest,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, RunError> {
        let prepared = self.prepare(request)?;
        Ok(self.execute(prepared, sink, cancel).await)
    }

    /// Process every batch, or stop at a batch boundary once `cancel` fires.
    /// Always ends with exactly one [`RunEvent::Finished`].
    pub async fn execute(
        &self,
        run: PreparedRun,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> RunSummary {
        let mut state = RunState::new(run.total());
        crawl_info!(
            "Run start: {} URLs, {} concurrent, output {:?}",
            state.total,
            run.limit,
            run.writer.dir()
        );

        if let Err(err) = self.engine.launch().await {
            crawl_error!("Render engine launch failed: {}", err);
            sink.emit(RunEvent::Error(ErrorEvent {
                detail: format!("Crawler error: {err}"),
            }));
            let summary = state.summary(RunStatus::FatallyAborted);
            sink.emit(RunEvent::Finished(summary.clone()));
            return summary;
        }

        let invoker = FetchInvoker::new(self.engine.clone(), self.options);
        let mut status = RunStatus::Completed;
        for (index, batch) in run.urls.chunks(run.limit).enumerate() {
            if cancel.is_cancelled() {
                crawl_info!("Run cancelled before batch {}", index + 1);
                status = RunStatus::Cancelled;
                break;
            }

            crawl_debug!("Batch {} start: {} URLs", index + 1, batch.len());
            let outcomes = join_all(batch.iter().map(|url| invoker.invoke(url))).await;

            for (url, outcome) in batch.iter().zip(outcomes) {
                if let Some(detail) = settle(url, outcome, &run.writer, &mut state) {
                    sink.emit(RunEvent::Error(ErrorEvent { detail }));
                }
            }
            for _ in batch {
                sink.emit(RunEvent::Progress(state.complete_one()));
            }
        }

        self.engine.shutdown().await;
        let summary = state.summary(status);
        crawl_info!(
            "Run finished: {:?}, {}/{} completed, {} written, {} failed",
            summary.status,
            summary.completed,
            summary.total,
            summary.written,
            summary.failed
        );
        sink.emit(RunEvent::Finished(summary.clone()));
        summary
    }
}

/// Persist or report one outcome. Returns the error detail to emit, if any.
fn settle(
    url: &str,
    outcome: FetchOutcome,
    writer: &ResultWriter,
    state: &mut RunState,
) -> Option<String> {
    match outcome {
        FetchOutcome::Rendered { content } => {
            let filename = derive_output_filename(url);
            match writer.write(&filename, &content) {
                Ok(path) => {
                    crawl_debug!("Saved {} to {:?}", url, path);
                    state.written += 1;
                    None
                }
                Err(err) => {
                    crawl_warn!("Saving {} failed: {}", url, err);
                    state.failed += 1;
                    Some(format!("Error saving {url}: {err}"))
                }
            }
        }
        FetchOutcome::Empty => {
            crawl_debug!("No content for {}", url);
            None
        }
        FetchOutcome::ReportedFailure { reason } => {
            crawl_warn!("Crawl of {} failed: {}", url, reason);
            state.failed += 1;
            Some(format!("Failed to crawl {url}: {reason}"))
        }
        FetchOutcome::Fault { reason } => {
            crawl_warn!("Crawl of {} faulted: {}", url, reason);
            state.failed += 1;
            Some(format!("Failed to crawl {url}: engine fault: {reason}"))
        }
    }
}
