use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crawl_logging::crawl_error;
use tokio_util::sync::CancellationToken;

use crate::events::{ChannelEventSink, ErrorEvent, EventSink, RunEvent, RunStatus, RunSummary};
use crate::orchestrator::{BatchOrchestrator, RunError, RunRequest};

/// A run executing on its own thread and tokio runtime.
///
/// Events arrive through [`RunHandle::try_recv`] and friends; the only thing
/// the owner can push back into the run is [`RunHandle::stop`].
pub struct RunHandle {
    cancel: CancellationToken,
    event_rx: mpsc::Receiver<RunEvent>,
    thread: JoinHandle<RunSummary>,
}

impl RunHandle {
    /// Validate `request` on the calling thread, then start the run in the background.
    pub fn spawn(orchestrator: BatchOrchestrator, request: RunRequest) -> Result<Self, RunError> {
        let prepared = orchestrator.prepare(request)?;
        let total = prepared.total();
        let cancel = CancellationToken::new();
        let (event_tx, event_rx) = mpsc::channel();

        let token = cancel.clone();
        let thread = thread::Builder::new()
            .name("crawl-run".to_string())
            .spawn(move || {
                let sink = ChannelEventSink::new(event_tx);
                let runtime = match tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(err) => {
                        crawl_error!("Failed to start run runtime: {}", err);
                        return abort_run(&sink, total, format!("Crawler error: {err}"));
                    }
                };
                runtime.block_on(orchestrator.execute(prepared, &sink, &token))
            })
            .map_err(|err| {
                crawl_error!("Failed to spawn run thread: {}", err);
                RunError::Worker(err.to_string())
            })?;

        Ok(Self {
            cancel,
            event_rx,
            thread,
        })
    }

    /// Ask the run to stop before its next batch.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn try_recv(&self) -> Option<RunEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<RunEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the run thread. Undelivered events are dropped.
    pub fn join(self) -> Result<RunSummary, RunError> {
        self.thread
            .join()
            .map_err(|_| RunError::Worker("run thread panicked".to_string()))
    }
}

fn abort_run(sink: &dyn EventSink, total: usize, detail: String) -> RunSummary {
    sink.emit(RunEvent::Error(ErrorEvent { detail }));
    let summary = RunSummary {
        status: RunStatus::FatallyAborted,
        total,
        completed: 0,
        written: 0,
        failed: 0,
    };
    sink.emit(RunEvent::Finished(summary.clone()));
    summary
}
