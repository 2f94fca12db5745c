use std::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Share of completed tasks, floored, in `0..=100`.
    pub percent: u8,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEvent {
    pub detail: String,
}

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    Cancelled,
    FatallyAborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub status: RunStatus,
    pub total: usize,
    pub completed: usize,
    pub written: usize,
    pub failed: usize,
}

/// Notifications delivered to the presentation layer, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    Progress(ProgressEvent),
    Error(ErrorEvent),
    /// Emitted exactly once per started run, always last.
    Finished(RunSummary),
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: RunEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<RunEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<RunEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: RunEvent) {
        // A dropped receiver means nobody is watching any more; the run still finishes.
        let _ = self.tx.send(event);
    }
}
