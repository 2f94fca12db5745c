#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the URL list (one URL per line).
    InputChanged(String),
    /// URL list text read from a file.
    UrlsLoaded(String),
    /// Reading the URL file failed.
    UrlsLoadFailed(String),
    OutputDirChanged(String),
    MaxConcurrentChanged(u32),
    StartClicked,
    CancelClicked,
    /// The run refused to start, e.g. the output directory could not be created.
    RunRejected(String),
    RunProgress { percent: u8, message: String },
    RunError { detail: String },
    RunFinished { outcome: RunOutcome },
    /// Fallback for placeholder wiring.
    NoOp,
}

/// How a run ended, as far as the front end cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Cancelled,
    Aborted,
}
