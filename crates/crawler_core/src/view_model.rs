use crate::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub severity: Severity,
    pub text: String,
}

impl LogLine {
    /// Line as shown in the status log; errors carry an `ERROR: ` prefix.
    pub fn display(&self) -> String {
        match self.severity {
            Severity::Info => self.text.clone(),
            Severity::Error => format!("ERROR: {}", self.text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub url_count: usize,
    pub output_dir: String,
    pub max_concurrent: u8,
    pub progress_percent: u8,
    pub status_label: String,
    pub validation_error: Option<String>,
    pub log: Vec<LogLine>,
    pub inputs_enabled: bool,
    pub cancel_enabled: bool,
    pub dirty: bool,
}
