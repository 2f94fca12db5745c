use std::ops::RangeInclusive;

use crate::view_model::{AppViewModel, LogLine, Severity};

pub const DEFAULT_MAX_CONCURRENT: u8 = 3;
pub const MAX_CONCURRENT_RANGE: RangeInclusive<u8> = 1..=10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    /// Stop requested; the current batch is still finishing.
    Cancelling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    url_input: String,
    output_dir: String,
    max_concurrent: u8,
    session: SessionState,
    progress_percent: u8,
    status_label: String,
    validation_error: Option<String>,
    log: Vec<LogLine>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            url_input: String::new(),
            output_dir: String::new(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            session: SessionState::Idle,
            progress_percent: 0,
            status_label: "Ready".to_string(),
            validation_error: None,
            log: Vec::new(),
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn url_input(&self) -> &str {
        &self.url_input
    }

    pub fn output_dir(&self) -> &str {
        &self.output_dir
    }

    pub fn max_concurrent(&self) -> u8 {
        self.max_concurrent
    }

    pub fn view(&self) -> AppViewModel {
        let idle = self.session == SessionState::Idle;
        AppViewModel {
            session: self.session,
            url_count: crate::parse_urls(&self.url_input).len(),
            output_dir: self.output_dir.clone(),
            max_concurrent: self.max_concurrent,
            progress_percent: self.progress_percent,
            status_label: self.status_label.clone(),
            validation_error: self.validation_error.clone(),
            log: self.log.clone(),
            inputs_enabled: idle,
            cancel_enabled: self.session == SessionState::Running,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn set_url_input(&mut self, text: String) {
        self.url_input = text;
        self.validation_error = None;
        self.dirty = true;
    }

    pub(crate) fn set_output_dir(&mut self, dir: String) {
        self.output_dir = dir;
        self.validation_error = None;
        self.dirty = true;
    }

    pub(crate) fn set_max_concurrent(&mut self, requested: u32) {
        let (min, max) = (*MAX_CONCURRENT_RANGE.start(), *MAX_CONCURRENT_RANGE.end());
        self.max_concurrent = requested.clamp(u32::from(min), u32::from(max)) as u8;
        self.dirty = true;
    }

    pub(crate) fn reject_start(&mut self, message: String) {
        self.validation_error = Some(message);
        self.dirty = true;
    }

    pub(crate) fn begin_run(&mut self) {
        self.session = SessionState::Running;
        self.progress_percent = 0;
        self.status_label = "Starting".to_string();
        self.validation_error = None;
        self.log.clear();
        self.dirty = true;
    }

    pub(crate) fn begin_cancel(&mut self) {
        self.session = SessionState::Cancelling;
        self.status_label = "Cancelling after current batch".to_string();
        self.dirty = true;
    }

    pub(crate) fn apply_progress(&mut self, percent: u8, message: String) {
        self.progress_percent = percent.min(100);
        if self.session == SessionState::Running {
            self.status_label = message;
        }
        self.dirty = true;
    }

    pub(crate) fn push_log(&mut self, severity: Severity, text: impl Into<String>) {
        self.log.push(LogLine {
            severity,
            text: text.into(),
        });
        self.dirty = true;
    }

    pub(crate) fn end_run(&mut self) {
        self.session = SessionState::Idle;
        self.dirty = true;
    }

    pub(crate) fn set_status(&mut self, label: &str) {
        self.status_label = label.to_string();
        self.dirty = true;
    }
}
