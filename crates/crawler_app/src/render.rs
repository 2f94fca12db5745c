use crawler_core::{AppViewModel, SessionState};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const BAR_TEMPLATE: &str = "{bar:40.cyan/blue} {pos:>3}% {msg}";

/// Terminal rendering of the view model: a percent bar plus the status log.
pub struct TerminalView {
    bar: ProgressBar,
    printed_lines: usize,
    last_session: SessionState,
}

impl TerminalView {
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(Some(100), ProgressDrawTarget::stderr());
        bar.set_style(
            ProgressStyle::with_template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self {
            bar,
            printed_lines: 0,
            last_session: SessionState::Idle,
        }
    }

    #[cfg(test)]
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            printed_lines: 0,
            last_session: SessionState::Idle,
        }
    }

    pub fn render(&mut self, view: &AppViewModel) {
        // A new run clears the log.
        if view.log.len() < self.printed_lines {
            self.printed_lines = 0;
        }
        for line in &view.log[self.printed_lines..] {
            self.bar.println(line.display());
        }
        self.printed_lines = view.log.len();

        self.bar.set_position(u64::from(view.progress_percent));
        self.bar.set_message(view.status_label.clone());

        if let Some(error) = &view.validation_error {
            self.bar.println(format!("ERROR: {error}"));
        }
        if view.session == SessionState::Idle && self.last_session != SessionState::Idle {
            self.bar.finish();
        }
        self.last_session = view.session;
    }

    pub fn finish(&self) {
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}
