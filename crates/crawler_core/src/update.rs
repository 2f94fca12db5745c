use crate::view_model::Severity;
use crate::{validate_inputs, AppState, Effect, Msg, RunOutcome, RunParams, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let idle = state.session() == SessionState::Idle;
    let effects = match msg {
        Msg::InputChanged(text) | Msg::UrlsLoaded(text) => {
            if idle {
                state.set_url_input(text);
            }
            Vec::new()
        }
        Msg::UrlsLoadFailed(err) => {
            state.push_log(Severity::Error, format!("Failed to load URLs: {err}"));
            Vec::new()
        }
        Msg::OutputDirChanged(dir) => {
            if idle {
                state.set_output_dir(dir);
            }
            Vec::new()
        }
        Msg::MaxConcurrentChanged(value) => {
            if idle {
                state.set_max_concurrent(value);
            }
            Vec::new()
        }
        Msg::StartClicked => {
            if !idle {
                return (state, Vec::new());
            }
            match validate_inputs(state.url_input(), state.output_dir()) {
                Ok(urls) => {
                    let params = RunParams {
                        urls,
                        output_dir: state.output_dir().trim().to_string(),
                        max_concurrent: state.max_concurrent(),
                    };
                    state.begin_run();
                    vec![Effect::StartRun(params)]
                }
                Err(err) => {
                    state.reject_start(err.to_string());
                    Vec::new()
                }
            }
        }
        Msg::CancelClicked => {
            if state.session() == SessionState::Running {
                state.begin_cancel();
                vec![Effect::RequestStop]
            } else {
                Vec::new()
            }
        }
        Msg::RunRejected(reason) => {
            if !idle {
                state.end_run();
                state.set_status("Ready");
                state.push_log(Severity::Error, reason);
            }
            Vec::new()
        }
        Msg::RunProgress { percent, message } => {
            if !idle {
                state.apply_progress(percent, message);
            }
            Vec::new()
        }
        Msg::RunError { detail } => {
            state.push_log(Severity::Error, detail);
            Vec::new()
        }
        Msg::RunFinished { outcome } => {
            if !idle {
                state.end_run();
                state.set_status("Crawling completed");
                state.push_log(Severity::Info, "Crawling process finished");
                if outcome == RunOutcome::Cancelled {
                    state.push_log(Severity::Info, "Crawling cancelled by user");
                }
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
