use std::collections::VecDeque;
use std::fs;
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use crawl_logging::{crawl_info, crawl_warn, LogDestination};
use crawler_core::{update, AppState, Effect, Msg, SessionState, Severity};

use crate::cli::Cli;
use crate::config::CrawlerSettings;
use crate::effects::EffectRunner;
use crate::render::TerminalView;

/// Exit code when the inputs never make it to a run.
const EXIT_INVALID_INPUT: u8 = 2;
/// Exit code after a second Ctrl-C.
const EXIT_INTERRUPTED: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    /// Let the current batch finish, then stop.
    Cancel,
    ForceQuit,
}

fn on_interrupt(presses: u32) -> Interrupt {
    if presses <= 1 {
        Interrupt::Cancel
    } else {
        Interrupt::ForceQuit
    }
}

pub fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let destination = match &cli.log_file {
        Some(path) => LogDestination::File(path.clone()),
        None => LogDestination::Terminal,
    };
    crawl_logging::initialize(destination, cli.log_level());

    let settings = CrawlerSettings::load(&cli.config).with_overrides(&cli);
    crawl_info!("Effective settings: {:?}", settings);

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let mut runner = EffectRunner::new(settings.clone(), msg_tx.clone());
    let mut view = TerminalView::new();
    let mut state = submit(
        AppState::new(),
        input_messages(&cli, &settings),
        &mut runner,
        &mut view,
    );
    if state.session() == SessionState::Idle {
        view.finish();
        return Ok(ExitCode::from(EXIT_INVALID_INPUT));
    }

    spawn_ctrl_c_listener(msg_tx);

    while state.session() != SessionState::Idle {
        let msg = msg_rx
            .recv()
            .context("run event channel closed before the run finished")?;
        state = dispatch(state, msg, &mut runner, &mut view);
    }
    view.finish();

    let failed = state
        .view()
        .log
        .iter()
        .any(|line| line.severity == Severity::Error);
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// The messages a user would produce by filling in the form and pressing start.
fn input_messages(cli: &Cli, settings: &CrawlerSettings) -> Vec<Msg> {
    let mut msgs = Vec::new();
    let mut text = cli.urls.join("\n");
    msgs.push(Msg::InputChanged(text.clone()));

    if let Some(path) = &cli.urls_file {
        match fs::read_to_string(path) {
            Ok(content) => {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(&content);
                msgs.push(Msg::UrlsLoaded(text));
            }
            Err(err) => {
                crawl_warn!("Failed to read URL file {:?}: {}", path, err);
                msgs.push(Msg::UrlsLoadFailed(format!("{}: {err}", path.display())));
            }
        }
    }

    let output_dir = cli
        .output
        .as_ref()
        .map(|dir| dir.display().to_string())
        .unwrap_or_default();
    msgs.push(Msg::OutputDirChanged(output_dir));
    msgs.push(Msg::MaxConcurrentChanged(settings.max_concurrent));
    msgs.push(Msg::StartClicked);
    msgs
}

/// Apply the form inputs. The session is still Idle afterwards when the run
/// was refused, either by validation or because it could not be started.
fn submit(
    mut state: AppState,
    msgs: Vec<Msg>,
    runner: &mut EffectRunner,
    view: &mut TerminalView,
) -> AppState {
    for msg in msgs {
        state = dispatch(state, msg, runner, view);
    }
    state
}

fn dispatch(
    state: AppState,
    msg: Msg,
    runner: &mut EffectRunner,
    view: &mut TerminalView,
) -> AppState {
    let mut pending = VecDeque::from([msg]);
    let mut state = state;
    while let Some(msg) = pending.pop_front() {
        let (mut next, effects) = update(state, msg);
        if next.consume_dirty() {
            view.render(&next.view());
        }
        if !effects.is_empty() {
            log_effects(&effects);
            pending.extend(runner.enqueue(effects));
        }
        state = next;
    }
    state
}

fn log_effects(effects: &[Effect]) {
    for effect in effects {
        match effect {
            Effect::StartRun(params) => crawl_info!("Effect StartRun ({} urls)", params.urls.len()),
            Effect::RequestStop => crawl_info!("Effect RequestStop"),
        }
    }
}

/// The first Ctrl-C asks the run to stop after its current batch; the next one exits.
fn spawn_ctrl_c_listener(msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_io()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                crawl_warn!("Ctrl-C handling unavailable: {}", err);
                return;
            }
        };
        runtime.block_on(async {
            let mut presses = 0;
            while tokio::signal::ctrl_c().await.is_ok() {
                presses += 1;
                match on_interrupt(presses) {
                    Interrupt::Cancel => {
                        eprintln!("Stopping after the current batch; press Ctrl-C again to quit");
                        let _ = msg_tx.send(Msg::CancelClicked);
                    }
                    Interrupt::ForceQuit => {
                        crawl_warn!("Interrupted again; exiting without waiting for the run");
                        std::process::exit(EXIT_INTERRUPTED);
                    }
                }
            }
        });
    });
}

#[cfg(test)]
mod tests {
    use crawler_core::LogLine;
    use tempfile::TempDir;

    use super::*;

    fn form(urls: &str, output_dir: &str) -> Vec<Msg> {
        vec![
            Msg::InputChanged(urls.to_string()),
            Msg::OutputDirChanged(output_dir.to_string()),
            Msg::StartClicked,
        ]
    }

    #[test]
    fn uncreatable_output_dir_is_refused_before_the_run_starts() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let output_dir = blocker.join("out");

        let (msg_tx, msg_rx) = mpsc::channel();
        let mut runner = EffectRunner::new(CrawlerSettings::default(), msg_tx);
        let mut view = TerminalView::hidden();
        let state = submit(
            AppState::new(),
            form("https://example.com/a", &output_dir.display().to_string()),
            &mut runner,
            &mut view,
        );

        let view_model = state.view();
        assert_eq!(view_model.session, SessionState::Idle);
        assert_eq!(view_model.log.len(), 1);
        assert_eq!(view_model.log[0].severity, Severity::Error);
        assert!(view_model.log[0]
            .text
            .starts_with("Failed to create output directory: "));
        assert!(msg_rx.try_recv().is_err());
    }

    #[test]
    fn invalid_url_is_refused_the_same_way() {
        let temp = TempDir::new().unwrap();
        let (msg_tx, _msg_rx) = mpsc::channel();
        let mut runner = EffectRunner::new(CrawlerSettings::default(), msg_tx);
        let mut view = TerminalView::hidden();
        let state = submit(
            AppState::new(),
            form("notaurl", &temp.path().display().to_string()),
            &mut runner,
            &mut view,
        );

        assert_eq!(state.session(), SessionState::Idle);
        assert_eq!(
            state.view().validation_error.as_deref(),
            Some("Invalid URL: notaurl")
        );
        assert_eq!(state.view().log, Vec::<LogLine>::new());
    }

    #[test]
    fn second_interrupt_forces_exit() {
        assert_eq!(on_interrupt(1), Interrupt::Cancel);
        assert_eq!(on_interrupt(2), Interrupt::ForceQuit);
        assert_eq!(on_interrupt(5), Interrupt::ForceQuit);
    }
}
