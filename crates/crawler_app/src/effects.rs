use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use crawl_logging::{crawl_error, crawl_info, crawl_warn};
use crawler_core::{Effect, Msg, RunOutcome, RunParams};
use crawler_engine::{
    BatchOrchestrator, HttpRenderEngine, RunError, RunEvent, RunHandle, RunRequest, RunStatus,
};
use tokio_util::sync::CancellationToken;

use crate::config::CrawlerSettings;

/// Carries core effects out to the engine and feeds run events back as messages.
pub struct EffectRunner {
    settings: CrawlerSettings,
    msg_tx: mpsc::Sender<Msg>,
    cancel: Option<CancellationToken>,
}

impl EffectRunner {
    pub fn new(settings: CrawlerSettings, msg_tx: mpsc::Sender<Msg>) -> Self {
        Self {
            settings,
            msg_tx,
            cancel: None,
        }
    }

    /// Carry out `effects`. Returns messages that must be applied right away,
    /// before anything arriving on the channel.
    pub fn enqueue(&mut self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut immediate = Vec::new();
        for effect in effects {
            match effect {
                Effect::StartRun(params) => immediate.extend(self.start_run(params)),
                Effect::RequestStop => {
                    if let Some(cancel) = &self.cancel {
                        crawl_info!("Stop requested; finishing current batch");
                        cancel.cancel();
                    }
                }
            }
        }
        immediate
    }

    fn start_run(&mut self, params: RunParams) -> Option<Msg> {
        crawl_info!(
            "StartRun urls={} output_dir={} max_concurrent={}",
            params.urls.len(),
            params.output_dir,
            params.max_concurrent
        );
        let engine = Arc::new(HttpRenderEngine::new(self.settings.http_settings()));
        let orchestrator = BatchOrchestrator::new(engine, self.settings.render_options());
        let request = RunRequest {
            urls: params.urls,
            output_dir: PathBuf::from(params.output_dir),
            max_concurrent: usize::from(params.max_concurrent),
        };

        match RunHandle::spawn(orchestrator, request) {
            Ok(handle) => {
                self.cancel = Some(handle.cancel_token());
                spawn_event_loop(handle, self.msg_tx.clone());
                None
            }
            Err(err) => {
                crawl_error!("Run rejected: {}", err);
                Some(Msg::RunRejected(rejection_message(&err)))
            }
        }
    }
}

fn rejection_message(err: &RunError) -> String {
    match err {
        RunError::OutputDir(inner) => format!("Failed to create output directory: {inner}"),
        other => format!("Crawler error: {other}"),
    }
}

fn spawn_event_loop(handle: RunHandle, msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        let mut finished = false;
        while !finished {
            match handle.recv_timeout(Duration::from_millis(50)) {
                Some(event) => finished = forward(event, &msg_tx),
                None if handle.is_finished() => {
                    // The thread may have queued its last events just before exiting.
                    while let Some(event) = handle.try_recv() {
                        finished = forward(event, &msg_tx);
                    }
                    break;
                }
                None => {}
            }
        }
        let joined = handle.join();
        if !finished {
            let detail = match joined {
                Err(err) => format!("Crawler error: {err}"),
                Ok(_) => "Crawler error: run ended without a result".to_string(),
            };
            crawl_error!("{}", detail);
            let _ = msg_tx.send(Msg::RunError { detail });
            let _ = msg_tx.send(Msg::RunFinished {
                outcome: RunOutcome::Aborted,
            });
        } else if let Err(err) = joined {
            crawl_warn!("Run thread ended abnormally: {}", err);
        }
    });
}

/// Returns true once the run's final event has been forwarded.
fn forward(event: RunEvent, msg_tx: &mpsc::Sender<Msg>) -> bool {
    let (msg, done) = match event {
        RunEvent::Progress(progress) => (
            Msg::RunProgress {
                percent: progress.percent,
                message: progress.message,
            },
            false,
        ),
        RunEvent::Error(error) => (
            Msg::RunError {
                detail: error.detail,
            },
            false,
        ),
        RunEvent::Finished(summary) => {
            crawl_info!(
                "Run finished: {:?} written={} failed={} of {}",
                summary.status,
                summary.written,
                summary.failed,
                summary.total
            );
            (
                Msg::RunFinished {
                    outcome: map_status(summary.status),
                },
                true,
            )
        }
    };
    let _ = msg_tx.send(msg);
    done
}

fn map_status(status: RunStatus) -> RunOutcome {
    match status {
        RunStatus::Completed => RunOutcome::Completed,
        RunStatus::Cancelled => RunOutcome::Cancelled,
        RunStatus::FatallyAborted => RunOutcome::Aborted,
    }
}
