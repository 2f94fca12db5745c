#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use crawler_engine::{
    EngineError, EngineFault, EventSink, FailureKind, RenderEngine, RenderOptions, RenderReply,
    RunEvent,
};
use tokio_util::sync::CancellationToken;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(crawl_logging::initialize_for_tests);
}

#[derive(Debug, Clone)]
pub enum Script {
    Content(String),
    NoContent,
    Fail(String),
    Fault(String),
    Panic(String),
}

/// Engine that answers from a per-URL script and records how it was driven.
#[derive(Default)]
pub struct ScriptedEngine {
    scripts: HashMap<String, (Script, Duration)>,
    fail_launch: Option<String>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: Mutex<Vec<(String, String)>>,
    shutdowns: AtomicUsize,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, script: Script) -> Self {
        self.scripts
            .insert(url.to_string(), (script, Duration::from_millis(5)));
        self
    }

    pub fn with_delay(mut self, url: &str, script: Script, delay: Duration) -> Self {
        self.scripts.insert(url.to_string(), (script, delay));
        self
    }

    pub fn failing_launch(mut self, message: &str) -> Self {
        self.fail_launch = Some(message.to_string());
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// `(url, session_id)` in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RenderEngine for ScriptedEngine {
    async fn launch(&self) -> Result<(), EngineError> {
        match &self.fail_launch {
            Some(message) => Err(EngineError::Launch(message.clone())),
            None => Ok(()),
        }
    }

    async fn render(
        &self,
        url: &str,
        session_id: &str,
        _options: &RenderOptions,
    ) -> Result<RenderReply, EngineFault> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), session_id.to_string()));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let (script, delay) = self
            .scripts
            .get(url)
            .cloned()
            .unwrap_or_else(|| (Script::Content(format!("# {url}")), Duration::from_millis(5)));
        tokio::time::sleep(delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match script {
            Script::Content(content) => Ok(RenderReply::Content(content)),
            Script::NoContent => Ok(RenderReply::NoContent),
            Script::Fail(message) => Ok(RenderReply::Failed {
                kind: FailureKind::Network,
                message,
            }),
            Script::Fault(message) => Err(EngineFault::new(message)),
            Script::Panic(message) => panic!("{}", message),
        }
    }

    async fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

/// Sink that keeps every event and can fire a cancellation token once a
/// given number of tasks has completed.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<RunEvent>>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancelling_after(completed: usize, token: CancellationToken) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            cancel_after: Some((completed, token)),
        }
    }

    pub fn events(&self) -> Vec<RunEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn percents(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RunEvent::Progress(progress) => Some(progress.percent),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RunEvent::Error(error) => Some(error.detail),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: RunEvent) {
        let progress_count = {
            let mut events = self.events.lock().unwrap();
            events.push(event);
            events
                .iter()
                .filter(|e| matches!(e, RunEvent::Progress(_)))
                .count()
        };
        if let Some((after, token)) = &self.cancel_after {
            if progress_count >= *after {
                token.cancel();
            }
        }
    }
}

pub fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|u| u.to_string()).collect()
}

pub fn engine(engine: ScriptedEngine) -> Arc<ScriptedEngine> {
    Arc::new(engine)
}
