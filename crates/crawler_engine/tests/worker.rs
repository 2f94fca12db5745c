mod common;

use std::time::Duration;

use common::{engine, init_logging, urls, ScriptedEngine, Script};
use crawler_engine::{BatchOrchestrator, RenderOptions, RunError, RunEvent, RunHandle, RunRequest, RunStatus};
use tempfile::TempDir;

fn drain(handle: &RunHandle) -> Vec<RunEvent> {
    let mut events = Vec::new();
    while let Some(event) = handle.recv_timeout(Duration::from_secs(5)) {
        let done = matches!(event, RunEvent::Finished(_));
        events.push(event);
        if done {
            break;
        }
    }
    events
}

#[test]
fn background_run_delivers_events_and_summary() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let orchestrator = BatchOrchestrator::new(
        engine(ScriptedEngine::new().with("https://e.com/b", Script::Fail("404 Not Found".into()))),
        RenderOptions::default(),
    );

    let handle = RunHandle::spawn(
        orchestrator,
        RunRequest {
            urls: urls(&["https://e.com/a", "https://e.com/b", "https://e.com/c"]),
            output_dir: dir.path().to_path_buf(),
            max_concurrent: 2,
        },
    )
    .unwrap();

    let events = drain(&handle);
    let summary = handle.join().unwrap();

    assert_eq!(summary.status, RunStatus::Completed);
    assert_eq!(summary.completed, 3);
    assert_eq!(summary.written, 2);
    assert!(matches!(events.last(), Some(RunEvent::Finished(s)) if s == &summary));
    let errors = events
        .iter()
        .filter(|e| matches!(e, RunEvent::Error(_)))
        .count();
    assert_eq!(errors, 1);
}

#[test]
fn stop_takes_effect_at_the_next_batch() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let slow = Duration::from_millis(150);
    let scripted = engine(
        ScriptedEngine::new()
            .with_delay("https://e.com/1", Script::Content("1".into()), slow)
            .with_delay("https://e.com/2", Script::Content("2".into()), slow)
            .with_delay("https://e.com/3", Script::Content("3".into()), slow),
    );
    let orchestrator = BatchOrchestrator::new(scripted.clone(), RenderOptions::default());

    let handle = RunHandle::spawn(
        orchestrator,
        RunRequest {
            urls: urls(&["https://e.com/1", "https://e.com/2", "https://e.com/3"]),
            output_dir: dir.path().to_path_buf(),
            max_concurrent: 1,
        },
    )
    .unwrap();
    // Stop while the first fetch is in flight.
    while scripted.calls().is_empty() {
        std::thread::sleep(Duration::from_millis(1));
    }
    handle.stop();

    let events = drain(&handle);
    let summary = handle.join().unwrap();

    assert_eq!(summary.status, RunStatus::Cancelled);
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.written, 1);
    assert!(dir.path().join("e.com_1.md").is_file());
    assert!(matches!(events.last(), Some(RunEvent::Finished(_))));
}

#[test]
fn invalid_request_fails_on_the_calling_thread() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let orchestrator = BatchOrchestrator::new(engine(ScriptedEngine::new()), RenderOptions::default());

    let result = RunHandle::spawn(
        orchestrator,
        RunRequest {
            urls: Vec::new(),
            output_dir: dir.path().to_path_buf(),
            max_concurrent: 1,
        },
    );

    assert!(matches!(result, Err(RunError::NoUrls)));
}
