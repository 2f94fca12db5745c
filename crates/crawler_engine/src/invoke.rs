use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;

use crate::render::RenderEngine;
use crate::types::{FetchOutcome, RenderOptions, RenderReply};

/// Runs one engine call per URL and folds every way it can end into a [`FetchOutcome`].
#[derive(Clone)]
pub struct FetchInvoker {
    engine: Arc<dyn RenderEngine>,
    options: RenderOptions,
}

impl FetchInvoker {
    pub fn new(engine: Arc<dyn RenderEngine>, options: RenderOptions) -> Self {
        Self { engine, options }
    }

    pub async fn invoke(&self, url: &str) -> FetchOutcome {
        let session_id = session_id_for(url);
        let call = self.engine.render(url, &session_id, &self.options);
        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(Ok(RenderReply::Content(content))) if !content.is_empty() => {
                FetchOutcome::Rendered { content }
            }
            Ok(Ok(RenderReply::Content(_) | RenderReply::NoContent)) => FetchOutcome::Empty,
            Ok(Ok(RenderReply::Failed { message, .. })) => {
                FetchOutcome::ReportedFailure { reason: message }
            }
            Ok(Err(fault)) => FetchOutcome::Fault {
                reason: fault.to_string(),
            },
            Err(panic) => FetchOutcome::Fault {
                reason: panic_message(panic.as_ref()),
            },
        }
    }
}

/// One logical engine session per URL.
pub fn session_id_for(url: &str) -> String {
    format!("session_{url}")
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        format!("engine panicked: {msg}")
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("engine panicked: {msg}")
    } else {
        "engine panicked".to_string()
    }
}
