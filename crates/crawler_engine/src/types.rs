use std::fmt;

use serde::{Deserialize, Serialize};

/// Render configuration shared by every fetch of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Drop hyperlink targets and images, keeping only anchor text.
    pub ignore_links: bool,
    /// Column at which rendered text is wrapped. Zero disables wrapping.
    pub body_width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            ignore_links: true,
            body_width: 80,
        }
    }
}

/// What the render engine reports for one URL when the call itself succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderReply {
    Content(String),
    NoContent,
    Failed { kind: FailureKind, message: String },
}

impl RenderReply {
    pub(crate) fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failed {
            kind,
            message: message.into(),
        }
    }
}

/// The engine call itself broke down, as opposed to reporting a failed page.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct EngineFault {
    pub message: String,
}

impl EngineFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors raised while bringing the engine up for a run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("engine failed to launch: {0}")]
    Launch(String),
}

/// Normalized result of one fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Rendered { content: String },
    Empty,
    ReportedFailure { reason: String },
    Fault { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Decode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Decode => write!(f, "decode error"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
