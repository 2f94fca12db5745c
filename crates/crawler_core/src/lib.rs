//! Crawler core: pure front-end state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod validate;
mod view_model;

pub use effect::{Effect, RunParams};
pub use msg::{Msg, RunOutcome};
pub use state::{AppState, SessionState, DEFAULT_MAX_CONCURRENT, MAX_CONCURRENT_RANGE};
pub use update::update;
pub use validate::{parse_urls, validate_inputs, validate_url, ValidationError};
pub use view_model::{AppViewModel, LogLine, Severity};
