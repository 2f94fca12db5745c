//! Crawler engine: page rendering, output files and the batch orchestrator.
mod convert;
mod decode;
mod events;
mod extract;
mod filename;
mod invoke;
mod orchestrator;
mod persist;
mod render;
mod types;
mod worker;
mod wrap;

pub use convert::{render_markdown, Converter, Html2MdConverter, TextOnlyConverter};
pub use decode::{decode_page, DecodeError, DecodedPage};
pub use events::{
    ChannelEventSink, ErrorEvent, EventSink, ProgressEvent, RunEvent, RunStatus, RunSummary,
};
pub use extract::main_content_html;
pub use filename::{derive_output_filename, OUTPUT_EXTENSION};
pub use invoke::{session_id_for, FetchInvoker};
pub use orchestrator::{BatchOrchestrator, PreparedRun, RunError, RunRequest};
pub use persist::{ensure_output_dir, PersistError, ResultWriter};
pub use render::{HttpRenderEngine, HttpSettings, RenderEngine};
pub use types::{EngineError, EngineFault, FailureKind, FetchOutcome, RenderOptions, RenderReply};
pub use worker::RunHandle;
pub use wrap::wrap_markdown;
