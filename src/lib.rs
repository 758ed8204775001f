pub mod config;
pub mod handler;
pub mod logging;
pub mod prompt;
pub mod tool_parser;

pub use config::{ExtractionMode, HandlerConfig};
pub use handler::PythonicHandler;
pub use tool_parser::{CallRecord, ToolCall, TypedValue};
