/// Tool parser module for recovering pythonic function calls from model outputs
///
/// Model text is scanned for `name(key=value, ...)` shapes, argument values are
/// evaluated as Python literals, and the resulting records can be rendered back
/// into canonical call strings.
// Core modules
pub mod diagnostics;
pub mod errors;
pub mod python_literal_parser;
pub mod registry;
pub mod scanner;
pub mod serializer;
pub mod state;
pub mod traits;
pub mod types;

// Parser implementations
pub mod parsers;


// Re-export commonly used types
pub use diagnostics::{
    CollectingSink, Diagnostic, DiagnosticKind, DiagnosticSink, NoopSink, TracingSink,
};
pub use errors::{ParserError, ParserResult};
pub use parsers::{PythonicOptions, PythonicParser};
pub use python_literal_parser::{parse_argument_value, parse_python_literal};
pub use registry::ParserRegistry;
pub use serializer::{python_repr, serialize_call, serialize_calls};
pub use traits::ToolParser;
pub use types::{Arguments, CallRecord, FunctionCall, ToolCall, TypedValue};
