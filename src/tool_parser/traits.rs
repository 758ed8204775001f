use crate::tool_parser::types::{CallRecord, ToolCall};

/// Core trait for all tool parsers
pub trait ToolParser: Send + Sync {
    /// Parse every call in a complete model output.
    ///
    /// Never fails: output that cannot be parsed yields an empty list.
    fn parse_complete(&self, output: &str) -> Vec<CallRecord>;

    /// Check if text contains tool calls in this parser's format
    fn detect_format(&self, text: &str) -> bool;

    /// Parse calls into the OpenAI-compatible tool call shape
    fn parse_tool_calls(&self, output: &str) -> Vec<ToolCall> {
        self.parse_complete(output)
            .iter()
            .map(ToolCall::from)
            .collect()
    }
}
