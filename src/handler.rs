//! Facade over prompt construction and call decoding for one model family.
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::{
    config::{ConfigResult, HandlerConfig},
    prompt::{ChatMessage, FunctionInput, PromptFormatter},
    tool_parser::{
        serialize_calls, CallRecord, DiagnosticSink, PythonicParser, ToolCall, ToolParser,
    },
};

/// Prompts a model with pythonic function declarations and decodes the
/// calls it writes back
pub struct PythonicHandler {
    config: HandlerConfig,
    formatter: PromptFormatter,
    parser: PythonicParser,
}

impl PythonicHandler {
    /// Handler for a validated config
    pub fn new(config: HandlerConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: HandlerConfig) -> Self {
        let formatter = PromptFormatter::new(config.chat_markers.clone());
        let parser = PythonicParser::with_options(config.pythonic_options());
        Self {
            config,
            formatter,
            parser,
        }
    }

    /// Route extraction diagnostics to `sink`
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.parser = self.parser.with_sink(sink);
        self
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    pub fn parser(&self) -> &PythonicParser {
        &self.parser
    }

    /// Full prompt for `messages` with `functions` declared in the system turn
    pub fn format_prompt(
        &self,
        messages: &[ChatMessage],
        functions: &FunctionInput,
    ) -> Result<String> {
        self.formatter.format_prompt(messages, functions)
    }

    /// Structured calls found in the model output, in order of appearance
    pub fn decode_calls(&self, model_output: &str) -> Vec<CallRecord> {
        let calls = self.parser.parse_complete(model_output);
        debug!(count = calls.len(), "Decoded calls");
        calls
    }

    /// Canonical `name(key=value)` strings for the calls in the model output
    pub fn decode_execution_strings(&self, model_output: &str) -> Vec<String> {
        serialize_calls(&self.decode_calls(model_output))
    }

    /// Calls in the OpenAI-compatible tool call shape
    pub fn decode_tool_calls(&self, model_output: &str) -> Vec<ToolCall> {
        self.parser.parse_tool_calls(model_output)
    }

    pub fn stop_token_ids(&self) -> &[u32] {
        &self.config.stop_token_ids
    }

    pub fn skip_special_tokens(&self) -> bool {
        self.config.skip_special_tokens
    }
}

impl Default for PythonicHandler {
    fn default() -> Self {
        Self::build(HandlerConfig::default())
    }
}
