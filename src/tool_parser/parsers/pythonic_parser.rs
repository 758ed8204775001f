/// Pythonic format parser for tool calls
///
/// Handles Python function call syntax anywhere in the model output, or only
/// inside the first fenced code block:
/// ~~~text
/// ```python
/// weather = get_weather(city="Paris", days=3)
/// book_flight(origin='CDG', dest="JFK", seats=[1, 2])
/// ```
/// ~~~
///
/// Arguments are Python literals rather than JSON. Only keyword arguments are
/// recovered; positional arguments are skipped.
use std::{borrow::Cow, sync::Arc};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::{
    config::ExtractionMode,
    tool_parser::{
        diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, TracingSink},
        errors::ParserResult,
        python_literal_parser::{parse_argument_value, DEFAULT_MAX_LITERAL_DEPTH},
        scanner::{scan_calls, split_arguments, split_keyword, RawCall, DEFAULT_MAX_SCAN_DEPTH},
        traits::ToolParser,
        types::CallRecord,
    },
};

/// Fenced block: opening backticks, optional language tag, newline, body
static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[ \t]*([A-Za-z0-9_+.#-]*)[ \t]*\r?\n(.*?)```")
        .expect("Valid regex pattern")
});

/// Cheap check for something call-shaped
static CALL_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z_][\w.]*\(").expect("Valid regex pattern"));

/// Markers some models wrap code in
const SPECIAL_TOKENS: [&str; 2] = ["<|python_start|>", "<|python_end|>"];

/// Knobs for [`PythonicParser`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonicOptions {
    pub mode: ExtractionMode,
    /// Only fenced blocks tagged with this language qualify (case-insensitive)
    pub fence_language: Option<String>,
    pub max_literal_depth: usize,
    pub max_scan_depth: usize,
}

impl Default for PythonicOptions {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::FullText,
            fence_language: None,
            max_literal_depth: DEFAULT_MAX_LITERAL_DEPTH,
            max_scan_depth: DEFAULT_MAX_SCAN_DEPTH,
        }
    }
}

/// Parser for pythonic call expressions in free-form model output
pub struct PythonicParser {
    options: PythonicOptions,
    sink: Arc<dyn DiagnosticSink>,
}

impl PythonicParser {
    /// Full-text parser reporting through `tracing`
    pub fn new() -> Self {
        Self::with_options(PythonicOptions::default())
    }

    /// Parser that only looks inside the first fenced code block
    pub fn fenced() -> Self {
        Self::with_options(PythonicOptions {
            mode: ExtractionMode::FencedBlock,
            ..PythonicOptions::default()
        })
    }

    pub fn with_options(options: PythonicOptions) -> Self {
        Self {
            options,
            sink: Arc::new(TracingSink),
        }
    }

    /// Route diagnostics to `sink` instead of `tracing`
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn options(&self) -> &PythonicOptions {
        &self.options
    }

    fn report(&self, kind: DiagnosticKind, message: String) {
        self.sink.report(Diagnostic::new(kind, message));
    }

    fn strip_special_tokens(text: &str) -> Cow<'_, str> {
        if !SPECIAL_TOKENS.iter().any(|token| text.contains(token)) {
            return Cow::Borrowed(text);
        }
        let mut cleaned = text.to_string();
        for token in SPECIAL_TOKENS {
            cleaned = cleaned.replace(token, "");
        }
        Cow::Owned(cleaned)
    }

    /// Interior of the first qualifying fenced block
    fn find_code_block<'a>(&self, text: &'a str) -> Option<&'a str> {
        FENCED_BLOCK
            .captures_iter(text)
            .find(|caps| match &self.options.fence_language {
                Some(language) => caps
                    .get(1)
                    .is_some_and(|tag| tag.as_str().eq_ignore_ascii_case(language)),
                None => true,
            })
            .and_then(|caps| caps.get(2))
            .map(|body| body.as_str())
    }

    /// The text to scan under the configured mode, `None` when fenced mode
    /// finds no block
    fn select_text<'a>(&self, text: &'a str) -> Option<&'a str> {
        match self.options.mode {
            ExtractionMode::FullText => Some(text),
            ExtractionMode::FencedBlock => self.find_code_block(text),
        }
    }

    /// Extraction with scan failures surfaced as errors
    pub fn try_parse(&self, output: &str) -> ParserResult<Vec<CallRecord>> {
        let cleaned = Self::strip_special_tokens(output);

        let Some(code) = self.select_text(&cleaned) else {
            self.report(
                DiagnosticKind::NoCodeBlockFound,
                "No fenced code block in model output".to_string(),
            );
            return Ok(vec![]);
        };

        let scanned = scan_calls(code, self.options.max_scan_depth)?;

        for offset in &scanned.unterminated {
            let snippet: String = code[*offset..].chars().take(40).collect();
            self.report(
                DiagnosticKind::MalformedCall,
                format!("Skipping unterminated call at offset {}: {}", offset, snippet),
            );
        }

        for offset in &scanned.unbalanced {
            let snippet: String = code[*offset..].chars().take(40).collect();
            self.report(
                DiagnosticKind::MalformedCall,
                format!(
                    "Skipping call with mismatched brackets at offset {}: {}",
                    offset, snippet
                ),
            );
        }

        Ok(scanned
            .calls
            .iter()
            .map(|call| self.build_record(call))
            .collect())
    }

    fn build_record(&self, call: &RawCall<'_>) -> CallRecord {
        let mut record = CallRecord::new(call.name);

        for argument in split_arguments(call.args) {
            let Some((key, value_text)) = split_keyword(argument) else {
                debug!(function = call.name, argument, "Skipping non-keyword argument");
                continue;
            };

            let value = parse_argument_value(value_text, self.options.max_literal_depth);
            if value.is_raw() {
                self.report(
                    DiagnosticKind::LiteralParseFailure,
                    format!(
                        "{}: argument '{}' kept as raw text: {}",
                        call.name, key, value_text
                    ),
                );
            }
            record.arguments.insert(key.to_string(), value);
        }

        record
    }
}

impl ToolParser for PythonicParser {
    fn parse_complete(&self, output: &str) -> Vec<CallRecord> {
        match self.try_parse(output) {
            Ok(records) => records,
            Err(err) => {
                self.report(
                    DiagnosticKind::UnexpectedScanFailure,
                    format!("Failed to scan model output: {}", err),
                );
                vec![]
            }
        }
    }

    fn detect_format(&self, text: &str) -> bool {
        let cleaned = Self::strip_special_tokens(text);
        self.select_text(&cleaned)
            .is_some_and(|code| CALL_START.is_match(code))
    }
}

impl Default for PythonicParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool_parser::{diagnostics::CollectingSink, types::TypedValue};

    #[test]
    fn test_single_function_call() {
        let parser = PythonicParser::new();
        let input = r#"search_web(query="Rust programming", max_results=5)"#;

        let result = parser.parse_complete(input);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].function_name, "search_web");
        assert_eq!(
            result[0].get("query"),
            Some(&TypedValue::String("Rust programming".into()))
        );
        assert_eq!(result[0].get("max_results"), Some(&TypedValue::Integer(5)));
    }

    #[test]
    fn test_multiple_function_calls() {
        let parser = PythonicParser::new();
        let input = r#"[get_weather(city="Tokyo"), search(query="news")]"#;

        let result = parser.parse_complete(input);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].function_name, "get_weather");
        assert_eq!(result[1].function_name, "search");
    }

    #[test]
    fn test_python_literals() {
        let parser = PythonicParser::new();
        let input = r#"test(flag=True, disabled=False, optional=None)"#;

        let result = parser.parse_complete(input);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].get("flag"), Some(&TypedValue::Boolean(true)));
        assert_eq!(result[0].get("disabled"), Some(&TypedValue::Boolean(false)));
        assert_eq!(result[0].get("optional"), Some(&TypedValue::None));
    }

    #[test]
    fn test_special_tokens() {
        let parser = PythonicParser::new();
        let input = r#"<|python_start|>calculate(x=10, y=20)<|python_end|>"#;

        let result = parser.parse_complete(input);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].function_name, "calculate");
        assert_eq!(result[0].get("y"), Some(&TypedValue::Integer(20)));
    }

    #[test]
    fn test_fenced_mode_ignores_text_outside_block() {
        let parser = PythonicParser::fenced();
        let input = "First intro(x=1)\n```python\nget_time(tz='UTC')\n```\noutro(y=2)";

        let result = parser.parse_complete(input);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].function_name, "get_time");
    }

    #[test]
    fn test_fence_language_filter() {
        let parser = PythonicParser::with_options(PythonicOptions {
            mode: ExtractionMode::FencedBlock,
            fence_language: Some("python".to_string()),
            ..PythonicOptions::default()
        });
        let input = "```json\n{\"a\": f(x=1)}\n```\n```Python\ng(y=2)\n```";

        let result = parser.parse_complete(input);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].function_name, "g");
    }

    #[test]
    fn test_diagnostics_are_reported() {
        let sink = Arc::new(CollectingSink::new());
        let parser = PythonicParser::fenced().with_sink(sink.clone());

        assert!(parser.parse_complete("no code here").is_empty());
        assert_eq!(sink.count(DiagnosticKind::NoCodeBlockFound), 1);

        let parser = PythonicParser::new().with_sink(sink.clone());
        let result = parser.parse_complete("f(x=some_var)\ng(y=(1, 2");
        assert_eq!(result.len(), 1);
        assert_eq!(
            result[0].get("x"),
            Some(&TypedValue::RawString("some_var".into()))
        );
        assert_eq!(sink.count(DiagnosticKind::LiteralParseFailure), 1);
        assert_eq!(sink.count(DiagnosticKind::MalformedCall), 1);
    }

    #[test]
    fn test_scan_failure_degrades_to_empty() {
        let sink = Arc::new(CollectingSink::new());
        let parser = PythonicParser::with_options(PythonicOptions {
            max_scan_depth: 4,
            ..PythonicOptions::default()
        })
        .with_sink(sink.clone());

        assert!(parser.parse_complete("f(x=[[[[[1]]]]])").is_empty());
        assert_eq!(sink.count(DiagnosticKind::UnexpectedScanFailure), 1);
    }

    #[test]
    fn test_detect_format() {
        let parser = PythonicParser::new();
        assert!(parser.detect_format("call get_weather(city='x')"));
        assert!(!parser.detect_format("nothing to see"));

        let fenced = PythonicParser::fenced();
        assert!(!fenced.detect_format("get_weather(city='x')"));
        assert!(fenced.detect_format("```\nget_weather(city='x')\n```"));
    }
}
