use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    config::ExtractionMode,
    tool_parser::{
        diagnostics::{DiagnosticSink, TracingSink},
        parsers::{PythonicOptions, PythonicParser},
        traits::ToolParser,
    },
};

/// Registry for tool parsers and model mappings
pub struct ParserRegistry {
    /// Map of parser name to parser instance
    parsers: HashMap<String, Arc<dyn ToolParser>>,
    /// Map of model name/pattern to parser name
    model_mapping: HashMap<String, String>,
    /// Default parser to use when no match found
    default_parser: String,
}

impl ParserRegistry {
    /// Create a registry with the built-in parsers and model mappings
    pub fn new() -> Self {
        Self::with_sink(Arc::new(TracingSink))
    }

    /// Like [`ParserRegistry::new`], with diagnostics from the built-in
    /// parsers routed to `sink`
    pub fn with_sink(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self::with_options(PythonicOptions::default(), sink)
    }

    /// Built-in parsers sharing the fence language and depth limits of
    /// `options`. The extraction mode comes from each parser, not `options`.
    pub fn with_options(options: PythonicOptions, sink: Arc<dyn DiagnosticSink>) -> Self {
        let full_text = PythonicOptions {
            mode: ExtractionMode::FullText,
            ..options.clone()
        };
        let fenced = PythonicOptions {
            mode: ExtractionMode::FencedBlock,
            ..options
        };

        let mut registry = Self::empty();
        registry.register_parser(
            "pythonic",
            Arc::new(PythonicParser::with_options(full_text).with_sink(sink.clone())),
        );
        registry.register_parser(
            "pythonic_fenced",
            Arc::new(PythonicParser::with_options(fenced).with_sink(sink)),
        );
        registry.register_default_mappings();
        registry
    }

    /// Registry with no parsers and no mappings
    pub fn empty() -> Self {
        Self {
            parsers: HashMap::new(),
            model_mapping: HashMap::new(),
            default_parser: "pythonic".to_string(),
        }
    }

    /// Register a parser
    pub fn register_parser(&mut self, name: impl Into<String>, parser: Arc<dyn ToolParser>) {
        self.parsers.insert(name.into(), parser);
    }

    /// Map a model name/pattern to a parser
    pub fn map_model(&mut self, model: impl Into<String>, parser: impl Into<String>) {
        self.model_mapping.insert(model.into(), parser.into());
    }

    /// Get parser for a specific model.
    ///
    /// Exact mappings win, then the longest matching `prefix*` pattern, then
    /// the default parser.
    pub fn get_parser(&self, model: &str) -> Option<Arc<dyn ToolParser>> {
        if let Some(parser) = self
            .model_mapping
            .get(model)
            .and_then(|name| self.parsers.get(name))
        {
            return Some(parser.clone());
        }

        let best_prefix = self
            .model_mapping
            .iter()
            .filter_map(|(pattern, parser_name)| {
                let prefix = pattern.strip_suffix('*')?;
                model
                    .starts_with(prefix)
                    .then_some((prefix.len(), parser_name))
            })
            .filter(|(_, parser_name)| self.parsers.contains_key(*parser_name))
            .max_by_key(|(len, _)| *len);

        if let Some((_, parser_name)) = best_prefix {
            return self.parsers.get(parser_name).cloned();
        }

        self.parsers.get(&self.default_parser).cloned()
    }

    /// Get a parser by its registered name
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn ToolParser>> {
        self.parsers.get(name).cloned()
    }

    /// List all registered parsers
    pub fn list_parsers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.parsers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// List all model mappings
    pub fn list_mappings(&self) -> Vec<(&str, &str)> {
        self.model_mapping
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    /// Register default model mappings
    fn register_default_mappings(&mut self) {
        // Models prompted to answer with a single fenced python block
        self.map_model("dria*", "pythonic_fenced");
        self.map_model("Dria*", "pythonic_fenced");

        // Models emitting bare pythonic call lists
        self.map_model("llama-4*", "pythonic");
        self.map_model("meta-llama/Llama-4*", "pythonic");
    }

    /// Set the default parser
    pub fn set_default_parser(&mut self, name: impl Into<String>) {
        self.default_parser = name.into();
    }

    /// Check if a parser is registered
    pub fn has_parser(&self, name: &str) -> bool {
        self.parsers.contains_key(name)
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
