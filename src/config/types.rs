use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{ConfigError, ConfigResult, ConfigValidator};
use crate::tool_parser::{
    python_literal_parser::DEFAULT_MAX_LITERAL_DEPTH, scanner::DEFAULT_MAX_SCAN_DEPTH,
    PythonicOptions,
};

/// Where the extractor looks for calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Scan the whole model output
    #[default]
    FullText,
    /// Scan only the first fenced code block
    FencedBlock,
}

impl ExtractionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMode::FullText => "full_text",
            ExtractionMode::FencedBlock => "fenced_block",
        }
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "full_text" | "full" | "text" => Ok(ExtractionMode::FullText),
            "fenced_block" | "fenced" | "block" => Ok(ExtractionMode::FencedBlock),
            _ => Err(ConfigError::InvalidValue {
                field: "mode".to_string(),
                value: s.to_string(),
                reason: "Expected 'full_text' or 'fenced_block'".to_string(),
            }),
        }
    }
}

/// Role markers wrapped around every chat turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMarkers {
    pub start: String,
    pub end: String,
}

impl Default for ChatMarkers {
    fn default() -> Self {
        Self {
            start: "<|im_start|>".to_string(),
            end: "<|im_end|>".to_string(),
        }
    }
}

/// Static configuration of a pythonic function-calling handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerConfig {
    #[serde(default)]
    pub mode: ExtractionMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fence_language: Option<String>,
    #[serde(default = "default_max_literal_depth")]
    pub max_literal_depth: usize,
    #[serde(default = "default_max_scan_depth")]
    pub max_scan_depth: usize,
    /// Token ids that end generation (Qwen end-of-text and turn markers)
    #[serde(default = "default_stop_token_ids")]
    pub stop_token_ids: Vec<u32>,
    #[serde(default = "default_skip_special_tokens")]
    pub skip_special_tokens: bool,
    #[serde(default)]
    pub chat_markers: ChatMarkers,
}

fn default_max_literal_depth() -> usize {
    DEFAULT_MAX_LITERAL_DEPTH
}

fn default_max_scan_depth() -> usize {
    DEFAULT_MAX_SCAN_DEPTH
}

fn default_stop_token_ids() -> Vec<u32> {
    vec![151643, 151644, 151645]
}

fn default_skip_special_tokens() -> bool {
    true
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::default(),
            fence_language: None,
            max_literal_depth: default_max_literal_depth(),
            max_scan_depth: default_max_scan_depth(),
            stop_token_ids: default_stop_token_ids(),
            skip_special_tokens: default_skip_special_tokens(),
            chat_markers: ChatMarkers::default(),
        }
    }
}

impl HandlerConfig {
    /// Parse and validate a JSON config; missing fields take their defaults
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: HandlerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        ConfigValidator::validate(self)
    }

    /// Extractor options derived from this config
    pub fn pythonic_options(&self) -> PythonicOptions {
        PythonicOptions {
            mode: self.mode,
            fence_language: self.fence_language.clone(),
            max_literal_depth: self.max_literal_depth,
            max_scan_depth: self.max_scan_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HandlerConfig::default();
        assert_eq!(config.mode, ExtractionMode::FullText);
        assert_eq!(config.stop_token_ids, vec![151643, 151644, 151645]);
        assert!(config.skip_special_tokens);
        assert_eq!(config.chat_markers.start, "<|im_start|>");
        assert_eq!(config.chat_markers.end, "<|im_end|>");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            HandlerConfig::from_json_str(r#"{"mode": "fenced_block", "fence_language": "python"}"#)
                .unwrap();
        assert_eq!(config.mode, ExtractionMode::FencedBlock);
        assert_eq!(config.fence_language.as_deref(), Some("python"));
        assert_eq!(config.max_literal_depth, DEFAULT_MAX_LITERAL_DEPTH);
        assert_eq!(config.stop_token_ids, vec![151643, 151644, 151645]);
    }

    #[test]
    fn test_invalid_json_config() {
        assert!(matches!(
            HandlerConfig::from_json_str(r#"{"mode": "sideways"}"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            HandlerConfig::from_json_str(r#"{"max_scan_depth": 0}"#),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_missing_config_file() {
        let err = HandlerConfig::from_file("/nonexistent/handler.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_extraction_mode_from_str() {
        assert_eq!(
            "fenced".parse::<ExtractionMode>().unwrap(),
            ExtractionMode::FencedBlock
        );
        assert_eq!(
            "Full-Text".parse::<ExtractionMode>().unwrap(),
            ExtractionMode::FullText
        );
        assert!("other".parse::<ExtractionMode>().is_err());
    }

    #[test]
    fn test_pythonic_options() {
        let config = HandlerConfig {
            mode: ExtractionMode::FencedBlock,
            max_scan_depth: 32,
            ..HandlerConfig::default()
        };
        let options = config.pythonic_options();
        assert_eq!(options.mode, ExtractionMode::FencedBlock);
        assert_eq!(options.max_scan_depth, 32);
        assert_eq!(options.fence_language, None);
    }
}
