use super::{ChatMarkers, ConfigResult, ExtractionMode, HandlerConfig};

/// Builder for HandlerConfig that wraps the config itself
#[derive(Debug, Clone, Default)]
pub struct HandlerConfigBuilder {
    config: HandlerConfig,
}

impl HandlerConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder from an existing configuration (takes ownership)
    pub fn from_config(config: HandlerConfig) -> Self {
        Self { config }
    }

    pub fn mode(mut self, mode: ExtractionMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Only look inside the first fenced code block
    pub fn fenced_block(mut self) -> Self {
        self.config.mode = ExtractionMode::FencedBlock;
        self
    }

    pub fn fence_language(mut self, language: impl Into<String>) -> Self {
        self.config.fence_language = Some(language.into());
        self
    }

    pub fn max_literal_depth(mut self, depth: usize) -> Self {
        self.config.max_literal_depth = depth;
        self
    }

    pub fn max_scan_depth(mut self, depth: usize) -> Self {
        self.config.max_scan_depth = depth;
        self
    }

    pub fn stop_token_ids(mut self, ids: Vec<u32>) -> Self {
        self.config.stop_token_ids = ids;
        self
    }

    pub fn skip_special_tokens(mut self, skip: bool) -> Self {
        self.config.skip_special_tokens = skip;
        self
    }

    pub fn chat_markers(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.config.chat_markers = ChatMarkers {
            start: start.into(),
            end: end.into(),
        };
        self
    }

    /// Build the HandlerConfig with validation
    pub fn build(self) -> ConfigResult<HandlerConfig> {
        self.build_with_validation(true)
    }

    /// Build the HandlerConfig without validation
    pub fn build_unchecked(self) -> HandlerConfig {
        self.into()
    }

    /// Build with optional validation
    pub fn build_with_validation(self, validate: bool) -> ConfigResult<HandlerConfig> {
        let config: HandlerConfig = self.into();
        if validate {
            config.validate()?;
        }
        Ok(config)
    }
}

impl From<HandlerConfigBuilder> for HandlerConfig {
    fn from(builder: HandlerConfigBuilder) -> Self {
        builder.config
    }
}

impl HandlerConfig {
    /// Create a builder for HandlerConfig
    pub fn builder() -> HandlerConfigBuilder {
        HandlerConfigBuilder::new()
    }

    /// Create a builder from this configuration
    pub fn to_builder(&self) -> HandlerConfigBuilder {
        HandlerConfigBuilder::from_config(self.clone())
    }
}
