use super::*;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &HandlerConfig) -> ConfigResult<()> {
        Self::validate_depths(config)?;
        Self::validate_fence_language(config.fence_language.as_deref())?;
        Self::validate_markers(&config.chat_markers)?;
        Ok(())
    }

    fn validate_depths(config: &HandlerConfig) -> ConfigResult<()> {
        if config.max_literal_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_literal_depth".to_string(),
                value: config.max_literal_depth.to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        if config.max_scan_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_scan_depth".to_string(),
                value: config.max_scan_depth.to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    fn validate_fence_language(language: Option<&str>) -> ConfigResult<()> {
        let Some(language) = language else {
            return Ok(());
        };

        if language.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "fence_language".to_string(),
                value: String::new(),
                reason: "Must not be empty; omit it to accept any block".to_string(),
            });
        }

        // Same character class the fence regex accepts for the tag
        let valid = language
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '.' | '#' | '-'));
        if !valid {
            return Err(ConfigError::InvalidValue {
                field: "fence_language".to_string(),
                value: language.to_string(),
                reason: "Contains characters not allowed in a code fence tag".to_string(),
            });
        }

        Ok(())
    }

    fn validate_markers(markers: &ChatMarkers) -> ConfigResult<()> {
        if markers.start.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "chat_markers.start".to_string(),
            });
        }

        if markers.end.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "chat_markers.end".to_string(),
            });
        }

        if markers.start == markers.end {
            return Err(ConfigError::ValidationFailed {
                reason: "Chat start and end markers must differ".to_string(),
            });
        }

        Ok(())
    }
}
