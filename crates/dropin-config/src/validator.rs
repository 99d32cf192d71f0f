//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::{Config, TypeStyle};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Convert the first error, if any, into a `ConfigError`.
    pub fn into_error(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_markers(config, &mut result);
        Self::validate_timing(config, &mut result);
        Self::validate_highlight(config, &mut result);
        Self::validate_labels(config, &mut result);

        if config.storage.path.trim().is_empty() {
            result.add_error(ValidationError::new(
                "storage.path",
                "Storage path cannot be empty",
            ));
        }

        Ok(result)
    }

    fn validate_markers(config: &Config, result: &mut ValidationResult) {
        let markers = &config.markers;

        if markers.block_attribute.trim().is_empty() {
            result.add_error(ValidationError::new(
                "markers.block_attribute",
                "Block attribute cannot be empty",
            ));
        }

        if markers.slot_attributes.is_empty() {
            result.add_error(ValidationError::new(
                "markers.slot_attributes",
                "At least one slot attribute is required",
            ));
        }

        for (index, attribute) in markers.slot_attributes.iter().enumerate() {
            if attribute.trim().is_empty() {
                result.add_error(ValidationError::new(
                    format!("markers.slot_attributes[{}]", index),
                    "Slot attribute cannot be empty",
                ));
            } else if *attribute == markers.block_attribute {
                result.add_error(ValidationError::new(
                    format!("markers.slot_attributes[{}]", index),
                    "Slot attribute must differ from the block attribute",
                ));
            }
        }

        if markers.unnamed_block == markers.standalone_group_name {
            result.add_warning(ValidationWarning::new(
                "markers.standalone_group_name",
                "Standalone group shares its name with unnamed blocks",
            ));
        }
    }

    fn validate_timing(config: &Config, result: &mut ValidationResult) {
        let timing = &config.timing;

        if timing.nav_poll_ms == 0 {
            result.add_error(ValidationError::new(
                "timing.nav_poll_ms",
                "nav_poll_ms must be greater than 0",
            ));
        }

        if timing.debounce_ms == 0 {
            result.add_warning(ValidationWarning::new(
                "timing.debounce_ms",
                "debounce_ms is 0, every mutation batch will reload the structure",
            ));
        }

        if timing.smooth_scroll_ms < timing.scroll_settle_ms {
            result.add_warning(ValidationWarning::new(
                "timing.smooth_scroll_ms",
                "smooth_scroll_ms is shorter than scroll_settle_ms",
            ));
        }
    }

    fn validate_highlight(config: &Config, result: &mut ValidationResult) {
        Self::validate_type_style("highlight.block", &config.highlight.block, result);
        Self::validate_type_style("highlight.slot", &config.highlight.slot, result);

        for (path, value) in [
            ("highlight.z_index", &config.highlight.z_index),
            ("highlight.label_z_index", &config.highlight.label_z_index),
        ] {
            if value.parse::<i64>().is_err() {
                result.add_error(ValidationError::new(path, "z-index must be an integer"));
            }
        }
    }

    fn validate_type_style(prefix: &str, style: &TypeStyle, result: &mut ValidationResult) {
        if style.label_background.trim().is_empty() {
            result.add_error(ValidationError::new(
                format!("{}.label_background", prefix),
                "Label background cannot be empty",
            ));
        }
        if style.border.trim().is_empty() && style.outline.trim().is_empty() {
            result.add_warning(ValidationWarning::new(
                prefix,
                "Neither border nor outline is set, highlights may be invisible",
            ));
        }
    }

    fn validate_labels(config: &Config, result: &mut ValidationResult) {
        let labels = &config.labels;

        for (path, value) in [
            ("labels.gap", labels.gap),
            ("labels.label_buffer", labels.label_buffer),
            ("labels.side_margin", labels.side_margin),
            ("labels.viewport_margin", labels.viewport_margin),
            ("labels.offscreen_tolerance", labels.offscreen_tolerance),
            ("labels.padding_x", labels.padding_x),
        ] {
            if !value.is_finite() || value < 0.0 {
                result.add_error(ValidationError::new(
                    path,
                    "Value must be a finite, non-negative number",
                ));
            }
        }

        for (path, value) in [
            ("labels.char_width", labels.char_width),
            ("labels.label_height", labels.label_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                result.add_error(ValidationError::new(path, "Value must be positive"));
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
