//! Configuration error types

use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Range validation error
    #[error("Invalid range for field '{field}': {value} not in {min}..={max}. {hint}")]
    Range {
        field: String,
        value: String,
        min: String,
        max: String,
        hint: String,
    },

    /// Cross-field or structural validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Regex that does not compile
    #[error("Invalid pattern in '{field}': {pattern} ({source})")]
    InvalidPattern {
        field: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    /// Create a range error with a hint
    pub fn range_with_hint(
        field: impl Into<String>,
        value: impl ToString,
        min: impl ToString,
        max: impl ToString,
        hint: impl Into<String>,
    ) -> Self {
        Self::Range {
            field: field.into(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
            hint: hint.into(),
        }
    }

    /// Range check for a [0, 1] score
    pub fn check_unit_interval(field: &str, value: f64) -> ConfigResult<()> {
        if (0.0..=1.0).contains(&value) {
            Ok(())
        } else {
            Err(Self::range_with_hint(
                field,
                value,
                0.0,
                1.0,
                "Confidence scores are probabilities",
            ))
        }
    }
}
