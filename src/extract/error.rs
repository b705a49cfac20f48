//! Error types for identifier extraction.

use thiserror::Error;

/// Errors that can occur while preparing identifier extraction.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// The configured identifier pattern is not a valid regular expression
    #[error("invalid identifier pattern '{pattern}': {reason}\n  Suggestion: {suggestion}")]
    InvalidPattern {
        /// The pattern that failed to compile
        pattern: String,
        /// Compiler diagnostic
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },
}

impl ExtractError {
    /// Creates an `InvalidPattern` error from a regex compile failure.
    #[must_use]
    pub fn invalid_pattern(pattern: &str, error: &regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: error.to_string(),
            suggestion: "Fix id_pattern in the configuration or remove it to use the default"
                .to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pattern_message() {
        let compile_error = regex::Regex::new("(978[0-9]{10}").unwrap_err();
        let err = ExtractError::invalid_pattern("(978[0-9]{10}", &compile_error);
        let msg = err.to_string();
        assert!(msg.contains("(978[0-9]{10}"), "should contain pattern");
        assert!(msg.contains("id_pattern"), "suggestion should name the setting");
    }
}
