//! Error types for link resolution.
//!
//! Messages follow the What/Why/Fix pattern used across the project.

use thiserror::Error;

/// Errors that can occur while resolving a link.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The request did not complete within the configured timeout
    #[error(
        "timed out resolving '{link}' after {timeout_secs}s\n  Suggestion: Check connectivity or raise resolve_timeout_secs"
    )]
    Timeout {
        /// The link being resolved
        link: String,
        /// Configured request timeout
        timeout_secs: u64,
    },

    /// The request failed before a response was received
    #[error("resolution failed for '{link}': {reason}\n  Suggestion: {suggestion}")]
    RequestFailed {
        /// The link being resolved
        link: String,
        /// Why the request failed
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {reason}")]
    ClientBuild {
        /// Why construction failed
        reason: String,
    },
}

impl ResolveError {
    /// Creates a `Timeout` error.
    #[must_use]
    pub fn timeout(link: &str, timeout_secs: u64) -> Self {
        Self::Timeout {
            link: link.to_string(),
            timeout_secs,
        }
    }

    /// Creates a `RequestFailed` error.
    #[must_use]
    pub fn request_failed(link: &str, reason: &str) -> Self {
        let suggestion = if reason.contains("redirect") {
            "Check for circular redirects or raise max_redirects"
        } else {
            "Check that the link is a valid http(s) URL and the host is reachable"
        };
        Self::RequestFailed {
            link: link.to_string(),
            reason: reason.to_string(),
            suggestion: suggestion.to_string(),
        }
    }

    /// Creates a `ClientBuild` error.
    #[must_use]
    pub fn client_build(reason: &str) -> Self {
        Self::ClientBuild {
            reason: reason.to_string(),
        }
    }

    /// The link this error refers to, when there is one.
    #[must_use]
    pub fn link(&self) -> Option<&str> {
        match self {
            Self::Timeout { link, .. } | Self::RequestFailed { link, .. } => Some(link),
            Self::ClientBuild { .. } => None,
        }
    }
}
