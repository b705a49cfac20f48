//! ISBN-13 / ASIN extraction from resolved URLs.
//!
//! A single alternation regex is applied to each resolved URL and the leftmost
//! match is taken as the identifier. The default pattern accepts:
//!
//! - `978` followed by ten digits (ISBN-13)
//! - `B` followed by nine uppercase alphanumerics (ASIN)
//! - nine digits followed by one uppercase alphanumeric (ISBN-10 shaped ASIN)
//!
//! # Example
//!
//! ```
//! use linkmeta_core::extract::IdentifierExtractor;
//!
//! let extractor = IdentifierExtractor::with_default_pattern();
//! assert_eq!(
//!     extractor.find("http://example.com/9780143127741"),
//!     Some("9780143127741")
//! );
//! assert_eq!(extractor.find("https://example.com/about"), None);
//! ```

mod error;

pub use error::ExtractError;

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, trace};

use crate::resolver::ResolvedLink;

/// Identifier pattern used when none is configured.
pub const DEFAULT_ID_PATTERN: &str = r"(978[0-9]{10})|(B[A-Z0-9]{9})|([0-9]{9}[A-Z0-9]{1})";

#[allow(clippy::expect_used)]
static DEFAULT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(DEFAULT_ID_PATTERN).expect("default identifier regex is valid") // Static pattern, safe to panic
});

/// An input link paired with the identifier found in its resolved URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedIdentifier {
    /// The original input link
    pub link: String,
    /// ISBN-13 or ASIN candidate
    pub identifier: String,
}

impl ExtractedIdentifier {
    /// Creates a new pair.
    #[must_use]
    pub fn new(link: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            identifier: identifier.into(),
        }
    }
}

/// Compiled identifier pattern.
#[derive(Debug, Clone)]
pub struct IdentifierExtractor {
    pattern: Regex,
}

impl IdentifierExtractor {
    /// Compiles `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidPattern`] if `pattern` is not a valid regex.
    pub fn new(pattern: &str) -> Result<Self, ExtractError> {
        let pattern =
            Regex::new(pattern).map_err(|error| ExtractError::invalid_pattern(pattern, &error))?;
        Ok(Self { pattern })
    }

    /// Extractor using [`DEFAULT_ID_PATTERN`].
    #[must_use]
    pub fn with_default_pattern() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.clone(),
        }
    }

    /// Returns the leftmost identifier match in `url`.
    #[must_use]
    pub fn find<'a>(&self, url: &'a str) -> Option<&'a str> {
        self.pattern.find(url).map(|m| m.as_str())
    }

    /// Extracts one identifier per resolved link, dropping links without a match.
    ///
    /// Output order follows input order.
    #[tracing::instrument(skip_all, fields(links = resolved.len()))]
    #[must_use]
    pub fn extract(&self, resolved: &[ResolvedLink]) -> Vec<ExtractedIdentifier> {
        let extracted: Vec<ExtractedIdentifier> = resolved
            .iter()
            .filter_map(|pair| match self.find(&pair.resolved_url) {
                Some(identifier) => {
                    trace!(link = %pair.link, identifier, "identifier found");
                    Some(ExtractedIdentifier::new(pair.link.as_str(), identifier))
                }
                None => {
                    trace!(link = %pair.link, url = %pair.resolved_url, "no identifier in URL");
                    None
                }
            })
            .collect();

        debug!(
            extracted = extracted.len(),
            unmatched = resolved.len() - extracted.len(),
            "identifier extraction finished"
        );
        extracted
    }
}

impl Default for IdentifierExtractor {
    fn default() -> Self {
        Self::with_default_pattern()
    }
}
