//! reqwest-backed redirect resolver.
//!
//! Issues a single HEAD request per link and lets reqwest follow redirects.
//! Any response counts as a resolution, whatever its status code: only the
//! URL of the last hop is kept.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::redirect::Policy;
use tracing::trace;

use crate::user_agent;

use super::{RedirectResolver, ResolveError};

/// Default connect/read timeout for each hop.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of redirects followed before giving up.
pub const DEFAULT_MAX_REDIRECTS: usize = 30;

/// Resolves links by following HTTP redirects.
#[derive(Debug, Clone)]
pub struct HttpRedirectResolver {
    client: Client,
    timeout: Duration,
}

impl HttpRedirectResolver {
    /// Builds a resolver with the given per-hop timeout and redirect limit.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::ClientBuild`] when the HTTP client cannot be
    /// constructed (e.g. TLS backend initialization fails).
    pub fn new(timeout: Duration, max_redirects: usize) -> Result<Self, ResolveError> {
        // Applied per socket operation, so each redirect hop gets the full budget.
        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .redirect(Policy::limited(max_redirects))
            .user_agent(user_agent::default_resolver_user_agent())
            .gzip(true)
            .build()
            .map_err(|error| ResolveError::client_build(&error.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// Builds a resolver with [`DEFAULT_RESOLVE_TIMEOUT`] and [`DEFAULT_MAX_REDIRECTS`].
    ///
    /// # Errors
    ///
    /// See [`HttpRedirectResolver::new`].
    pub fn with_defaults() -> Result<Self, ResolveError> {
        Self::new(DEFAULT_RESOLVE_TIMEOUT, DEFAULT_MAX_REDIRECTS)
    }
}

#[async_trait]
impl RedirectResolver for HttpRedirectResolver {
    fn name(&self) -> &'static str {
        "http"
    }

    #[tracing::instrument(skip(self), fields(resolver = "http"))]
    async fn resolve(&self, link: &str) -> Result<String, ResolveError> {
        let response = self.client.head(link).send().await.map_err(|error| {
            if error.is_timeout() {
                ResolveError::timeout(link, self.timeout.as_secs())
            } else {
                ResolveError::request_failed(link, &error.to_string())
            }
        })?;

        let resolved = response.url().to_string();
        trace!(status = %response.status(), resolved = %resolved, "link resolved");
        Ok(resolved)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_with_defaults_builds_client() {
        let resolver = HttpRedirectResolver::with_defaults().unwrap();
        assert_eq!(resolver.timeout, DEFAULT_RESOLVE_TIMEOUT);
        assert_eq!(resolver.name(), "http");
    }

    #[tokio::test]
    async fn test_resolve_invalid_url_is_request_failure() {
        let resolver = HttpRedirectResolver::with_defaults().unwrap();
        let err = resolver.resolve("not a url").await.unwrap_err();
        assert!(matches!(err, ResolveError::RequestFailed { .. }));
        assert_eq!(err.link(), Some("not a url"));
    }

    #[tokio::test]
    async fn test_resolve_unsupported_scheme_is_request_failure() {
        let resolver = HttpRedirectResolver::with_defaults().unwrap();
        let result = resolver.resolve("ftp://files.example.com/book").await;
        assert!(matches!(result, Err(ResolveError::RequestFailed { .. })));
    }
}
