//! Link resolution: turning short/affiliate links into their final URLs.
//!
//! # Architecture
//!
//! - [`RedirectResolver`] - Async trait that performs a single lookup
//! - [`HttpRedirectResolver`] - reqwest implementation (HEAD + redirect following)
//! - [`resolve_links`] - Cache-aware resolution loop over an ordered batch
//!
//! # Example
//!
//! ```no_run
//! use indicatif::ProgressBar;
//! use linkmeta_core::LinkCache;
//! use linkmeta_core::resolver::{HttpRedirectResolver, resolve_links};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = HttpRedirectResolver::with_defaults()?;
//! let mut cache = LinkCache::load(Path::new("link_lookup.json"))?;
//! let links = vec!["https://bit.ly/abc".to_string()];
//!
//! let resolved = resolve_links(&links, &mut cache, &resolver, &ProgressBar::hidden()).await?;
//! for pair in resolved {
//!     println!("{} -> {}", pair.link, pair.resolved_url);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod http_client;

pub use error::ResolveError;
pub use http_client::{DEFAULT_MAX_REDIRECTS, DEFAULT_RESOLVE_TIMEOUT, HttpRedirectResolver};

use async_trait::async_trait;
use indicatif::ProgressBar;
use serde::Serialize;
use tracing::{debug, info};

use crate::cache::{CacheError, LinkCache};

/// Performs one link → final URL lookup.
#[async_trait]
pub trait RedirectResolver: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Resolves `link` to the URL it finally lands on.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when no response could be obtained.
    async fn resolve(&self, link: &str) -> Result<String, ResolveError>;
}

/// An input link paired with the URL it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLink {
    /// The link as given by the caller
    pub link: String,
    /// Final URL after redirects
    pub resolved_url: String,
}

impl ResolvedLink {
    /// Creates a new pair.
    #[must_use]
    pub fn new(link: impl Into<String>, resolved_url: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            resolved_url: resolved_url.into(),
        }
    }
}

/// Resolves every link in order, consulting and then updating `cache`.
///
/// Cached links are reused without a request. Uncached links are looked up
/// with `resolver`; links whose lookup fails are dropped and never cached.
/// Once the batch is done the cache (old and new entries) is written back to
/// disk. `progress` is advanced once per input link.
///
/// The returned pairs keep input order; duplicates in `links` yield duplicate
/// pairs.
///
/// # Errors
///
/// Returns [`CacheError`] if the cache cannot be persisted. Resolution
/// failures are never surfaced.
#[tracing::instrument(skip_all, fields(link_count = links.len(), resolver = resolver.name()))]
pub async fn resolve_links(
    links: &[String],
    cache: &mut LinkCache,
    resolver: &dyn RedirectResolver,
    progress: &ProgressBar,
) -> Result<Vec<ResolvedLink>, CacheError> {
    let mut resolved = Vec::with_capacity(links.len());
    let mut fetched = 0_usize;
    let mut dropped = 0_usize;

    for link in links {
        if let Some(cached) = cache.get(link) {
            resolved.push(ResolvedLink::new(link.as_str(), cached));
        } else {
            match resolver.resolve(link).await {
                Ok(url) => {
                    cache.insert(link.as_str(), url.as_str());
                    resolved.push(ResolvedLink::new(link.as_str(), url));
                    fetched += 1;
                }
                Err(error) => {
                    debug!(link = %link, error = %error, "dropping unresolvable link");
                    dropped += 1;
                }
            }
        }
        progress.inc(1);
    }

    cache.save()?;

    info!(
        resolved = resolved.len(),
        from_cache = resolved.len() - fetched,
        fetched,
        dropped,
        "Link resolution finished"
    );
    Ok(resolved)
}
