//! End-to-end run: resolve → extract → classify → fetch metadata.

use indicatif::ProgressBar;
use thiserror::Error;
use tracing::{info, instrument};

use crate::cache::{CacheError, LinkCache};
use crate::classify::{ClassifiedIdentifiers, IdType, classify_identifiers};
use crate::config::PipelineConfig;
use crate::extract::{ExtractError, IdentifierExtractor};
use crate::resolver::{RedirectResolver, resolve_links};
use crate::warehouse::{MetadataError, MetadataRecord, MetadataSource, Warehouse, fetch_metadata_for};

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Reading or writing the link cache failed
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The identifier pattern did not compile
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Connecting to or querying the warehouse failed
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Identifiers were found but there is nowhere to look them up
    #[error(
        "{identifiers} identifier(s) extracted but no warehouse is configured\n  Suggestion: Pass --warehouse or set warehouse_url in the config file"
    )]
    WarehouseNotConfigured {
        /// Identifiers awaiting lookup
        identifiers: usize,
    },
}

/// Stage counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Links supplied by the caller
    pub input_links: usize,
    /// Links with a resolved URL (cached or fetched)
    pub resolved: usize,
    /// Resolved links that yielded an identifier
    pub extracted: usize,
    /// Joined metadata records produced
    pub records: usize,
}

/// Records and stage counts produced by [`run`].
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    /// ASIN-matched records followed by ISBN-13-matched records
    pub records: Vec<MetadataRecord>,
    /// Stage counts
    pub stats: PipelineStats,
}

/// Runs the whole pipeline over `links`.
///
/// The cache at `config.cache_path` is loaded before resolution and written
/// back right after it. The warehouse is only contacted when at least one
/// identifier was classified; its connection is closed before returning,
/// whether the lookups succeeded or not.
///
/// # Errors
///
/// Returns [`PipelineError`] for cache I/O failures, an invalid identifier
/// pattern, a missing warehouse URL, or any warehouse failure. Links that
/// fail to resolve, match, or join are dropped without an error.
#[instrument(skip_all, fields(link_count = links.len()))]
pub async fn run(
    links: &[String],
    config: &PipelineConfig,
    resolver: &dyn RedirectResolver,
    progress: &ProgressBar,
) -> Result<PipelineOutput, PipelineError> {
    let extractor = IdentifierExtractor::new(&config.id_pattern)?;
    let mut stats = PipelineStats {
        input_links: links.len(),
        ..PipelineStats::default()
    };
    info!(count = stats.input_links, "Number of input links");

    let mut cache = LinkCache::load(&config.cache_path)?;
    let resolved = resolve_links(links, &mut cache, resolver, progress).await?;
    stats.resolved = resolved.len();
    info!(count = stats.resolved, "Valid resolved links");

    let extracted = extractor.extract(&resolved);
    stats.extracted = extracted.len();
    info!(count = stats.extracted, "Number of ISBNs/ASINs");

    let classified = classify_identifiers(extracted);
    if classified.is_empty() {
        info!(count = 0, "Number of records");
        return Ok(PipelineOutput {
            records: Vec::new(),
            stats,
        });
    }

    let Some(url) = config.warehouse_url.as_deref() else {
        return Err(PipelineError::WarehouseNotConfigured {
            identifiers: classified.len(),
        });
    };

    let warehouse = Warehouse::connect(url).await?;
    let fetched = fetch_all(&warehouse, &config.query_template, &classified).await;
    warehouse.close().await;
    let records = fetched?;

    stats.records = records.len();
    info!(count = stats.records, "Number of records");
    Ok(PipelineOutput { records, stats })
}

/// Fetches each non-empty group in [`IdType::ALL`] order and concatenates the results.
///
/// # Errors
///
/// Returns the first [`MetadataError`] encountered.
pub async fn fetch_all(
    source: &dyn MetadataSource,
    template: &str,
    classified: &ClassifiedIdentifiers,
) -> Result<Vec<MetadataRecord>, MetadataError> {
    let mut records = Vec::new();
    for id_type in IdType::ALL {
        let group = classified.group(id_type);
        if group.is_empty() {
            continue;
        }
        records.extend(fetch_metadata_for(source, template, group, id_type).await?);
    }
    Ok(records)
}
