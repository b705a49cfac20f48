//! Link metadata core library
//!
//! Resolves short/affiliate links to their final URLs, pulls an ISBN-13 or
//! ASIN out of each resolved URL, and joins those identifiers against the
//! title metadata warehouse.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`cache`] - Persistent link → resolved URL cache
//! - [`resolver`] - Redirect resolution with cache reuse
//! - [`extract`] - Identifier extraction from resolved URLs
//! - [`classify`] - ASIN / ISBN-13 partitioning
//! - [`warehouse`] - Metadata queries and the link join
//! - [`pipeline`] - End-to-end orchestration
//! - [`config`] - Layered configuration
//! - [`input`] / [`output`] - Link list parsing and result rendering

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod classify;
pub mod config;
pub mod extract;
pub mod input;
pub mod output;
pub mod pipeline;
pub mod resolver;
mod user_agent;
pub mod warehouse;

// Re-export commonly used types
pub use cache::{CacheError, LinkCache};
pub use classify::{ClassifiedIdentifiers, IdType, UnknownIdType, classify_identifiers};
pub use config::{ConfigError, PipelineConfig};
pub use extract::{ExtractError, ExtractedIdentifier, IdentifierExtractor};
pub use output::{OutputFormat, write_records};
pub use pipeline::{PipelineError, PipelineOutput, PipelineStats, run};
pub use resolver::{
    HttpRedirectResolver, RedirectResolver, ResolveError, ResolvedLink, resolve_links,
};
pub use warehouse::{
    MetadataError, MetadataRecord, MetadataRow, MetadataSource, Warehouse, fetch_metadata,
};
