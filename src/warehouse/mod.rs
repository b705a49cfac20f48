//! Title metadata lookups against the product warehouse.
//!
//! - [`Warehouse`] - sqlx SQLite connection (single connection, read-only)
//! - [`MetadataSource`] - data-access seam the fetcher runs against
//! - [`fetch_metadata`] - query one identifier group and join rows back to links
//!
//! # Example
//!
//! ```no_run
//! use linkmeta_core::extract::ExtractedIdentifier;
//! use linkmeta_core::warehouse::{DEFAULT_QUERY_TEMPLATE, Warehouse, fetch_metadata};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let warehouse = Warehouse::connect("sqlite:title_info.db").await?;
//! let group = vec![ExtractedIdentifier::new("http://x/1", "9780143127741")];
//! let records = fetch_metadata(&warehouse, DEFAULT_QUERY_TEMPLATE, &group, "ISBN_13").await;
//! warehouse.close().await;
//! println!("{} record(s)", records?.len());
//! # Ok(())
//! # }
//! ```

mod error;
mod query;

pub use error::MetadataError;
pub use query::{
    DEFAULT_QUERY_TEMPLATE, ID_COLUMN_TOKEN, ID_LIST_TOKEN, MAX_IDS_PER_QUERY,
    build_metadata_query, validate_template,
};

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, instrument};

use crate::classify::IdType;
use crate::extract::ExtractedIdentifier;

/// One row returned by the metadata query.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MetadataRow {
    /// ISBN-13 column
    #[sqlx(rename = "ISBN_13")]
    pub isbn_13: Option<String>,
    /// ASIN column
    #[sqlx(rename = "ASIN")]
    pub asin: Option<String>,
    /// Title
    pub title: Option<String>,
    /// Author display name
    pub author: Option<String>,
    /// Original publication date
    pub pub_date: Option<String>,
    /// Category
    pub genre: Option<String>,
    /// Sub-category
    pub subgenre: Option<String>,
    /// Publishing division
    pub division: Option<String>,
}

impl MetadataRow {
    /// Value of the identifier column for `id_type`.
    #[must_use]
    pub fn identifier(&self, id_type: IdType) -> Option<&str> {
        match id_type {
            IdType::Asin => self.asin.as_deref(),
            IdType::Isbn13 => self.isbn_13.as_deref(),
        }
    }
}

/// A warehouse row joined onto the link whose identifier matched it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataRecord {
    /// The original input link
    pub link: String,
    /// Which column the link matched on
    pub id_type: IdType,
    /// Identifier extracted from the resolved link
    pub identifier: String,
    /// ISBN-13 column
    pub isbn_13: Option<String>,
    /// ASIN column
    pub asin: Option<String>,
    /// Title
    pub title: Option<String>,
    /// Author display name
    pub author: Option<String>,
    /// Original publication date
    pub pub_date: Option<String>,
    /// Category
    pub genre: Option<String>,
    /// Sub-category
    pub subgenre: Option<String>,
    /// Publishing division
    pub division: Option<String>,
}

impl MetadataRecord {
    fn join(source: &ExtractedIdentifier, id_type: IdType, row: &MetadataRow) -> Self {
        Self {
            link: source.link.clone(),
            id_type,
            identifier: source.identifier.clone(),
            isbn_13: row.isbn_13.clone(),
            asin: row.asin.clone(),
            title: row.title.clone(),
            author: row.author.clone(),
            pub_date: row.pub_date.clone(),
            genre: row.genre.clone(),
            subgenre: row.subgenre.clone(),
            division: row.division.clone(),
        }
    }
}

/// Data-access contract for metadata queries.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Runs `sql`, binding `ids` to its placeholders in order.
    async fn query_metadata(&self, sql: &str, ids: &[&str])
    -> Result<Vec<MetadataRow>, MetadataError>;
}

/// Warehouse connection wrapper.
///
/// The pool holds a single connection: lookups run one at a time and the
/// connection is released by [`Warehouse::close`].
#[derive(Debug, Clone)]
pub struct Warehouse {
    pool: SqlitePool,
}

impl Warehouse {
    /// Opens a read-only connection to the warehouse at `url`
    /// (e.g. `sqlite:title_info.db`).
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Connection`] if the URL is invalid or the
    /// database cannot be opened.
    #[instrument]
    pub async fn connect(url: &str) -> Result<Self, MetadataError> {
        let connection_error = |source: sqlx::Error| MetadataError::Connection {
            url: url.to_string(),
            source,
        };

        let options = SqliteConnectOptions::from_str(url)
            .map_err(connection_error)?
            .read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(connection_error)?;

        debug!("warehouse connection opened");
        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    #[must_use]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Closes the connection. The `Warehouse` should not be used afterwards.
    #[instrument(skip(self))]
    pub async fn close(self) {
        self.pool.close().await;
        debug!("warehouse connection closed");
    }
}

#[async_trait]
impl MetadataSource for Warehouse {
    async fn query_metadata(
        &self,
        sql: &str,
        ids: &[&str],
    ) -> Result<Vec<MetadataRow>, MetadataError> {
        let mut query = sqlx::query_as::<_, MetadataRow>(sql);
        for id in ids {
            query = query.bind(*id);
        }
        query.fetch_all(&self.pool).await.map_err(MetadataError::Query)
    }
}

/// Fetches metadata for one identifier group, with the type given as a tag.
///
/// `tag` must be `"ASIN"` or `"ISBN_13"`; anything else fails before any
/// query runs.
///
/// # Errors
///
/// Returns [`MetadataError::UnknownIdType`] for an unrecognized tag, and
/// otherwise the errors of [`fetch_metadata_for`].
pub async fn fetch_metadata(
    source: &dyn MetadataSource,
    template: &str,
    group: &[ExtractedIdentifier],
    tag: &str,
) -> Result<Vec<MetadataRecord>, MetadataError> {
    let id_type = IdType::from_str(tag)?;
    fetch_metadata_for(source, template, group, id_type).await
}

/// Fetches metadata for one identifier group and inner-joins it onto the
/// group's links.
///
/// The filter set is the distinct identifiers of the group; the join is per
/// input pair, so duplicate links produce duplicate records and an identifier
/// matching several rows produces one record per row. Records follow the
/// group's order. Identifiers without a row produce nothing.
///
/// # Errors
///
/// Returns [`MetadataError::InvalidTemplate`] for a malformed template and
/// [`MetadataError::Query`] when the warehouse query fails.
#[instrument(skip(source, template, group), fields(group_len = group.len()))]
pub async fn fetch_metadata_for(
    source: &dyn MetadataSource,
    template: &str,
    group: &[ExtractedIdentifier],
    id_type: IdType,
) -> Result<Vec<MetadataRecord>, MetadataError> {
    validate_template(template)?;
    if group.is_empty() {
        return Ok(Vec::new());
    }

    let mut seen = HashSet::new();
    let distinct: Vec<&str> = group
        .iter()
        .map(|item| item.identifier.as_str())
        .filter(|identifier| seen.insert(*identifier))
        .collect();

    let mut rows = Vec::new();
    for chunk in distinct.chunks(MAX_IDS_PER_QUERY) {
        let sql = build_metadata_query(template, id_type, chunk.len())?;
        rows.extend(source.query_metadata(&sql, chunk).await?);
    }
    debug!(distinct = distinct.len(), rows = rows.len(), "warehouse rows fetched");

    let mut by_identifier: HashMap<&str, Vec<&MetadataRow>> = HashMap::new();
    for row in &rows {
        if let Some(identifier) = row.identifier(id_type) {
            by_identifier.entry(identifier).or_default().push(row);
        }
    }

    let records: Vec<MetadataRecord> = group
        .iter()
        .flat_map(|item| {
            by_identifier
                .get(item.identifier.as_str())
                .into_iter()
                .flatten()
                .map(move |row| MetadataRecord::join(item, id_type, row))
        })
        .collect();

    debug!(records = records.len(), "metadata joined");
    Ok(records)
}
