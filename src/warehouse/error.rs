//! Error types for warehouse metadata lookups.

use thiserror::Error;

use crate::classify::UnknownIdType;

/// Errors raised while fetching metadata from the warehouse.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The caller asked for an identifier type that has no warehouse column
    #[error(transparent)]
    UnknownIdType(#[from] UnknownIdType),

    /// The query template lacks a required substitution token
    #[error(
        "query template is missing the {token} token\n  Suggestion: Include {token} in query_template or remove it to use the default"
    )]
    InvalidTemplate {
        /// The missing token
        token: &'static str,
    },

    /// Could not open the warehouse connection
    #[error("failed to connect to warehouse '{url}': {source}")]
    Connection {
        /// Connection URL that was used
        url: String,
        /// Driver error
        source: sqlx::Error,
    },

    /// The metadata query failed to execute or decode
    #[error("warehouse query failed: {0}")]
    Query(#[source] sqlx::Error),
}
