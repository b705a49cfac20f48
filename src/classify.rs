//! Identifier classification: splitting extracted identifiers into ASIN and
//! ISBN-13 groups.
//!
//! Classification is purely by length. No checksum or structure validation
//! happens beyond what the extraction pattern already enforced.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace};

use crate::extract::ExtractedIdentifier;

/// Length of an ASIN.
pub const ASIN_LEN: usize = 10;

/// Length of an ISBN-13.
pub const ISBN13_LEN: usize = 13;

/// Kind of product identifier, named after its warehouse column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IdType {
    /// Amazon Standard Identification Number
    #[serde(rename = "ASIN")]
    Asin,
    /// 13-digit ISBN
    #[serde(rename = "ISBN_13")]
    Isbn13,
}

impl IdType {
    /// Every recognized identifier type, in fetch order.
    pub const ALL: [Self; 2] = [Self::Asin, Self::Isbn13];

    /// Warehouse column holding identifiers of this type.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::Asin => "ASIN",
            Self::Isbn13 => "ISBN_13",
        }
    }

    /// Classifies an identifier by its length.
    #[must_use]
    pub fn from_len(len: usize) -> Option<Self> {
        match len {
            ASIN_LEN => Some(Self::Asin),
            ISBN13_LEN => Some(Self::Isbn13),
            _ => None,
        }
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A type tag that names neither `ASIN` nor `ISBN_13`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "unrecognized identifier type '{tag}'\n  Suggestion: Use one of {}",
    IdType::ALL.map(IdType::column).join(", ")
)]
pub struct UnknownIdType {
    /// The rejected tag
    pub tag: String,
}

impl FromStr for IdType {
    type Err = UnknownIdType;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        IdType::ALL
            .into_iter()
            .find(|id_type| id_type.column() == tag)
            .ok_or_else(|| UnknownIdType {
                tag: tag.to_string(),
            })
    }
}

/// Extracted identifiers partitioned by type, each group in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedIdentifiers {
    /// 10-character identifiers
    pub asin: Vec<ExtractedIdentifier>,
    /// 13-character identifiers
    pub isbn: Vec<ExtractedIdentifier>,
}

impl ClassifiedIdentifiers {
    /// The group holding identifiers of `id_type`.
    #[must_use]
    pub fn group(&self, id_type: IdType) -> &[ExtractedIdentifier] {
        match id_type {
            IdType::Asin => &self.asin,
            IdType::Isbn13 => &self.isbn,
        }
    }

    /// Total identifiers across both groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.asin.len() + self.isbn.len()
    }

    /// Returns `true` when both groups are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.asin.is_empty() && self.isbn.is_empty()
    }
}

/// Splits identifiers into ASIN (length 10) and ISBN-13 (length 13) groups.
///
/// Length is counted in characters, not bytes. Identifiers of any other
/// length are dropped.
#[must_use]
pub fn classify_identifiers(extracted: Vec<ExtractedIdentifier>) -> ClassifiedIdentifiers {
    let total = extracted.len();
    let mut classified = ClassifiedIdentifiers::default();

    for item in extracted {
        match IdType::from_len(item.identifier.chars().count()) {
            Some(IdType::Asin) => classified.asin.push(item),
            Some(IdType::Isbn13) => classified.isbn.push(item),
            None => {
                trace!(link = %item.link, identifier = %item.identifier, "identifier has unclassifiable length");
            }
        }
    }

    debug!(
        asin = classified.asin.len(),
        isbn = classified.isbn.len(),
        dropped = total - classified.len(),
        "identifiers classified"
    );
    classified
}
