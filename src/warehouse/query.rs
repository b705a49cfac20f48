//! Metadata query construction.
//!
//! Templates carry two tokens: `{id_column}` is replaced by the identifier
//! column name and `{id_list}` by a parenthesized list of bind placeholders.
//! Identifier values are always bound, never spliced into the SQL text.

use crate::classify::IdType;

use super::MetadataError;

/// Token replaced by the identifier column (`ASIN` or `ISBN_13`).
pub const ID_COLUMN_TOKEN: &str = "{id_column}";

/// Token replaced by `(?, ?, ...)`, one placeholder per identifier.
pub const ID_LIST_TOKEN: &str = "{id_list}";

/// Upper bound on identifiers bound into a single statement.
/// Larger groups are split across several statements.
pub const MAX_IDS_PER_QUERY: usize = 500;

/// Query used when none is configured.
pub const DEFAULT_QUERY_TEMPLATE: &str = r#"SELECT DISTINCT
    ISBN_13,
    ASIN,
    TITLE AS "title",
    AUTHOR AS "author",
    ORIGINAL_PUBLICATION_DATE AS "pub_date",
    NIELSEN_CATEGORY AS "genre",
    NIELSEN_SUB_CATEGORY AS "subgenre",
    DIVISION AS "division"
FROM TITLE_INFO_DIM
WHERE DIVISION NOT IN ('PRH Other', 'PRH Corporate')
AND {id_column} IN {id_list}"#;

/// Checks that `template` carries both substitution tokens.
///
/// # Errors
///
/// Returns [`MetadataError::InvalidTemplate`] naming the first missing token.
pub fn validate_template(template: &str) -> Result<(), MetadataError> {
    for token in [ID_COLUMN_TOKEN, ID_LIST_TOKEN] {
        if !template.contains(token) {
            return Err(MetadataError::InvalidTemplate { token });
        }
    }
    Ok(())
}

/// Renders `template` for `id_count` identifiers of `id_type`.
///
/// # Errors
///
/// Returns [`MetadataError::InvalidTemplate`] if a token is missing.
pub fn build_metadata_query(
    template: &str,
    id_type: IdType,
    id_count: usize,
) -> Result<String, MetadataError> {
    validate_template(template)?;
    let placeholders = vec!["?"; id_count].join(", ");
    Ok(template
        .replace(ID_COLUMN_TOKEN, id_type.column())
        .replace(ID_LIST_TOKEN, &format!("({placeholders})")))
}
