//! Link list parsing.

/// Splits `text` into links, one per line.
///
/// Surrounding whitespace is trimmed; blank lines and lines starting with `#`
/// are skipped. Order and duplicates are preserved.
///
/// # Examples
///
/// ```
/// use linkmeta_core::input::parse_links;
///
/// let links = parse_links("# campaign A\nhttps://bit.ly/a\n\n  https://bit.ly/b  \n");
/// assert_eq!(links, vec!["https://bit.ly/a", "https://bit.ly/b"]);
/// ```
#[must_use]
pub fn parse_links(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
