//! Rendering of joined metadata records.

use std::io::{self, Write};

use clap::ValueEnum;

use crate::warehouse::MetadataRecord;

/// Result table formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// A single pretty-printed JSON array
    #[default]
    Json,
    /// One JSON object per line
    Jsonl,
    /// Tab-separated values with a header row
    Tsv,
}

const TSV_COLUMNS: [&str; 11] = [
    "link",
    "id_type",
    "identifier",
    "isbn_13",
    "asin",
    "title",
    "author",
    "pub_date",
    "genre",
    "subgenre",
    "division",
];

/// Writes `records` to `writer` in `format`.
///
/// # Errors
///
/// Returns any I/O or encoding error raised while writing.
pub fn write_records<W: Write>(
    records: &[MetadataRecord],
    format: OutputFormat,
    mut writer: W,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, records)?;
            writeln!(writer)?;
        }
        OutputFormat::Jsonl => {
            for record in records {
                serde_json::to_writer(&mut writer, record)?;
                writeln!(writer)?;
            }
        }
        OutputFormat::Tsv => {
            writeln!(writer, "{}", TSV_COLUMNS.join("\t"))?;
            for record in records {
                writeln!(writer, "{}", tsv_row(record))?;
            }
        }
    }
    writer.flush()
}

fn tsv_row(record: &MetadataRecord) -> String {
    let optional = |value: &Option<String>| tsv_cell(value.as_deref().unwrap_or_default());
    [
        tsv_cell(&record.link),
        record.id_type.to_string(),
        tsv_cell(&record.identifier),
        optional(&record.isbn_13),
        optional(&record.asin),
        optional(&record.title),
        optional(&record.author),
        optional(&record.pub_date),
        optional(&record.genre),
        optional(&record.subgenre),
        optional(&record.division),
    ]
    .join("\t")
}

// Tabs and line breaks would split the row.
fn tsv_cell(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}
