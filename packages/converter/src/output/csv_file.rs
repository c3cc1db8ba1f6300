//! CSV writer: one row per parsed line, columns in schema order.

use std::io;
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::write_atomic;
use crate::config::CSV_DIR;
use crate::error::Result;
use crate::types::{CollectionSchema, ParsedRow, SourceFile};

/// Generate UTF-8 CSV for parsed rows.
///
/// Every field is quoted; multi-valued fields are joined with their separator.
pub fn generate_csv(rows: &[ParsedRow], schema: &CollectionSchema) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    for row in rows {
        writer.write_record(schema.fields.iter().map(|field| {
            row.get(&field.name)
                .map(|value| value.joined(field.separator))
                .unwrap_or_default()
        }))?;
    }

    writer
        .into_inner()
        .map_err(|e| io::Error::new(e.error().kind(), e.to_string()).into())
}

/// Save parsed rows as `{output_base}/csv/{collection}{volume:03}.csv`.
///
/// # Returns
/// Path to the saved file
pub fn save_csv(
    rows: &[ParsedRow],
    schema: &CollectionSchema,
    source: &SourceFile,
    output_base: &Path,
) -> Result<PathBuf> {
    let content = generate_csv(rows, schema)?;
    write_atomic(
        &output_base.join(CSV_DIR),
        &format!("{}.csv", source.stem()),
        &content,
    )
}
