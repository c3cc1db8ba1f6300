//! Line parser for the metadata files.
//!
//! Each physical line is matched against its collection's compiled pattern.
//! The captured bytes are decoded, trimmed, split into sub-values and
//! normalized. Lines that do not match are dropped with a diagnostic so a
//! single damaged line never costs the rest of the file.

use crate::date::{normalize_date, NormalizedDate};
use crate::decode::decode_cp850;
use crate::error::{Diagnostic, Result};
use crate::pattern::CompiledMatcher;
use crate::types::{FieldSpec, FieldValue, ParsedRow};

/// Multi-valued field holding `YYYYMMDD` datestamps.
pub const DATES_FIELD: &str = "dates";

/// Fields whose values are canonicalized as integers.
pub const NUMERIC_FIELDS: [&str; 3] = ["volume", "congress", "session"];

/// Rows and diagnostics parsed from one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFile {
    /// Parsed rows in file order.
    pub rows: Vec<ParsedRow>,

    /// Non-fatal problems, in file order.
    pub diagnostics: Vec<Diagnostic>,

    /// Number of blank lines skipped.
    pub blank_lines: usize,
}

/// Parse the full contents of a source file.
pub fn parse_source(matcher: &CompiledMatcher, contents: &[u8]) -> ParsedFile {
    let mut parsed = ParsedFile::default();

    for (index, raw) in contents.split(|&b| b == b'\n').enumerate() {
        let line = index + 1;

        if raw.trim_ascii().is_empty() {
            tracing::debug!(line, "blank line skipped");
            parsed.blank_lines += 1;
            continue;
        }

        let diagnostics_before = parsed.diagnostics.len();
        if let Some(row) = parse_line(matcher, line, raw, &mut parsed.diagnostics) {
            parsed.rows.push(row);
        }
        for diagnostic in &parsed.diagnostics[diagnostics_before..] {
            tracing::warn!(collection = %matcher.collection(), "{diagnostic}");
        }
    }

    tracing::debug!(
        collection = %matcher.collection(),
        rows = parsed.rows.len(),
        blank_lines = parsed.blank_lines,
        "parsed source"
    );

    parsed
}

/// Parse one physical line.
///
/// Returns `None` if the line is blank, does not match the pattern, or
/// contains a value that cannot be converted. Problems are appended to
/// `diagnostics`.
pub fn parse_line(
    matcher: &CompiledMatcher,
    line: usize,
    raw: &[u8],
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<ParsedRow> {
    if raw.trim_ascii().is_empty() {
        return None;
    }

    let Some(captures) = matcher.match_line(raw) else {
        diagnostics.push(Diagnostic::MalformedLine {
            line,
            content: decode_cp850(raw.trim_ascii_end()),
        });
        return None;
    };

    let mut row = ParsedRow::new(line);
    let mut date_warnings = Vec::new();

    for (field, capture) in matcher.schema().fields.iter().zip(captures) {
        match parse_field(field, capture, line, &mut date_warnings) {
            Ok(value) => row.insert(field.name.clone(), value),
            Err(e) => {
                diagnostics.push(Diagnostic::UnparseableRecord {
                    line,
                    reason: format!("{}: {e}", field.name),
                });
                return None;
            }
        }
    }

    diagnostics.append(&mut date_warnings);
    Some(row)
}

/// Convert one field capture into its value.
fn parse_field(
    field: &FieldSpec,
    capture: Option<&[u8]>,
    line: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<FieldValue> {
    let Some(bytes) = capture else {
        return Ok(empty_value(field));
    };

    let decoded = decode_cp850(bytes);
    let text = decoded.trim();

    let Some(separator) = field.separator else {
        if NUMERIC_FIELDS.contains(&field.name.as_str()) {
            return Ok(FieldValue::Text(canonical_number(text)));
        }
        return Ok(FieldValue::Text(text.to_string()));
    };

    if text.is_empty() {
        return Ok(FieldValue::List(Vec::new()));
    }

    let items = text.split(separator).map(str::trim);
    if field.name != DATES_FIELD {
        return Ok(FieldValue::List(items.map(String::from).collect()));
    }

    let mut dates = Vec::new();
    for item in items {
        let date = normalize_date(item)?;
        if let NormalizedDate::Unchecked(fallback) = &date {
            diagnostics.push(Diagnostic::InvalidCalendarDate {
                line,
                raw: item.to_string(),
                fallback: fallback.clone(),
            });
        }
        dates.push(date.to_iso());
    }
    Ok(FieldValue::List(dates))
}

/// Value of a field serialized as `""`.
fn empty_value(field: &FieldSpec) -> FieldValue {
    if field.is_multi_valued() {
        FieldValue::List(Vec::new())
    } else {
        FieldValue::Text(String::new())
    }
}

/// Strip leading zeros from a numeric value, e.g. `007` becomes `7`.
///
/// Values that are not numbers are kept as they are.
fn canonical_number(text: &str) -> String {
    text.parse::<u64>()
        .map_or_else(|_| text.to_string(), |n| n.to_string())
}
