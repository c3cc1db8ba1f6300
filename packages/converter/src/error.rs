//! Error types for the converter.
//!
//! Fatal problems are `ConverterError` values. Problems that only cost a
//! single line or value are collected as [`Diagnostic`]s on the parsed file
//! and never abort a conversion.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Collection;

/// Main error type for the converter library.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// Source file name does not follow `{collection}{volume}.txt`.
    #[error("Invalid source file name: '{}'. Expected llhb|llsb|llsr followed by a volume number and .txt (e.g., llhb041.txt)", .0.display())]
    InvalidFileName(PathBuf),

    /// Collection identifier is not one of the known collections.
    #[error("Unknown collection: '{0}'. Expected one of llhb, llsb, llsr")]
    UnknownCollection(String),

    /// A field's data pattern is not a valid regular expression fragment.
    #[error("Invalid pattern for field '{field}' in collection {collection}: {source}")]
    InvalidPattern {
        collection: Collection,
        field: String,
        #[source]
        source: regex::Error,
    },

    /// A field's data pattern would add capture groups of its own.
    #[error("Pattern for field '{field}' in collection {collection} must not contain capture groups")]
    CaptureGroupInPattern { collection: Collection, field: String },

    /// A date value is not exactly eight digits.
    #[error("Invalid date format: '{0}'. Expected YYYYMMDD (e.g., 18340105)")]
    InvalidDateFormat(String),

    /// An additional-page row appeared before any document was started.
    #[error("Line {line}: page row for image '{image}' has no preceding document")]
    OrphanContinuation { line: usize, image: String },

    /// The record number cannot be read from an image name.
    #[error("Line {line}: cannot derive a record number from image name '{image}'")]
    InvalidImageName { line: usize, image: String },

    /// A numeric field holds something other than a number.
    #[error("Line {line}: field '{field}' is not a number: '{value}'")]
    InvalidNumber {
        line: usize,
        field: String,
        value: String,
    },

    /// Converting a particular source file failed.
    #[error("Failed to convert {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<ConverterError>,
    },

    /// Some files of a batch failed to convert.
    #[error("{failed} of {total} files failed to convert")]
    BatchFailed { failed: usize, total: usize },

    /// Invalid converter or schema configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error.
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration could not be read.
    #[error("YAML parsing failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Result type alias for converter operations.
pub type Result<T> = std::result::Result<T, ConverterError>;

/// A recoverable problem found while parsing a source file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    /// The line did not match its collection's pattern and was dropped.
    #[error("Line {line}: malformed record skipped: {content}")]
    MalformedLine { line: usize, content: String },

    /// A date failed calendar validation and was kept unvalidated.
    #[error("Line {line}: invalid calendar date '{raw}', kept as {fallback}")]
    InvalidCalendarDate {
        line: usize,
        raw: String,
        fallback: String,
    },

    /// The line matched but a value could not be converted, so it was dropped.
    #[error("Line {line}: record skipped: {reason}")]
    UnparseableRecord { line: usize, reason: String },
}

impl Diagnostic {
    /// Line number (1-based) the diagnostic refers to.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::MalformedLine { line, .. }
            | Self::InvalidCalendarDate { line, .. }
            | Self::UnparseableRecord { line, .. } => *line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConverterError::InvalidFileName(PathBuf::from("source/foo.txt"));
        assert!(err.to_string().contains("source/foo.txt"));
        assert!(err.to_string().contains("llhb041.txt"));
    }

    #[test]
    fn test_orphan_continuation_display() {
        let err = ConverterError::OrphanContinuation {
            line: 1,
            image: "00010002.tif".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Line 1: page row for image '00010002.tif' has no preceding document"
        );
    }

    #[test]
    fn test_diagnostic_line() {
        let diagnostic = Diagnostic::InvalidCalendarDate {
            line: 7,
            raw: "19990231".to_string(),
            fallback: "1999-02-31".to_string(),
        };
        assert_eq!(diagnostic.line(), 7);
        assert_eq!(
            diagnostic.to_string(),
            "Line 7: invalid calendar date '19990231', kept as 1999-02-31"
        );
    }
}
