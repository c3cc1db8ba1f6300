//! Century of Lawmaking converter - Turn historical bill and resolution
//! metadata into CSV and JSON.
//!
//! The Library of Congress "A Century of Lawmaking" collections ship their
//! metadata as code page 850 text files that look like CSV but cannot be
//! read as CSV: descriptions contain unescaped quotes and several columns
//! hold separator-joined lists. This crate parses those files with a
//! pattern built from each collection's field schema and writes a flat CSV
//! file and a grouped JSON file per volume.
//!
//! # Example
//!
//! ```
//! use lawmaking_converter::config::parse_source_file_name;
//! use lawmaking_converter::Converter;
//!
//! let converter = Converter::builtin().unwrap();
//! let source = parse_source_file_name("source/llsb003.txt").unwrap();
//! let line = br#""llsb","003","00010001.tif","002","001","s","","S. 1","17920105","A bill.","""#;
//! let parsed = converter.parse_bytes(&source, line).unwrap();
//! assert_eq!(parsed.rows[0].text("congress"), "2");
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Constants, file naming and converter settings
//! - [`types`]: Core data types (Collection, FieldSpec, ParsedRow, etc.)
//! - [`error`]: Error types, diagnostics and Result alias
//! - [`schema`]: Field schema registry
//! - [`pattern`]: Whole-line pattern compiler and matcher cache
//! - [`decode`]: Code page 850 decoding
//! - [`date`]: Datestamp normalization
//! - [`parser`]: Line parser
//! - [`grouping`]: Page grouping and derived URLs for JSON
//! - [`output`]: CSV and JSON writers
//! - [`converter`]: Batch conversion service
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod converter;
pub mod date;
pub mod decode;
pub mod error;
pub mod grouping;
pub mod output;
pub mod parser;
pub mod pattern;
pub mod schema;
pub mod types;

// Re-export commonly used items
pub use config::{parse_source_file_name, Settings};
pub use converter::{discover_sources, BatchReport, Converter, FileReport};
pub use error::{ConverterError, Diagnostic, Result};
pub use grouping::{Document, Page};
pub use types::{Collection, CollectionSchema, FieldSpec, FieldValue, ParsedRow, SourceFile};
