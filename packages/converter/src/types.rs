//! Core data types for the converter.
//!
//! These types describe the Century of Lawmaking collections, the field
//! layout of their metadata files, and the rows parsed out of them.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConverterError;

/// Record families of the Century of Lawmaking metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// House bills and resolutions.
    Llhb,

    /// Senate bills.
    Llsb,

    /// Senate resolutions.
    Llsr,
}

impl Collection {
    /// All known collections.
    pub const ALL: [Collection; 3] = [Self::Llhb, Self::Llsb, Self::Llsr];

    /// Get the identifier used in file names and URLs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Llhb => "llhb",
            Self::Llsb => "llsb",
            Self::Llsr => "llsr",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = ConverterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "llhb" => Ok(Self::Llhb),
            "llsb" => Ok(Self::Llsb),
            "llsr" => Ok(Self::Llsr),
            other => Err(ConverterError::UnknownCollection(other.to_string())),
        }
    }
}

/// One column of a collection's metadata file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name, used as CSV column and JSON key.
    pub name: String,

    /// Separator between sub-values of a multi-valued field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<char>,

    /// Regular expression fragment matching the field's data.
    pub pattern: String,
}

impl FieldSpec {
    /// Create a single-valued field.
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            separator: None,
            pattern: pattern.into(),
        }
    }

    /// Create a multi-valued field split on `separator`.
    pub fn multi(name: impl Into<String>, separator: char, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            separator: Some(separator),
            pattern: pattern.into(),
        }
    }

    /// Whether this field holds a list of sub-values.
    #[must_use]
    pub fn is_multi_valued(&self) -> bool {
        self.separator.is_some()
    }
}

/// Ordered field layout of one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSchema {
    /// Fields in physical column order.
    pub fields: Vec<FieldSpec>,
}

impl CollectionSchema {
    /// Look up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Value of one field in a parsed row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Single-valued field.
    Text(String),

    /// Multi-valued field, in source order.
    List(Vec<String>),
}

impl FieldValue {
    /// Value as text, if single-valued.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::List(_) => None,
        }
    }

    /// Value as a list, if multi-valued.
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::Text(_) => None,
            Self::List(items) => Some(items),
        }
    }

    /// Render the value as one string, joining sub-values with `separator`.
    #[must_use]
    pub fn joined(&self, separator: Option<char>) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::List(items) => {
                let sep = separator.map(String::from).unwrap_or_default();
                items.join(&sep)
            }
        }
    }
}

/// One physical line of a metadata file after parsing.
///
/// Every field declared in the collection schema is present.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedRow {
    /// Line number (1-based) in the source file.
    pub line: usize,

    /// Field values by name.
    pub values: BTreeMap<String, FieldValue>,
}

impl ParsedRow {
    /// Create an empty row for the given line.
    #[must_use]
    pub fn new(line: usize) -> Self {
        Self {
            line,
            values: BTreeMap::new(),
        }
    }

    /// Get a field value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Get a single-valued field, or an empty string if absent.
    #[must_use]
    pub fn text(&self, field: &str) -> &str {
        self.get(field).and_then(FieldValue::as_text).unwrap_or("")
    }

    /// Get a multi-valued field, or an empty slice if absent.
    #[must_use]
    pub fn list(&self, field: &str) -> &[String] {
        self.get(field).and_then(FieldValue::as_list).unwrap_or(&[])
    }

    /// Set a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        self.values.insert(field.into(), value);
    }
}

/// A source metadata file, identified by collection and volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path to the source file.
    pub path: PathBuf,

    /// Collection the file belongs to.
    pub collection: Collection,

    /// Volume number.
    pub volume: u32,
}

impl SourceFile {
    /// Output file stem, e.g. `llhb041`.
    #[must_use]
    pub fn stem(&self) -> String {
        format!("{}{:03}", self.collection, self.volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_from_str() {
        assert_eq!("llhb".parse::<Collection>().unwrap(), Collection::Llhb);
        assert_eq!("llsb".parse::<Collection>().unwrap(), Collection::Llsb);
        assert_eq!("llsr".parse::<Collection>().unwrap(), Collection::Llsr);
    }

    #[test]
    fn test_collection_from_str_unknown() {
        let err = "llxx".parse::<Collection>().unwrap_err();
        assert!(matches!(err, ConverterError::UnknownCollection(id) if id == "llxx"));
        assert!("LLHB".parse::<Collection>().is_err());
    }

    #[test]
    fn test_field_value_joined() {
        let list = FieldValue::List(vec!["H.R. 1".to_string(), "H.R. 2".to_string()]);
        assert_eq!(list.joined(Some(',')), "H.R. 1,H.R. 2");
        assert_eq!(FieldValue::List(Vec::new()).joined(Some(',')), "");
        assert_eq!(FieldValue::Text("041".to_string()).joined(None), "041");
    }

    #[test]
    fn test_parsed_row_accessors() {
        let mut row = ParsedRow::new(3);
        row.insert("image", FieldValue::Text("00010001.tif".to_string()));
        row.insert("dates", FieldValue::List(vec!["1834-01-05".to_string()]));

        assert_eq!(row.text("image"), "00010001.tif");
        assert_eq!(row.list("dates"), ["1834-01-05".to_string()]);
        assert_eq!(row.text("missing"), "");
        assert!(row.list("image").is_empty());
    }

    #[test]
    fn test_source_file_stem() {
        let file = SourceFile {
            path: PathBuf::from("source/llsr007.txt"),
            collection: Collection::Llsr,
            volume: 7,
        };
        assert_eq!(file.stem(), "llsr007");
    }
}
