//! Record enrichment and page grouping for the JSON output.
//!
//! Each physical row is one scanned page. A row without a page number starts
//! a new document; rows with a page number are further pages of the
//! document started last.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::config::Settings;
use crate::error::{ConverterError, Result};
use crate::types::{FieldValue, ParsedRow, SourceFile};

/// Page number field.
pub const PAGE_FIELD: &str = "page";

/// Image file name field.
pub const IMAGE_FIELD: &str = "image";

/// Fields written as JSON integers (or null when empty).
pub const INTEGER_FIELDS: [&str; 4] = ["congress", "session", "volume", "page"];

/// Key of the page list in a document object.
const PAGES_KEY: &str = "pages";

/// One scanned page of a document.
///
/// Fields are declared in key order so the JSON output is sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub image: String,
    pub large_image_url: String,
    pub link: String,
    pub page: Option<u32>,
    pub record_number: u32,
    pub small_image_url: String,
}

/// Value of a document-level field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DocumentValue {
    /// Numeric field, `None` when the source was empty.
    Integer(Option<u32>),

    /// Single-valued text field.
    Text(String),

    /// Multi-valued field.
    List(Vec<String>),
}

/// One bill or resolution, with all of its pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Document-level fields by name.
    pub fields: BTreeMap<String, DocumentValue>,

    /// Pages in file order. Never empty.
    pub pages: Vec<Page>,
}

impl Document {
    /// Get a document-level field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&DocumentValue> {
        self.fields.get(name)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        let mut pages_written = false;
        for (key, value) in &self.fields {
            if !pages_written && key.as_str() > PAGES_KEY {
                map.serialize_entry(PAGES_KEY, &self.pages)?;
                pages_written = true;
            }
            map.serialize_entry(key, value)?;
        }
        if !pages_written {
            map.serialize_entry(PAGES_KEY, &self.pages)?;
        }
        map.end()
    }
}

/// Read the record number from the leading digits of an image name.
///
/// # Examples
/// ```
/// use lawmaking_converter::grouping::record_number;
///
/// assert_eq!(record_number("00450003.tif", 5), Some(450));
/// assert_eq!(record_number("00450003.tif", 4), Some(45));
/// assert_eq!(record_number("tif", 4), None);
/// ```
#[must_use]
pub fn record_number(image: &str, digits: usize) -> Option<u32> {
    let prefix = image.get(..digits)?;
    if !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    prefix.parse().ok()
}

/// Parse an integer field; empty text is `None`.
fn integer_value(row: &ParsedRow, field: &str) -> Result<Option<u32>> {
    let text = row.text(field);
    if text.is_empty() {
        return Ok(None);
    }
    text.parse()
        .map(Some)
        .map_err(|_| ConverterError::InvalidNumber {
            line: row.line,
            field: field.to_string(),
            value: text.to_string(),
        })
}

/// Build the page entry of a row, with its derived URLs.
pub fn page_entry(row: &ParsedRow, source: &SourceFile, settings: &Settings) -> Result<Page> {
    let image = row.text(IMAGE_FIELD);
    let digits = settings
        .record_digits
        .digits_for(source.collection, source.volume);
    let record_number =
        record_number(image, digits).ok_or_else(|| ConverterError::InvalidImageName {
            line: row.line,
            image: image.to_string(),
        })?;

    let large_image_url = settings.large_image_url(source.collection, source.volume, image, digits);

    Ok(Page {
        image: image.to_string(),
        link: settings.page_link(source.collection, source.volume, record_number),
        small_image_url: settings.small_image_url(&large_image_url),
        large_image_url,
        page: integer_value(row, PAGE_FIELD)?,
        record_number,
    })
}

/// Document-level fields of a row: everything except the page fields.
fn document_fields(row: &ParsedRow) -> Result<BTreeMap<String, DocumentValue>> {
    let mut fields = BTreeMap::new();
    for (name, value) in &row.values {
        if name == PAGE_FIELD || name == IMAGE_FIELD {
            continue;
        }
        let value = if INTEGER_FIELDS.contains(&name.as_str()) {
            DocumentValue::Integer(integer_value(row, name)?)
        } else {
            match value {
                FieldValue::Text(s) => DocumentValue::Text(s.clone()),
                FieldValue::List(items) => DocumentValue::List(items.clone()),
            }
        };
        fields.insert(name.clone(), value);
    }
    Ok(fields)
}

/// Group the rows of one source file into documents.
///
/// # Errors
/// `ConverterError::OrphanContinuation` if a page row comes before any
/// document has been started, and `InvalidImageName`/`InvalidNumber` if a
/// row's derived values cannot be computed.
pub fn group_rows(
    rows: &[ParsedRow],
    source: &SourceFile,
    settings: &Settings,
) -> Result<Vec<Document>> {
    rows.iter().try_fold(Vec::new(), |mut documents: Vec<Document>, row| {
        let page = page_entry(row, source, settings)?;

        if page.page.is_none() {
            documents.push(Document {
                fields: document_fields(row)?,
                pages: vec![page],
            });
        } else {
            let current =
                documents
                    .last_mut()
                    .ok_or_else(|| ConverterError::OrphanContinuation {
                        line: row.line,
                        image: page.image.clone(),
                    })?;
            current.pages.push(page);
        }

        Ok(documents)
    })
}
