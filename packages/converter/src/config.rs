//! Configuration constants, settings and validation functions for the converter.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ConverterError, Result};
use crate::types::{Collection, SourceFile};

/// Default directory holding the source metadata files.
pub const DEFAULT_SOURCE_DIR: &str = "source";

/// Output subdirectory for CSV files.
pub const CSV_DIR: &str = "csv";

/// Output subdirectory for JSON files.
pub const JSON_DIR: &str = "json";

/// Built-in converter settings.
pub const DEFAULT_SETTINGS_YAML: &str = include_str!("converter.yaml");

/// Source file name pattern: collection identifier, volume number, `.txt`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SOURCE_FILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(llhb|llsb|llsr)(\d+)\.txt$").expect("valid regex"));

/// Parse a source file path into its collection and volume.
///
/// # Arguments
/// * `path` - Path to a file in the source directory
///
/// # Returns
/// * `Ok(SourceFile)` if the file name follows `{collection}{volume}.txt`
/// * `Err(ConverterError::InvalidFileName)` otherwise
///
/// # Examples
/// ```
/// use lawmaking_converter::config::parse_source_file_name;
/// use lawmaking_converter::Collection;
///
/// let file = parse_source_file_name("source/llhb041.txt").unwrap();
/// assert_eq!(file.collection, Collection::Llhb);
/// assert_eq!(file.volume, 41);
/// assert!(parse_source_file_name("source/notes.txt").is_err());
/// ```
pub fn parse_source_file_name(path: impl AsRef<Path>) -> Result<SourceFile> {
    let path = path.as_ref();
    let invalid = || ConverterError::InvalidFileName(path.to_path_buf());

    let name = path.file_name().and_then(|n| n.to_str()).ok_or_else(invalid)?;
    let caps = SOURCE_FILE_PATTERN.captures(name).ok_or_else(invalid)?;

    let (Some(collection), Some(volume)) = (caps.get(1), caps.get(2)) else {
        return Err(invalid());
    };
    let collection = collection.as_str().parse::<Collection>()?;
    let volume = volume.as_str().parse::<u32>().map_err(|_| invalid())?;

    Ok(SourceFile {
        path: path.to_path_buf(),
        collection,
        volume,
    })
}

/// One exception to the default record number width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDigitsException {
    pub collection: Collection,
    pub volume: u32,
    pub digits: usize,
}

/// How many leading digits of an image name form its record number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDigits {
    /// Width used by every volume without an exception.
    pub default: usize,

    /// Volumes numbered with a different width.
    #[serde(default)]
    pub exceptions: Vec<RecordDigitsException>,
}

impl RecordDigits {
    /// Record number width for a volume.
    ///
    /// # Examples
    /// ```
    /// use lawmaking_converter::config::Settings;
    /// use lawmaking_converter::Collection;
    ///
    /// let settings = Settings::builtin().unwrap();
    /// assert_eq!(settings.record_digits.digits_for(Collection::Llhb, 41), 5);
    /// assert_eq!(settings.record_digits.digits_for(Collection::Llhb, 10), 4);
    /// ```
    #[must_use]
    pub fn digits_for(&self, collection: Collection, volume: u32) -> usize {
        self.exceptions
            .iter()
            .find(|e| e.collection == collection && e.volume == volume)
            .map_or(self.default, |e| e.digits)
    }
}

/// Converter settings, read from YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Page viewer endpoint of the American Memory site.
    pub page_viewer_url: String,

    /// Base URL of the scanned page images.
    pub image_base_url: String,

    /// Extension of the full size images.
    pub large_image_extension: String,

    /// Extension of the thumbnail images.
    pub small_image_extension: String,

    /// Record number width table.
    pub record_digits: RecordDigits,
}

impl Settings {
    /// Load the built-in settings.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(DEFAULT_SETTINGS_YAML)
    }

    /// Parse settings from a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let settings: Self = serde_yaml_ng::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file, or the built-in settings if `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_yaml(&fs::read_to_string(path)?),
            None => Self::builtin(),
        }
    }

    fn validate(&self) -> Result<()> {
        let widths = std::iter::once(self.record_digits.default)
            .chain(self.record_digits.exceptions.iter().map(|e| e.digits));
        for digits in widths {
            // The image directory keeps all but the last two record digits.
            if !(2..=8).contains(&digits) {
                return Err(ConverterError::Config(format!(
                    "record digits must be between 2 and 8, got {digits}"
                )));
            }
        }
        if !self.large_image_extension.starts_with('.')
            || !self.small_image_extension.starts_with('.')
        {
            return Err(ConverterError::Config(
                "image extensions must start with '.'".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the page viewer URL for a record.
    ///
    /// The viewer numbers records from zero.
    #[must_use]
    pub fn page_link(&self, collection: Collection, volume: u32, record_number: u32) -> String {
        format!(
            "{}?collId={collection}&fileName={volume:03}/{collection}{volume:03}.db&recNum={}",
            self.page_viewer_url,
            i64::from(record_number) - 1
        )
    }

    /// Build the full size image URL for a page.
    ///
    /// Images are grouped in directories of one hundred records.
    #[must_use]
    pub fn large_image_url(
        &self,
        collection: Collection,
        volume: u32,
        image: &str,
        digits: usize,
    ) -> String {
        let prefix: String = image.chars().take(digits.saturating_sub(2)).collect();
        format!(
            "{}/{collection}/{volume:03}/{prefix}00/{image}",
            self.image_base_url
        )
    }

    /// Derive the thumbnail URL from a full size image URL.
    ///
    /// Only the trailing extension is swapped. A URL without the full size
    /// extension is returned unchanged.
    #[must_use]
    pub fn small_image_url(&self, large_image_url: &str) -> String {
        match large_image_url.strip_suffix(&self.large_image_extension) {
            Some(stem) => format!("{stem}{}", self.small_image_extension),
            None => large_image_url.to_string(),
        }
    }
}
