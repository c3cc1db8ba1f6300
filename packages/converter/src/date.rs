//! Datestamp normalization.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{ConverterError, Result};

/// Datestamp pattern: YYYYMMDD.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATESTAMP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{4})([0-9]{2})([0-9]{2})$").expect("valid regex"));

/// A normalized datestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedDate {
    /// A valid calendar date.
    Calendar(NaiveDate),

    /// Digits that do not form a calendar date, dash-joined as written.
    Unchecked(String),
}

impl NormalizedDate {
    /// ISO-8601 rendering, `YYYY-MM-DD`.
    #[must_use]
    pub fn to_iso(&self) -> String {
        match self {
            Self::Calendar(date) => date.format("%Y-%m-%d").to_string(),
            Self::Unchecked(s) => s.clone(),
        }
    }

    /// Whether the date passed calendar validation.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Calendar(_))
    }
}

/// Normalize an eight digit `YYYYMMDD` datestamp.
///
/// Digits that do not form a calendar date (the source data has the odd
/// February 31st) are not an error: they come back as
/// [`NormalizedDate::Unchecked`] so the caller can report them.
///
/// # Returns
/// * `Ok(NormalizedDate)` for any eight digit input
/// * `Err(ConverterError::InvalidDateFormat)` otherwise
///
/// # Examples
/// ```
/// use lawmaking_converter::date::normalize_date;
///
/// assert_eq!(normalize_date("18340105").unwrap().to_iso(), "1834-01-05");
/// assert_eq!(normalize_date("19990231").unwrap().to_iso(), "1999-02-31");
/// assert!(!normalize_date("19990231").unwrap().is_valid());
/// assert!(normalize_date("1834015").is_err());
/// ```
pub fn normalize_date(raw: &str) -> Result<NormalizedDate> {
    let invalid = || ConverterError::InvalidDateFormat(raw.to_string());
    let caps = DATESTAMP_PATTERN.captures(raw).ok_or_else(invalid)?;
    let (Some(y), Some(m), Some(d)) = (caps.get(1), caps.get(2), caps.get(3)) else {
        return Err(invalid());
    };
    let (y, m, d) = (y.as_str(), m.as_str(), d.as_str());

    let date = match (y.parse::<i32>(), m.parse::<u32>(), d.parse::<u32>()) {
        (Ok(year), Ok(month), Ok(day)) => NaiveDate::from_ymd_opt(year, month, day),
        _ => None,
    };

    Ok(match date {
        Some(date) => NormalizedDate::Calendar(date),
        None => NormalizedDate::Unchecked(format!("{y}-{m}-{d}")),
    })
}
