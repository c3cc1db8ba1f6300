//! Legacy text decoding.
//!
//! The source files are written in IBM code page 850. This module is the
//! only place that deals with the raw encoding; everything downstream of it
//! works on `String`s.

use oem_cp::code_table::DECODING_TABLE_CP850;
use oem_cp::decode_string_complete_table;

/// Decode code page 850 bytes into text.
///
/// Every byte has a mapping in code page 850, so decoding never fails.
///
/// # Examples
/// ```
/// use lawmaking_converter::decode::decode_cp850;
///
/// assert_eq!(decode_cp850(b"Fran\x87ois"), "François");
/// ```
#[must_use]
pub fn decode_cp850(bytes: &[u8]) -> String {
    decode_string_complete_table(bytes, &DECODING_TABLE_CP850)
}
