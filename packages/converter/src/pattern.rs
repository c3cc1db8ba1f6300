//! Whole-line pattern compiler.
//!
//! The metadata files cannot be read with a CSV reader: descriptions contain
//! unescaped quotes. Instead each collection's schema is turned into one
//! regular expression that knows what every column may contain, so column
//! boundaries are found by content rather than by quoting.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use regex::bytes::Regex;

use crate::error::{ConverterError, Result};
use crate::schema::SchemaRegistry;
use crate::types::{Collection, CollectionSchema, FieldSpec};

/// Compiled whole-line matcher of one collection.
#[derive(Debug, Clone)]
pub struct CompiledMatcher {
    collection: Collection,
    schema: CollectionSchema,
    regex: Regex,
}

impl CompiledMatcher {
    /// Collection this matcher was built for.
    #[must_use]
    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// Schema this matcher was built from.
    #[must_use]
    pub fn schema(&self) -> &CollectionSchema {
        &self.schema
    }

    /// The whole-line pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Match a raw line and return one capture per field, in schema order.
    ///
    /// A `None` capture means the field was serialized as `""`.
    #[must_use]
    pub fn match_line<'h>(&self, line: &'h [u8]) -> Option<Vec<Option<&'h [u8]>>> {
        let caps = self.regex.captures(line)?;
        Some(
            (1..=self.schema.fields.len())
                .map(|i| caps.get(i).map(|m| m.as_bytes()))
                .collect(),
        )
    }
}

/// Build the pattern for one field's data, without the surrounding quotes.
///
/// Multi-valued fields repeat the data pattern between separators.
///
/// # Examples
/// ```
/// use lawmaking_converter::pattern::field_pattern;
/// use lawmaking_converter::types::FieldSpec;
///
/// assert_eq!(field_pattern(&FieldSpec::new("volume", "[0-9]{3}")), "(?:[0-9]{3})");
/// assert_eq!(
///     field_pattern(&FieldSpec::multi("dates", ',', "[0-9]{8}")),
///     "(?:[0-9]{8})(?:,(?:[0-9]{8}))*"
/// );
/// ```
#[must_use]
pub fn field_pattern(field: &FieldSpec) -> String {
    let data = format!("(?:{})", field.pattern);
    match field.separator {
        Some(separator) => {
            let separator = regex::escape(&separator.to_string());
            format!("{data}(?:{separator}{data})*")
        }
        None => data,
    }
}

/// Check that a field's data pattern is a usable fragment.
fn validate_fragment(collection: Collection, field: &FieldSpec) -> Result<()> {
    let fragment = Regex::new(&format!("(?-u){}", field.pattern)).map_err(|source| {
        ConverterError::InvalidPattern {
            collection,
            field: field.name.clone(),
            source,
        }
    })?;

    // Group 0 is the whole match; any other group would shift field captures.
    if fragment.captures_len() != 1 {
        return Err(ConverterError::CaptureGroupInPattern {
            collection,
            field: field.name.clone(),
        });
    }

    Ok(())
}

/// Compile a collection schema into a whole-line matcher.
///
/// Every field becomes `"(?:(FIELD)|)"`: the field data captured between
/// quotes, or a bare `""`. Fields are joined with commas. The pattern is
/// anchored at the start of the line only and matches raw bytes, so legacy
/// 8-bit text passes through undecoded.
pub fn compile_matcher(collection: Collection, schema: &CollectionSchema) -> Result<CompiledMatcher> {
    let mut pieces = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        validate_fragment(collection, field)?;
        pieces.push(format!("\"(?:({})|)\"", field_pattern(field)));
    }

    let pattern = format!("(?-u)^{}", pieces.join(","));
    let regex = Regex::new(&pattern).map_err(|source| ConverterError::InvalidPattern {
        collection,
        field: "*".to_string(),
        source,
    })?;

    tracing::debug!(%collection, pattern = regex.as_str(), "compiled line pattern");

    Ok(CompiledMatcher {
        collection,
        schema: schema.clone(),
        regex,
    })
}

/// Lazily compiled matchers, one per collection.
///
/// Matchers are immutable once built and can be shared between threads.
#[derive(Debug)]
pub struct MatcherCache {
    registry: SchemaRegistry,
    compiled: RwLock<HashMap<Collection, Arc<CompiledMatcher>>>,
}

impl MatcherCache {
    /// Create an empty cache over a schema registry.
    #[must_use]
    pub fn new(registry: SchemaRegistry) -> Self {
        Self {
            registry,
            compiled: RwLock::new(HashMap::new()),
        }
    }

    /// Get the matcher of a collection, compiling it on first use.
    pub fn get(&self, collection: Collection) -> Result<Arc<CompiledMatcher>> {
        if let Some(matcher) = self
            .compiled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&collection)
        {
            return Ok(Arc::clone(matcher));
        }

        let schema = self.registry.schema(collection)?;
        let matcher = Arc::new(compile_matcher(collection, schema)?);

        let mut compiled = self
            .compiled
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        // Another thread may have won the race; keep the first matcher.
        Ok(Arc::clone(compiled.entry(collection).or_insert(matcher)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llhb_matcher() -> CompiledMatcher {
        let registry = SchemaRegistry::builtin().unwrap();
        compile_matcher(Collection::Llhb, registry.schema(Collection::Llhb).unwrap()).unwrap()
    }

    fn text<'a>(caps: &'a [Option<&[u8]>], index: usize) -> Option<&'a str> {
        caps[index].map(|c| std::str::from_utf8(c).unwrap())
    }

    #[test]
    fn test_one_capture_per_field() {
        let matcher = llhb_matcher();
        let line = br#""llhb","041","00450003.tif","023","001","h","","H.R. 1,H.R. 2","18340105,18340106","A bill for the relief of John Smith.","Committee of Claims""#;
        let caps = matcher.match_line(line).unwrap();

        assert_eq!(caps.len(), 11);
        assert_eq!(text(&caps, 0), Some("llhb"));
        assert_eq!(text(&caps, 2), Some("00450003.tif"));
        assert_eq!(text(&caps, 6), Some(""));
        assert_eq!(text(&caps, 7), Some("H.R. 1,H.R. 2"));
        assert_eq!(text(&caps, 8), Some("18340105,18340106"));
        assert_eq!(text(&caps, 9), Some("A bill for the relief of John Smith."));
        assert_eq!(text(&caps, 10), Some("Committee of Claims"));
    }

    #[test]
    fn test_unescaped_quotes_in_description() {
        let matcher = llhb_matcher();
        let line = br#""llhb","041","00450003.tif","023","001","h","","H.R. 5","18340105","A bill to amend the act "for the relief of" certain persons.","""#;
        let caps = matcher.match_line(line).unwrap();

        assert_eq!(
            text(&caps, 9),
            Some(r#"A bill to amend the act "for the relief of" certain persons."#)
        );
    }

    #[test]
    fn test_rejects_wrong_collection_code() {
        let matcher = llhb_matcher();
        let line = br#""llsb","041","00450003.tif","023","001","h","","","18340105","x","""#;
        assert!(matcher.match_line(line).is_none());
    }

    #[test]
    fn test_rejects_truncated_line() {
        let matcher = llhb_matcher();
        let line = br#""llhb","041","00450003.tif","023","001","h","","H.R. 5","183401"#;
        assert!(matcher.match_line(line).is_none());
    }

    #[test]
    fn test_matches_legacy_bytes() {
        let matcher = llhb_matcher();
        let line = b"\"llhb\",\"041\",\"00450003.tif\",\"023\",\"001\",\"h\",\"\",\"\",\"18340105\",\"Petition of Fran\x87ois Vigo.\",\"\"";
        let caps = matcher.match_line(line).unwrap();
        assert_eq!(caps[9], Some(&b"Petition of Fran\x87ois Vigo."[..]));
    }

    #[test]
    fn test_invalid_fragment() {
        let schema = CollectionSchema {
            fields: vec![FieldSpec::new("volume", "[0-9")],
        };
        let err = compile_matcher(Collection::Llsr, &schema).unwrap_err();
        assert!(
            matches!(&err, ConverterError::InvalidPattern { field, .. } if field == "volume"),
            "got {err:?}"
        );
    }

    #[test]
    fn test_capture_group_in_fragment() {
        let schema = CollectionSchema {
            fields: vec![FieldSpec::new("volume", "([0-9]{3})")],
        };
        let err = compile_matcher(Collection::Llsr, &schema).unwrap_err();
        assert!(matches!(err, ConverterError::CaptureGroupInPattern { .. }));
    }

    #[test]
    fn test_separator_is_escaped() {
        let field = FieldSpec::multi("items", '.', "[a-z]+");
        assert_eq!(field_pattern(&field), r"(?:[a-z]+)(?:\.(?:[a-z]+))*");
    }

    #[test]
    fn test_cache_memoizes() {
        let cache = MatcherCache::new(SchemaRegistry::builtin().unwrap());
        let first = cache.get(Collection::Llsb).unwrap();
        let second = cache.get(Collection::Llsb).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.collection(), Collection::Llsb);
        assert!(first.as_str().starts_with("(?-u)^\"(?:((?:llsb))|)\""));
    }
}
