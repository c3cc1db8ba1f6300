//! JSON writer: one object per grouped document.

use std::path::{Path, PathBuf};

use super::write_atomic;
use crate::config::JSON_DIR;
use crate::error::Result;
use crate::grouping::Document;
use crate::types::SourceFile;

/// Generate a pretty-printed JSON array of documents.
pub fn generate_json(documents: &[Document]) -> Result<String> {
    let mut content = serde_json::to_string_pretty(documents)?;
    content.push('\n');
    Ok(content)
}

/// Save documents as `{output_base}/json/{collection}{volume:03}.json`.
///
/// # Returns
/// Path to the saved file
pub fn save_json(documents: &[Document], source: &SourceFile, output_base: &Path) -> Result<PathBuf> {
    let content = generate_json(documents)?;
    write_atomic(
        &output_base.join(JSON_DIR),
        &format!("{}.json", source.stem()),
        content.as_bytes(),
    )
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::{json, Value};

    use super::*;
    use crate::grouping::{DocumentValue, Page};
    use crate::types::Collection;

    fn document() -> Document {
        let mut fields = BTreeMap::new();
        fields.insert("congress".to_string(), DocumentValue::Integer(Some(7)));
        fields.insert("session".to_string(), DocumentValue::Integer(None));
        fields.insert(
            "dates".to_string(),
            DocumentValue::List(vec!["1802-03-04".to_string()]),
        );
        fields.insert(
            "description".to_string(),
            DocumentValue::Text("A bill.".to_string()),
        );
        Document {
            fields,
            pages: vec![Page {
                image: "00010001.tif".to_string(),
                large_image_url: "http://memory.loc.gov/ll/llsb/007/0000/00010001.tif".to_string(),
                link: "http://memory.loc.gov/cgi-bin/ampage?collId=llsb&fileName=007/llsb007.db&recNum=0"
                    .to_string(),
                page: None,
                record_number: 1,
                small_image_url: "http://memory.loc.gov/ll/llsb/007/0000/00010001.gif".to_string(),
            }],
        }
    }

    #[test]
    fn test_generate_json() {
        let content = generate_json(&[document()]).unwrap();
        assert!(content.starts_with("[\n  {\n"));
        assert!(content.ends_with("]\n"));

        let value: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(
            value,
            json!([{
                "congress": 7,
                "dates": ["1802-03-04"],
                "description": "A bill.",
                "pages": [{
                    "image": "00010001.tif",
                    "large_image_url": "http://memory.loc.gov/ll/llsb/007/0000/00010001.tif",
                    "link": "http://memory.loc.gov/cgi-bin/ampage?collId=llsb&fileName=007/llsb007.db&recNum=0",
                    "page": null,
                    "record_number": 1,
                    "small_image_url": "http://memory.loc.gov/ll/llsb/007/0000/00010001.gif"
                }],
                "session": null
            }])
        );
    }

    #[test]
    fn test_generate_json_empty() {
        assert_eq!(generate_json(&[]).unwrap(), "[]\n");
    }

    #[test]
    fn test_save_json() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = SourceFile {
            path: PathBuf::from("source/llsb007.txt"),
            collection: Collection::Llsb,
            volume: 7,
        };
        let path = save_json(&[document()], &source, temp_dir.path()).unwrap();
        assert_eq!(path, temp_dir.path().join("json").join("llsb007.json"));

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("\"record_number\": 1"));
    }
}
