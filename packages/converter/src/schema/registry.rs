//! Registry of collection schemas.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ConverterError, Result};
use crate::types::{Collection, CollectionSchema};

/// Built-in schema table.
pub const DEFAULT_SCHEMAS_YAML: &str = include_str!("schemas.yaml");

/// Read-only lookup of the field layout of each collection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchemaRegistry {
    collections: BTreeMap<Collection, CollectionSchema>,
}

impl SchemaRegistry {
    /// Load the built-in schema table.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(DEFAULT_SCHEMAS_YAML)
    }

    /// Parse a schema table from a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let registry: Self = serde_yaml_ng::from_str(yaml)?;
        for (collection, schema) in &registry.collections {
            validate_schema(*collection, schema)?;
        }
        Ok(registry)
    }

    /// Load a schema table from a file, or the built-in table if `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_yaml(&fs::read_to_string(path)?),
            None => Self::builtin(),
        }
    }

    /// Get the schema of a collection.
    pub fn schema(&self, collection: Collection) -> Result<&CollectionSchema> {
        self.collections
            .get(&collection)
            .ok_or_else(|| ConverterError::UnknownCollection(collection.to_string()))
    }

    /// Get the schema of a collection by its identifier.
    ///
    /// # Examples
    /// ```
    /// use lawmaking_converter::schema::SchemaRegistry;
    ///
    /// let registry = SchemaRegistry::builtin().unwrap();
    /// let schema = registry.schema_for("llsb").unwrap();
    /// assert_eq!(schema.fields[0].name, "collection");
    /// assert!(registry.schema_for("llzz").is_err());
    /// ```
    pub fn schema_for(&self, identifier: &str) -> Result<&CollectionSchema> {
        self.schema(identifier.parse()?)
    }

    /// Collections with a schema.
    pub fn collections(&self) -> impl Iterator<Item = Collection> + '_ {
        self.collections.keys().copied()
    }
}

fn validate_schema(collection: Collection, schema: &CollectionSchema) -> Result<()> {
    if schema.fields.is_empty() {
        return Err(ConverterError::Config(format!(
            "collection {collection} has no fields"
        )));
    }

    let mut seen = HashSet::new();
    for field in &schema.fields {
        if !seen.insert(field.name.as_str()) {
            return Err(ConverterError::Config(format!(
                "collection {collection} declares field '{}' twice",
                field.name
            )));
        }
    }

    Ok(())
}
