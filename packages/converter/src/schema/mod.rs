//! Field schemas of the metadata collections.

mod registry;

pub use registry::{SchemaRegistry, DEFAULT_SCHEMAS_YAML};
