//! External data parser boundary.
//!
//! Site and page data files are YAML mappings. Parsing is a capability
//! behind [`DataParser`] so the pipeline only depends on "string in,
//! mapping or located error out". The default implementation uses
//! serde_yaml.

use serde_yaml::{Mapping, Value};

/// Site-wide data loaded once per build from `<source>/site.yaml`.
pub type SiteData = Mapping;

/// A located data parse failure.
#[derive(Debug, Clone)]
pub struct DataError {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

/// Capability interface for the data file parser.
pub trait DataParser {
    /// Parse one document into a mapping. Empty input is an empty mapping.
    fn parse(&self, source: &str) -> Result<Mapping, DataError>;
}

// ============================================================================
// serde_yaml adapter
// ============================================================================

#[derive(Debug, Default)]
pub struct YamlParser;

impl DataParser for YamlParser {
    fn parse(&self, source: &str) -> Result<Mapping, DataError> {
        let value: Value = serde_yaml::from_str(source).map_err(|err| {
            let location = err.location();
            DataError {
                line: location.as_ref().map_or(1, |l| l.line() as u32),
                column: location.as_ref().map_or(1, |l| l.column() as u32),
                message: err.to_string(),
            }
        })?;

        match value {
            Value::Mapping(mapping) => Ok(mapping),
            // Empty files and bare comments parse as null
            Value::Null => Ok(Mapping::new()),
            other => Err(DataError {
                line: 1,
                column: 1,
                message: format!(
                    "expected a mapping at the top level, found {}",
                    value_kind(&other)
                ),
            }),
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

// ============================================================================
// Tests
// ============================================================================
