//! A declarative, read-only map from column name to type descriptor.
//!
//! Grounded on `original_source/dwork/dataschema/dataschema.py`'s
//! `DataSchema` (a class body whose `Type`-valued attributes become the
//! schema, plus an optional `names` alias map). Rust has no metaclass
//! machinery to harvest class attributes at definition time, so the
//! builder pattern stands in: `SchemaBuilder::new().column(...).alias(...)`.

use std::collections::HashMap;

use crate::error::{DpError, Result};
use crate::types::Type;

/// A finite, insertion-order-irrelevant mapping from column name to type.
///
/// Constructed once via `SchemaBuilder` and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Schema {
    attributes: HashMap<String, Type>,
}

impl Schema {
    /// Looks up the declared type for `column`.
    pub fn get(&self, column: &str) -> Result<&Type> {
        self.attributes
            .get(column)
            .ok_or_else(|| DpError::SchemaMismatch(column.to_string()))
    }

    pub fn contains(&self, column: &str) -> bool {
        self.attributes.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }
}

/// Builds a `Schema` from `(column, type)` declarations plus an optional
/// alias map, duplicating entries under alternate keys the way
/// `DataSchema.names` does in the original.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    attributes: HashMap<String, Type>,
    aliases: HashMap<String, String>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        SchemaBuilder::default()
    }

    /// Declares a column with its type descriptor.
    pub fn column(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.attributes.insert(name.into(), ty);
        self
    }

    /// Exposes `internal_name`'s type under `external_name` as well.
    pub fn alias(mut self, internal_name: impl Into<String>, external_name: impl Into<String>) -> Self {
        self.aliases.insert(external_name.into(), internal_name.into());
        self
    }

    pub fn build(mut self) -> Result<Schema> {
        for (external, internal) in &self.aliases {
            let ty = self
                .attributes
                .get(internal)
                .ok_or_else(|| DpError::SchemaMismatch(internal.clone()))?
                .clone();
            self.attributes.insert(external.clone(), ty);
        }
        Ok(Schema { attributes: self.attributes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_declared_columns() {
        let schema = SchemaBuilder::new()
            .column("Weight", Type::integer(0, 200))
            .column("Height", Type::integer(0, 200))
            .build()
            .unwrap();
        assert_eq!(schema.get("Weight").unwrap(), &Type::integer(0, 200));
        assert!(schema.get("Missing").is_err());
    }

    #[test]
    fn alias_duplicates_the_entry() {
        let schema = SchemaBuilder::new()
            .column("wt", Type::integer(0, 200))
            .alias("wt", "Weight")
            .build()
            .unwrap();
        assert_eq!(schema.get("Weight").unwrap(), schema.get("wt").unwrap());
    }
}
