//! # JSON Schema Import
//!
//! Builds a [`StructSchema`] from a JSON Schema document, so that types
//! which already describe themselves (for example through
//! `schemars::schema_for!`) can be checked without writing the field
//! schema by hand.
//!
//! ## Mapping
//!
//! - `properties` become fields in document order; each property name is
//!   the field name and there is no rename.
//! - A property missing from `required` is omit-tolerant.
//! - `type: "object"` (or a schema with `properties`) is a struct,
//!   `type: "array"` (or a schema with `items`) is a list of its `items`.
//!   Type arrays such as `["array", "null"]` are read without the `null`.
//! - Local `$ref`s (`#/$defs/..`, `#/definitions/..`, any `#/` pointer)
//!   are followed. `allOf`, `anyOf` and `oneOf` resolve to their first
//!   branch that is not `{"type": "null"}`.
//! - Struct type names come from the `$ref` target, then `title`, then the
//!   property name.
//!
//! A `$ref` that re-enters a definition already being expanded is cut
//! short and treated as a scalar; self-referential types would otherwise
//! expand forever.

use serde_json::Value;
use thiserror::Error;

use crate::schema::{FieldSchema, Shape, StructSchema};

/// Error importing a JSON Schema document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The document root does not describe an object.
    #[error("schema at {pointer} does not describe an object")]
    NotAnObjectSchema {
        /// JSON pointer of the offending schema.
        pointer: String,
    },

    /// A `$ref` is not a local pointer, or points nowhere.
    #[error("unresolved $ref: {reference}")]
    UnresolvedRef {
        /// The reference as written.
        reference: String,
    },
}

impl StructSchema {
    /// Import a struct schema from a JSON Schema document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NotAnObjectSchema`] if the root is not an
    /// object schema, and [`SchemaError::UnresolvedRef`] for a `$ref` that
    /// cannot be followed within the document.
    pub fn from_json_schema(document: &Value) -> Result<Self, SchemaError> {
        let mut importer = Importer {
            root: document,
            expanding: Vec::new(),
        };
        match importer.shape_of(document, "Root")? {
            Shape::Struct(schema) => Ok(schema),
            _ => Err(SchemaError::NotAnObjectSchema {
                pointer: "#".to_string(),
            }),
        }
    }
}

struct Importer<'d> {
    root: &'d Value,
    expanding: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum Kind {
    Object,
    Array,
    Other,
}

impl<'d> Importer<'d> {
    fn shape_of(&mut self, node: &'d Value, name_hint: &str) -> Result<Shape, SchemaError> {
        let Some(object) = node.as_object() else {
            return Ok(Shape::Scalar);
        };

        if let Some(reference) = object.get("$ref").and_then(Value::as_str) {
            if self.expanding.iter().any(|r| r == reference) {
                tracing::debug!(reference, "recursive $ref treated as scalar");
                return Ok(Shape::Scalar);
            }
            let target = self.resolve(reference)?;
            let name = reference.rsplit('/').next().filter(|s| !s.is_empty()).unwrap_or(name_hint);
            self.expanding.push(reference.to_string());
            let shape = self.shape_of(target, name);
            self.expanding.pop();
            return shape;
        }

        for combinator in ["allOf", "anyOf", "oneOf"] {
            if let Some(branches) = object.get(combinator).and_then(Value::as_array) {
                if let Some(branch) = branches.iter().find(|b| !is_null_schema(b)) {
                    return self.shape_of(branch, name_hint);
                }
            }
        }

        match kind_of(node) {
            Kind::Object => {
                let type_name = object
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or(name_hint);
                Ok(Shape::Struct(self.struct_of(node, type_name)?))
            }
            Kind::Array => {
                let element = match object.get("items") {
                    Some(items) if items.is_object() => self.shape_of(items, name_hint)?,
                    _ => Shape::Scalar,
                };
                Ok(Shape::list_of(element))
            }
            Kind::Other => Ok(Shape::Scalar),
        }
    }

    fn struct_of(&mut self, node: &'d Value, type_name: &str) -> Result<StructSchema, SchemaError> {
        let required: Vec<&str> = node
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut schema = StructSchema::new(type_name);
        if let Some(properties) = node.get("properties").and_then(Value::as_object) {
            for (name, property) in properties {
                let shape = self.shape_of(property, name)?;
                let field = FieldSchema::new(name.as_str(), shape);
                schema.push(if required.contains(&name.as_str()) {
                    field
                } else {
                    field.omit_empty()
                });
            }
        }
        Ok(schema)
    }

    fn resolve(&self, reference: &str) -> Result<&'d Value, SchemaError> {
        reference
            .strip_prefix('#')
            .and_then(|pointer| self.root.pointer(pointer))
            .ok_or_else(|| SchemaError::UnresolvedRef {
                reference: reference.to_string(),
            })
    }
}

fn kind_of(node: &Value) -> Kind {
    let declared: Vec<&str> = match node.get("type") {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };
    if declared.contains(&"object") {
        Kind::Object
    } else if declared.contains(&"array") {
        Kind::Array
    } else if declared.is_empty() && node.get("properties").is_some() {
        Kind::Object
    } else if declared.is_empty() && node.get("items").is_some() {
        Kind::Array
    } else {
        Kind::Other
    }
}

fn is_null_schema(node: &Value) -> bool {
    node.get("type").and_then(Value::as_str) == Some("null")
}
