//! # Field Schemas — Static Descriptions of Struct-Like Types
//!
//! A [`StructSchema`] lists the fields of one struct-like type in
//! declaration order. Each [`FieldSchema`] records:
//!
//! - `name`: the declared field name, used in missing/existing reports;
//! - `tag`: an optional rename ([`KeyTag::Renamed`]) that becomes the only
//!   accepted JSON key, or [`KeyTag::Excluded`] to take the field out of
//!   decoding entirely;
//! - `omit_empty`: whether the field may be absent without being reported
//!   missing (subject to [`CheckOptions::omit_empty`](keycheck_core::CheckOptions::omit_empty));
//! - `shape`: scalar, nested struct, or list (lists nest).
//!
//! Schemas are plain data: build them with the builder methods, parse
//! `json:"..."`-style tag strings with [`FieldSchema::with_tag`], import them
//! from a JSON Schema document (see [`crate::json_schema`]), or deserialize
//! them from any serde format.

use keycheck_core::KeyPath;
use serde::{Deserialize, Serialize};

/// The fields of one struct-like type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructSchema {
    type_name: String,
    #[serde(default)]
    fields: Vec<FieldSchema>,
}

impl StructSchema {
    /// An empty schema for the type `type_name`.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field (builder form).
    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Append a field.
    pub fn push(&mut self, field: FieldSchema) {
        self.fields.push(field);
    }

    /// Name of the described type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Fields in declaration order, excluded ones included.
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Every field path this schema can report, depth-first in declaration
    /// order. Excluded fields and everything beneath them are left out;
    /// list elements share their list field's path.
    pub fn field_paths(&self) -> Vec<KeyPath> {
        let mut paths = Vec::new();
        collect_paths(self, &KeyPath::root(), &mut paths);
        paths
    }
}

fn collect_paths(schema: &StructSchema, parent: &KeyPath, out: &mut Vec<KeyPath>) {
    for field in schema.fields.iter().filter(|f| !f.is_excluded()) {
        let path = parent.join(&field.name);
        out.push(path.clone());
        if let Some(nested) = field.shape.element_struct() {
            collect_paths(nested, &path, out);
        }
    }
}

/// How a field is addressed in JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyTag {
    /// Addressed by its lower-cased field name.
    #[default]
    Default,
    /// Addressed only by this key.
    Renamed(String),
    /// Never decoded; its key is tolerated but not checked.
    Excluded,
}

/// One declared field of a struct-like type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    name: String,
    #[serde(default)]
    tag: KeyTag,
    #[serde(default)]
    omit_empty: bool,
    #[serde(default)]
    shape: Shape,
}

impl FieldSchema {
    /// A field named `name` with the given shape and no tag.
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            tag: KeyTag::Default,
            omit_empty: false,
            shape,
        }
    }

    /// A scalar field.
    pub fn scalar(name: impl Into<String>) -> Self {
        Self::new(name, Shape::Scalar)
    }

    /// A field whose value is a nested struct.
    pub fn structure(name: impl Into<String>, schema: StructSchema) -> Self {
        Self::new(name, Shape::Struct(schema))
    }

    /// A field whose value is a list of `element`.
    pub fn list(name: impl Into<String>, element: Shape) -> Self {
        Self::new(name, Shape::list_of(element))
    }

    /// A field described by a `json:"..."`-style tag string.
    ///
    /// The first comma-separated segment is the rename (empty means none,
    /// a lone `-` excludes the field, `-,` renames it to the key `-`);
    /// `omitempty` among the remaining segments marks the field
    /// omit-tolerant.
    pub fn with_tag(name: impl Into<String>, tag: &str, shape: Shape) -> Self {
        let mut field = Self::new(name, shape);
        if tag == "-" {
            field.tag = KeyTag::Excluded;
            return field;
        }
        let mut parts = tag.split(',');
        let rename = parts.next().unwrap_or_default();
        if !rename.is_empty() {
            field.tag = KeyTag::Renamed(rename.to_string());
        }
        field.omit_empty = parts.any(|opt| opt == "omitempty");
        field
    }

    /// Address this field only by `key` (builder form).
    pub fn rename(mut self, key: impl Into<String>) -> Self {
        self.tag = KeyTag::Renamed(key.into());
        self
    }

    /// Exclude this field from decoding (builder form).
    pub fn exclude(mut self) -> Self {
        self.tag = KeyTag::Excluded;
        self
    }

    /// Mark this field omit-tolerant (builder form).
    pub fn omit_empty(mut self) -> Self {
        self.omit_empty = true;
        self
    }

    /// The declared field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared tag.
    pub fn tag(&self) -> &KeyTag {
        &self.tag
    }

    /// The rename, if the field declares one.
    pub fn renamed_to(&self) -> Option<&str> {
        match &self.tag {
            KeyTag::Renamed(key) => Some(key),
            _ => None,
        }
    }

    /// Whether the field is excluded from decoding.
    pub fn is_excluded(&self) -> bool {
        self.tag == KeyTag::Excluded
    }

    /// Whether the field may be absent without being reported missing.
    pub fn is_omit_empty(&self) -> bool {
        self.omit_empty
    }

    /// The field's value shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The lower-cased JSON key this field is looked up by; `None` for
    /// excluded fields.
    pub fn lookup_key(&self) -> Option<String> {
        match &self.tag {
            KeyTag::Default => Some(self.name.to_lowercase()),
            KeyTag::Renamed(key) => Some(key.to_lowercase()),
            KeyTag::Excluded => None,
        }
    }
}

/// The value shape of a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// A leaf; only the presence of its key is checked.
    #[default]
    Scalar,
    /// A nested struct; the value must be a JSON object.
    Struct(StructSchema),
    /// A list; the value must be a JSON array of `element`.
    List(Box<Shape>),
}

impl Shape {
    /// A list of `element`.
    pub fn list_of(element: Shape) -> Self {
        Self::List(Box::new(element))
    }

    /// The struct reached through any number of list levels, if any.
    pub fn element_struct(&self) -> Option<&StructSchema> {
        match self {
            Self::Scalar => None,
            Self::Struct(schema) => Some(schema),
            Self::List(element) => element.element_struct(),
        }
    }

    /// Display name of the shape, used when a value has the wrong shape.
    pub fn type_name(&self) -> String {
        match self {
            Self::Scalar => "scalar".to_string(),
            Self::Struct(schema) => schema.type_name.clone(),
            Self::List(element) => format!("Vec<{}>", element.type_name()),
        }
    }
}
