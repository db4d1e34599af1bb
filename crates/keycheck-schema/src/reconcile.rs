//! # Reconciler — One Traversal, Four Result Policies
//!
//! Walks a `serde_json::Value` tree alongside a [`StructSchema`] and reports
//! what it finds to a [`Policy`]. The four public checks differ only in the
//! policy they plug in (see [`crate::policy`]).
//!
//! ## Traversal
//!
//! At every struct node the object's keys are folded to lower case first
//! (last write wins on collision). Then one of two passes runs, chosen by
//! [`Policy::WALK`]:
//!
//! - [`Walk::Keys`] iterates the object's keys in document order and looks
//!   each one up among the schema's fields. Used by fail-fast validation and
//!   the unknown-keys report. Key suppressions apply here.
//! - [`Walk::Fields`] iterates the schema's fields in declaration order and
//!   looks each one up among the object's keys. Used by the missing and
//!   existing reports. Field suppressions apply here.
//!
//! Both passes descend into the value of every matched key whose field is a
//! struct or a list. Any value of the wrong shape there, `null` included,
//! goes to [`Policy::on_shape_mismatch`]. Only a document that is `null` as
//! a whole is read as an empty object.
//!
//! ## Paths
//!
//! The [`Cursor`] carries two paths at once: the schema *field* path (field
//! names, no array ordinals) and the document *key* path (lower-cased keys
//! plus 1-based ordinals for array elements). Each pass reads the one its
//! reports need.

use std::collections::HashMap;

use keycheck_core::{CheckOptions, Expected, Frame, KeyPath};
use serde_json::{Map, Value};

use crate::schema::{FieldSchema, KeyTag, Shape, StructSchema};

/// Which side of a struct node drives the iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Every JSON key is matched against the schema.
    Keys,
    /// Every schema field is matched against the JSON keys.
    Fields,
}

/// The location of the node being visited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Dotted schema field names from the root.
    pub field_path: KeyPath,
    /// Dotted lower-cased JSON keys and array ordinals from the root.
    pub key_path: KeyPath,
}

impl Cursor {
    fn descend(&self, field_name: &str, key: &str) -> Self {
        Self {
            field_path: self.field_path.join(field_name),
            key_path: self.key_path.join(key),
        }
    }

    fn element(&self, ordinal: usize) -> Self {
        Self {
            field_path: self.field_path.clone(),
            key_path: self.key_path.join_ordinal(ordinal),
        }
    }
}

/// Receives the findings of a traversal.
///
/// Hooks that a policy does not care about default to doing nothing. A
/// policy aborts the traversal by returning `Err` from a hook; accumulating
/// policies use [`std::convert::Infallible`] and never do.
pub trait Policy {
    /// Error that aborts the traversal.
    type Error;

    /// Which pass runs at each struct node.
    const WALK: Walk;

    /// A field's key is absent and the field is not excused.
    fn on_missing(&mut self, _field_path: &KeyPath) {}

    /// A field's key is present.
    fn on_found(&mut self, _field_path: &KeyPath) {}

    /// A field's key is absent, but the field is omit-tolerant and the
    /// omit-empty policy is on.
    fn on_excused(&mut self, _field_path: &KeyPath) {}

    /// A JSON key matches no field. `key_path` already ends in the
    /// lower-cased key; `key` is the key as written.
    fn on_unknown_key(&mut self, _key_path: KeyPath, _key: &str) -> Result<(), Self::Error> {
        Ok(())
    }

    /// A JSON key names a renamed field by its plain name instead of its tag.
    fn on_tag_mismatch(
        &mut self,
        _parent: &KeyPath,
        _key: &str,
        _tag: &str,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    /// A value is not an object (or array) where the schema requires one.
    fn on_shape_mismatch(
        &mut self,
        at: &Cursor,
        type_name: &str,
        expected: Expected,
    ) -> Result<(), Self::Error>;

    /// Attach one level of location context to an error raised beneath it.
    fn nest(error: Self::Error, frame: Frame) -> Self::Error;
}

/// Walk `value` against `schema`, feeding `policy`, and hand the policy back.
///
/// A root `null` is walked as an object with no keys.
///
/// # Errors
///
/// Returns the first error raised by a policy hook, wrapped in one
/// [`Frame`] per struct field or array element it passed through.
pub fn reconcile<P: Policy>(
    schema: &StructSchema,
    value: &Value,
    options: &CheckOptions,
    policy: P,
) -> Result<P, P::Error> {
    let empty = Value::Object(Map::new());
    let root = if value.is_null() { &empty } else { value };
    let mut reconciler = Reconciler { options, policy };
    reconciler.visit_struct(schema, root, &Cursor::default())?;
    Ok(reconciler.policy)
}

struct Reconciler<'o, P> {
    options: &'o CheckOptions,
    policy: P,
}

impl<P: Policy> Reconciler<'_, P> {
    fn visit_shape(&mut self, shape: &Shape, value: &Value, at: &Cursor) -> Result<(), P::Error> {
        match shape {
            Shape::Scalar => Ok(()),
            Shape::Struct(schema) => self.visit_struct(schema, value, at),
            Shape::List(element) => self.visit_list(shape, element, value, at),
        }
    }

    fn visit_list(
        &mut self,
        list: &Shape,
        element: &Shape,
        value: &Value,
        at: &Cursor,
    ) -> Result<(), P::Error> {
        let items = match value {
            Value::Array(items) => items,
            _ => return self.policy.on_shape_mismatch(at, &list.type_name(), Expected::Array),
        };
        if matches!(element, Shape::Scalar) {
            return Ok(());
        }
        for (index, item) in items.iter().enumerate() {
            let ordinal = index + 1;
            self.visit_shape(element, item, &at.element(ordinal))
                .map_err(|e| P::nest(e, Frame::Element(ordinal)))?;
        }
        Ok(())
    }

    fn visit_struct(
        &mut self,
        schema: &StructSchema,
        value: &Value,
        at: &Cursor,
    ) -> Result<(), P::Error> {
        let object = match value {
            Value::Object(object) => object,
            _ => {
                return self
                    .policy
                    .on_shape_mismatch(at, schema.type_name(), Expected::Object)
            }
        };
        let folded = FoldedKeys::new(object, schema.type_name());
        match P::WALK {
            Walk::Keys => self.key_pass(schema, &folded, at),
            Walk::Fields => self.field_pass(schema, &folded, at),
        }
    }

    fn key_pass(
        &mut self,
        schema: &StructSchema,
        folded: &FoldedKeys<'_>,
        at: &Cursor,
    ) -> Result<(), P::Error> {
        let fields = FieldIndex::new(schema);
        for entry in &folded.entries {
            if self.options.is_key_ignored(&at.key_path, &entry.folded) {
                continue;
            }
            match fields.lookup(&entry.folded) {
                KeyMatch::Field(field) => {
                    let child = at.descend(field.name(), &entry.folded);
                    self.visit_shape(field.shape(), entry.value, &child)
                        .map_err(|e| P::nest(e, Frame::Field(entry.key.to_string())))?;
                }
                KeyMatch::Excluded => {}
                KeyMatch::PlainName { tag } => {
                    self.policy.on_tag_mismatch(&at.key_path, entry.key, tag)?;
                }
                KeyMatch::Unknown => {
                    self.policy
                        .on_unknown_key(at.key_path.join(&entry.folded), entry.key)?;
                }
            }
        }
        Ok(())
    }

    fn field_pass(
        &mut self,
        schema: &StructSchema,
        folded: &FoldedKeys<'_>,
        at: &Cursor,
    ) -> Result<(), P::Error> {
        for field in schema.fields() {
            let Some(lookup) = field.lookup_key() else {
                continue;
            };
            if self.options.is_field_ignored(&at.field_path, field.name()) {
                continue;
            }
            let child = at.descend(field.name(), &lookup);
            match folded.get(&lookup) {
                Some(value) => {
                    self.policy.on_found(&child.field_path);
                    self.visit_shape(field.shape(), value, &child)?;
                }
                None if field.is_omit_empty() && self.options.omit_empty() => {
                    self.policy.on_excused(&child.field_path);
                }
                None => self.policy.on_missing(&child.field_path),
            }
        }
        Ok(())
    }
}

/// How a lower-cased JSON key relates to a struct's fields.
enum KeyMatch<'s> {
    /// The key is a field's lookup key.
    Field(&'s FieldSchema),
    /// The key names an excluded field.
    Excluded,
    /// The key is the plain name of a field that must be addressed by `tag`.
    PlainName { tag: &'s str },
    /// Nothing in the struct answers to the key.
    Unknown,
}

/// A struct's fields indexed by lower-cased lookup key and by lower-cased
/// name. The first declaration wins when two fields fold to the same key.
struct FieldIndex<'s> {
    by_key: HashMap<String, &'s FieldSchema>,
    by_name: HashMap<String, &'s FieldSchema>,
}

impl<'s> FieldIndex<'s> {
    fn new(schema: &'s StructSchema) -> Self {
        let mut by_key = HashMap::with_capacity(schema.fields().len());
        let mut by_name = HashMap::with_capacity(schema.fields().len());
        for field in schema.fields() {
            if let Some(key) = field.lookup_key() {
                by_key.entry(key).or_insert(field);
            }
            by_name.entry(field.name().to_lowercase()).or_insert(field);
        }
        Self { by_key, by_name }
    }

    fn lookup(&self, folded_key: &str) -> KeyMatch<'s> {
        if let Some(&field) = self.by_key.get(folded_key) {
            return KeyMatch::Field(field);
        }
        match self.by_name.get(folded_key).copied().map(FieldSchema::tag) {
            Some(KeyTag::Excluded) => KeyMatch::Excluded,
            Some(KeyTag::Renamed(tag)) => KeyMatch::PlainName { tag },
            Some(KeyTag::Default) | None => KeyMatch::Unknown,
        }
    }
}

struct FoldedEntry<'v> {
    folded: String,
    key: &'v str,
    value: &'v Value,
}

/// An object's keys folded to lower case, in first-seen order.
struct FoldedKeys<'v> {
    entries: Vec<FoldedEntry<'v>>,
    index: HashMap<String, usize>,
}

impl<'v> FoldedKeys<'v> {
    fn new(object: &'v Map<String, Value>, type_name: &str) -> Self {
        let mut entries: Vec<FoldedEntry<'v>> = Vec::with_capacity(object.len());
        let mut index = HashMap::with_capacity(object.len());
        for (key, value) in object {
            let folded = key.to_lowercase();
            if let Some(&slot) = index.get(&folded) {
                let earlier: &mut FoldedEntry<'v> = &mut entries[slot];
                tracing::warn!(
                    type_name = %type_name,
                    kept = %key,
                    dropped = %earlier.key,
                    "keys differ only in case; keeping the later one"
                );
                earlier.key = key.as_str();
                earlier.value = value;
                continue;
            }
            index.insert(folded.clone(), entries.len());
            entries.push(FoldedEntry {
                folded,
                key: key.as_str(),
                value,
            });
        }
        Self { entries, index }
    }

    fn get(&self, folded_key: &str) -> Option<&'v Value> {
        self.index.get(folded_key).map(|&slot| self.entries[slot].value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Records every hook call as a line of text.
    #[derive(Default)]
    struct Trace<const KEYS: bool>(Vec<String>);

    impl<const KEYS: bool> Policy for Trace<KEYS> {
        type Error = std::convert::Infallible;
        const WALK: Walk = if KEYS { Walk::Keys } else { Walk::Fields };

        fn on_missing(&mut self, path: &KeyPath) {
            self.0.push(format!("missing {path}"));
        }
        fn on_found(&mut self, path: &KeyPath) {
            self.0.push(format!("found {path}"));
        }
        fn on_excused(&mut self, path: &KeyPath) {
            self.0.push(format!("excused {path}"));
        }
        fn on_unknown_key(&mut self, key_path: KeyPath, key: &str) -> Result<(), Self::Error> {
            self.0.push(format!("unknown {key_path} ({key})"));
            Ok(())
        }
        fn on_tag_mismatch(&mut self, parent: &KeyPath, key: &str, tag: &str) -> Result<(), Self::Error> {
            self.0.push(format!("tag {parent} {key}->{tag}"));
            Ok(())
        }
        fn on_shape_mismatch(&mut self, at: &Cursor, type_name: &str, expected: Expected) -> Result<(), Self::Error> {
            self.0.push(format!("shape {} {} {type_name} {expected}", at.field_path, at.key_path));
            Ok(())
        }
        fn nest(error: Self::Error, _frame: Frame) -> Self::Error {
            error
        }
    }

    fn trace<const KEYS: bool>(schema: &StructSchema, value: &Value, options: &CheckOptions) -> Vec<String> {
        reconcile(schema, value, options, Trace::<KEYS>::default())
            .unwrap()
            .0
    }

    fn schema() -> StructSchema {
        let home = StructSchema::new("Home")
            .field(FieldSchema::scalar("Addr"))
            .field(FieldSchema::scalar("Port").omit_empty());
        StructSchema::new("Config")
            .field(FieldSchema::scalar("Id"))
            .field(FieldSchema::scalar("Why").rename("whynot"))
            .field(FieldSchema::scalar("Secret").exclude())
            .field(FieldSchema::list("Homes", Shape::Struct(home)))
    }

    #[test]
    fn test_field_pass_reports_in_declaration_order() {
        let doc = json!({"homes": [{"addr": "a"}, {"port": 2}], "ID": 7});
        assert_eq!(
            trace::<false>(&schema(), &doc, &CheckOptions::default()),
            vec![
                "found Id",
                "missing Why",
                "found Homes",
                "found Homes.Addr",
                "excused Homes.Port",
                "missing Homes.Addr",
                "found Homes.Port",
            ]
        );
    }

    #[test]
    fn test_key_pass_reports_in_document_order() {
        let doc = json!({
            "extra": 1,
            "why": true,
            "secret": "s",
            "homes": [{"addr": "a"}, {"addr": "b", "bogus": 0}],
            "config": {}
        });
        assert_eq!(
            trace::<true>(&schema(), &doc, &CheckOptions::default()),
            vec![
                "unknown extra (extra)",
                "tag  why->whynot",
                "unknown homes.2.bogus (bogus)",
            ]
        );
    }

    #[test]
    fn test_shape_mismatch_carries_both_paths() {
        let doc = json!({"homes": [{"addr": "a"}, 5]});
        assert_eq!(
            trace::<true>(&schema(), &doc, &CheckOptions::default()),
            vec!["shape Homes homes.2 Home key:value shaped"]
        );
        let doc = json!({"homes": {"addr": "a"}});
        assert_eq!(
            trace::<true>(&schema(), &doc, &CheckOptions::default()),
            vec!["shape Homes homes Vec<Home> an array"]
        );
    }

    #[test]
    fn test_nested_null_is_a_shape_mismatch() {
        let doc = json!({"id": 1, "whynot": 2, "homes": null});
        assert_eq!(
            trace::<false>(&schema(), &doc, &CheckOptions::default()),
            vec![
                "found Id",
                "found Why",
                "found Homes",
                "shape Homes homes Vec<Home> an array",
            ]
        );
        let doc = json!({"homes": [{"addr": "a"}, null]});
        assert_eq!(
            trace::<true>(&schema(), &doc, &CheckOptions::default()),
            vec!["shape Homes homes.2 Home key:value shaped"]
        );
    }

    #[test]
    fn test_root_null_is_an_empty_object() {
        assert!(trace::<true>(&schema(), &json!(null), &CheckOptions::default()).is_empty());
        assert_eq!(
            trace::<false>(&schema(), &json!(null), &CheckOptions::default()),
            vec!["missing Id", "missing Why", "missing Homes"]
        );
    }

    #[test]
    fn test_case_collision_keeps_later_value() {
        let inner = StructSchema::new("Inner").field(FieldSchema::scalar("A"));
        let schema = StructSchema::new("Outer").field(FieldSchema::structure("In", inner));
        let doc: Value = serde_json::from_str(r#"{"in": 3, "IN": {"a": 1}}"#).unwrap();
        let fields = trace::<false>(&schema, &doc, &CheckOptions::default());
        assert_eq!(fields, vec!["found In", "found In.A"]);
    }

    #[test]
    fn test_folded_keys_keep_first_position() {
        let doc: Value = serde_json::from_str(r#"{"b": 1, "a": 2, "B": 3}"#).unwrap();
        let folded = FoldedKeys::new(doc.as_object().unwrap(), "T");
        let order: Vec<&str> = folded.entries.iter().map(|e| e.key).collect();
        assert_eq!(order, vec!["B", "a"]);
        assert_eq!(folded.get("b"), Some(&json!(3)));
    }

    #[test]
    fn test_field_index_lookup_variants() {
        let schema = schema();
        let fields = FieldIndex::new(&schema);
        assert!(matches!(fields.lookup("id"), KeyMatch::Field(f) if f.name() == "Id"));
        assert!(matches!(fields.lookup("whynot"), KeyMatch::Field(f) if f.name() == "Why"));
        assert!(matches!(fields.lookup("why"), KeyMatch::PlainName { tag: "whynot" }));
        assert!(matches!(fields.lookup("secret"), KeyMatch::Excluded));
        assert!(matches!(fields.lookup("nothing"), KeyMatch::Unknown));
    }

    #[test]
    fn test_field_index_keeps_first_declaration() {
        let schema = StructSchema::new("Dup")
            .field(FieldSchema::scalar("Name"))
            .field(FieldSchema::scalar("Other").rename("NAME"));
        let fields = FieldIndex::new(&schema);
        assert!(matches!(fields.lookup("name"), KeyMatch::Field(f) if f.name() == "Name"));
    }
}
