//! # keycheck-schema — Reconciling JSON Documents with Field Schemas
//!
//! Compares the keys present in a JSON document with the fields a
//! struct-like type declares, in four modes:
//!
//! - **validate**: fail on the first key the schema cannot place;
//! - **missing keys**: list declared fields with no key in the document;
//! - **unknown keys**: list document keys with no declared field;
//! - **existing keys**: list declared fields that do have a key.
//!
//! Key lookup is case-insensitive. A field may be renamed, in which case
//! only its tag is accepted as a key, or excluded from decoding entirely.
//! Suppression lists and the omit-empty policy come from
//! [`keycheck_core::CheckOptions`].
//!
//! ## Schemas (`schema`, `json_schema`)
//!
//! [`StructSchema`] is plain data. Build it with the builder methods,
//! deserialize it, or import it from a JSON Schema document with
//! [`StructSchema::from_json_schema`].
//!
//! ## Traversal (`reconcile`, `policy`)
//!
//! One recursive traversal serves every mode; the mode is a [`Policy`]
//! that receives the traversal's findings. [`KeyChecker`] wires the four
//! built-in policies to raw JSON input.
//!
//! ## Crate Policy
//!
//! - Depends only on `keycheck-core` internally.
//! - No global state: every check borrows its schema and options.
//! - Only malformed JSON fails an accumulating check; everything else is
//!   reported as a path.

pub mod json_schema;
pub mod policy;
pub mod reconcile;
pub mod schema;
pub mod validate;

pub use json_schema::SchemaError;
pub use policy::{CollectExisting, CollectMissing, CollectUnknown, FailFast};
pub use reconcile::{reconcile, Cursor, Policy, Walk};
pub use schema::{FieldSchema, KeyTag, Shape, StructSchema};
pub use validate::{KeyChecker, KeyReport};
