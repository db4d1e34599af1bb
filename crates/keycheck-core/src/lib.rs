//! # keycheck-core — Foundational Types for keycheck
//!
//! This crate holds everything the reconciler consumes but does not own:
//! the error hierarchy, the dotted [`KeyPath`] used in every report, the
//! [`CheckOptions`] consulted during traversal, and the two input stages
//! ahead of it (raw-bytes parsing and comment-tolerant object scanning).
//!
//! ## Key Design Principles
//!
//! 1. **No process-wide state.** Suppression lists and the omit-empty policy
//!    live in a [`CheckOptions`] value the caller constructs and passes by
//!    reference. Concurrent checks cannot observe each other's settings.
//!
//! 2. **Paths are a newtype.** Reports are `Vec<KeyPath>`, not bare strings;
//!    depth and segment access live on the type.
//!
//! 3. **Errors are values.** Parse failures carry the input fragment around
//!    the failure; check failures carry a breadcrumb trail to the root.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `keycheck-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod ingest;
pub mod options;
pub mod parse;
pub mod path;

// Re-export primary types for ergonomic imports.
pub use error::{CheckError, ConfigError, Expected, Frame, IngestError};
pub use ingest::{read_json_file, read_json_objects, JsonObjects};
pub use options::{CheckOptions, FieldSuppression, DEFAULT_IGNORED_KEY};
pub use parse::{parse_document, resolve_parse_error};
pub use path::KeyPath;
