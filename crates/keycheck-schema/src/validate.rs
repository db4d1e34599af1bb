//! # Key Checking — The Public Entry Points
//!
//! [`KeyChecker`] pairs a [`StructSchema`] with the [`CheckOptions`] to
//! apply and exposes the four checks:
//!
//! - [`KeyChecker::validate`]: fail-fast; the first unknown key, tag
//!   mismatch or shape mismatch is returned as an error with a breadcrumb
//!   trail. Absent keys are never a validation failure.
//! - [`KeyChecker::missing_keys`]: field paths whose key is absent.
//! - [`KeyChecker::unknown_keys`]: key paths the schema has no field for.
//! - [`KeyChecker::existing_keys`]: field paths whose key is present.
//!
//! Each check takes raw JSON bytes; the `*_value` variants take a document
//! that has already been parsed. Accumulating checks only fail when the
//! bytes are not JSON.

use std::fmt;

use keycheck_core::{parse_document, CheckError, CheckOptions, KeyPath};
use serde::Serialize;
use serde_json::Value;

use crate::policy::{CollectExisting, CollectMissing, CollectUnknown, FailFast};
use crate::reconcile::{reconcile, Policy};
use crate::schema::StructSchema;

/// Checks JSON documents against one schema.
#[derive(Debug, Clone)]
pub struct KeyChecker {
    schema: StructSchema,
    options: CheckOptions,
}

impl KeyChecker {
    /// A checker with default options.
    pub fn new(schema: StructSchema) -> Self {
        Self::with_options(schema, CheckOptions::default())
    }

    /// A checker with the given options.
    pub fn with_options(schema: StructSchema, options: CheckOptions) -> Self {
        Self { schema, options }
    }

    /// The schema documents are checked against.
    pub fn schema(&self) -> &StructSchema {
        &self.schema
    }

    /// The options in effect.
    pub fn options(&self) -> &CheckOptions {
        &self.options
    }

    /// Mutable access to the options, for adjusting suppressions between checks.
    pub fn options_mut(&mut self) -> &mut CheckOptions {
        &mut self.options
    }

    /// Every field path the schema can report, depth-first in declaration order.
    pub fn field_paths(&self) -> Vec<KeyPath> {
        self.schema.field_paths()
    }

    /// Fail-fast check of raw JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Parse`] for malformed JSON, otherwise the first
    /// violation found, wrapped in [`CheckError::Nested`] frames leading to it.
    pub fn validate(&self, data: &[u8]) -> Result<(), CheckError> {
        self.validate_value(&parse_document(data)?)
    }

    /// Fail-fast check of a parsed document.
    ///
    /// # Errors
    ///
    /// Returns the first violation found; see [`validate`](Self::validate).
    pub fn validate_value(&self, document: &Value) -> Result<(), CheckError> {
        let outcome = reconcile(&self.schema, document, &self.options, FailFast).map(|_| ());
        match &outcome {
            Ok(()) => tracing::debug!(type_name = %self.schema.type_name(), "document validated"),
            Err(e) => tracing::debug!(
                type_name = %self.schema.type_name(),
                code = e.code(),
                error = %e,
                "document rejected"
            ),
        }
        outcome
    }

    /// Field paths whose key is absent from the JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Parse`] if the bytes are not well-formed JSON.
    pub fn missing_keys(&self, data: &[u8]) -> Result<Vec<KeyPath>, CheckError> {
        Ok(self.missing_keys_value(&parse_document(data)?))
    }

    /// Field paths whose key is absent from a parsed document.
    pub fn missing_keys_value(&self, document: &Value) -> Vec<KeyPath> {
        self.collect("missing", document, CollectMissing::default(), CollectMissing::into_paths)
    }

    /// Key paths in the JSON bytes that match no field.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Parse`] if the bytes are not well-formed JSON.
    pub fn unknown_keys(&self, data: &[u8]) -> Result<Vec<KeyPath>, CheckError> {
        Ok(self.unknown_keys_value(&parse_document(data)?))
    }

    /// Key paths in a parsed document that match no field.
    pub fn unknown_keys_value(&self, document: &Value) -> Vec<KeyPath> {
        self.collect("unknown", document, CollectUnknown::default(), CollectUnknown::into_paths)
    }

    /// Field paths whose key is present in the JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Parse`] if the bytes are not well-formed JSON.
    pub fn existing_keys(&self, data: &[u8]) -> Result<Vec<KeyPath>, CheckError> {
        Ok(self.existing_keys_value(&parse_document(data)?))
    }

    /// Field paths whose key is present in a parsed document.
    pub fn existing_keys_value(&self, document: &Value) -> Vec<KeyPath> {
        self.collect("existing", document, CollectExisting::default(), CollectExisting::into_paths)
    }

    /// Run the three accumulating checks over one parse of the JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Parse`] if the bytes are not well-formed JSON.
    pub fn check_all(&self, data: &[u8]) -> Result<KeyReport, CheckError> {
        Ok(self.check_all_value(&parse_document(data)?))
    }

    /// Run the three accumulating checks over a parsed document.
    pub fn check_all_value(&self, document: &Value) -> KeyReport {
        KeyReport {
            missing: self.missing_keys_value(document),
            unknown: self.unknown_keys_value(document),
            existing: self.existing_keys_value(document),
        }
    }

    fn collect<P>(
        &self,
        report: &'static str,
        document: &Value,
        policy: P,
        into_paths: fn(P) -> Vec<KeyPath>,
    ) -> Vec<KeyPath>
    where
        P: Policy<Error = std::convert::Infallible>,
    {
        let paths = match reconcile(&self.schema, document, &self.options, policy) {
            Ok(policy) => into_paths(policy),
            Err(never) => match never {},
        };
        tracing::debug!(
            type_name = %self.schema.type_name(),
            report,
            count = paths.len(),
            "key report collected"
        );
        paths
    }
}

/// The three accumulating reports for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeyReport {
    /// Field paths whose key is absent.
    pub missing: Vec<KeyPath>,
    /// Key paths that match no field.
    pub unknown: Vec<KeyPath>,
    /// Field paths whose key is present.
    pub existing: Vec<KeyPath>,
}

impl KeyReport {
    /// True when nothing is missing and nothing is unknown.
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.unknown.is_empty()
    }
}

impl fmt::Display for KeyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return write!(f, "all {} keys matched", self.existing.len());
        }
        let join = |paths: &[KeyPath]| {
            paths
                .iter()
                .map(KeyPath::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        };
        write!(
            f,
            "missing: [{}]; unknown: [{}]",
            join(&self.missing),
            join(&self.unknown)
        )
    }
}
