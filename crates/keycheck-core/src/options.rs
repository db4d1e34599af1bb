//! # Check Options — Suppression Lists and the Omit-Empty Policy
//!
//! [`CheckOptions`] is the explicit configuration value threaded through
//! every check. It bundles:
//!
//! - **Field suppressions**: dotted schema field paths excluded from the
//!   missing and existing reports. Each entry is stored lower-cased together
//!   with its depth (segment count) so that a field is only compared against
//!   entries registered for its own nesting level.
//! - **Key suppressions**: dotted JSON key paths excluded from the unknown
//!   key report and from fail-fast validation. Ships with one default entry,
//!   `config`.
//! - **Omit-empty policy**: whether fields declared omit-tolerant are
//!   excused from the missing report. Enabled by default.
//!
//! The setters keep replace-or-clear semantics: an empty list clears,
//! a non-empty list replaces wholesale. Options can also be loaded from a
//! YAML or JSON configuration document.
//!
//! ## Thread Safety
//!
//! Checks only ever borrow options immutably, so one value can be shared
//! across threads. Changing suppressions means building a new value (or
//! mutating one the caller exclusively owns) between checks.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::path::{segment_count, KeyPath};

/// The key suppression every fresh [`CheckOptions`] starts with.
pub const DEFAULT_IGNORED_KEY: &str = "config";

/// A suppressed field path with its precomputed depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSuppression {
    path: String,
    depth: usize,
}

impl FieldSuppression {
    /// Build an entry from a dotted field path; the path is lower-cased.
    pub fn new(path: &str) -> Self {
        let path = path.to_lowercase();
        let depth = segment_count(&path);
        Self { path, depth }
    }

    /// The lower-cased dotted path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Number of segments in the path.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Configuration consulted, read-only, by every check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OptionsDocument", into = "OptionsDocument")]
pub struct CheckOptions {
    fields_to_ignore: Vec<FieldSuppression>,
    keys_to_ignore: Vec<String>,
    omit_empty: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            fields_to_ignore: Vec::new(),
            keys_to_ignore: vec![DEFAULT_IGNORED_KEY.to_string()],
            omit_empty: true,
        }
    }
}

impl CheckOptions {
    /// Options with the default suppressions and the omit-empty policy on.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the field suppression list; an empty list clears it.
    pub fn set_fields_to_ignore<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.fields_to_ignore = paths
            .into_iter()
            .map(|p| FieldSuppression::new(p.as_ref()))
            .collect();
    }

    /// Replace the key suppression list; an empty list clears it,
    /// including the default `config` entry.
    pub fn set_keys_to_ignore<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.keys_to_ignore = paths
            .into_iter()
            .map(|p| p.as_ref().to_lowercase())
            .collect();
    }

    /// Set the omit-empty policy, or toggle it when `explicit` is `None`.
    pub fn set_omit_empty_policy(&mut self, explicit: Option<bool>) {
        self.omit_empty = explicit.unwrap_or(!self.omit_empty);
    }

    /// Builder form of [`set_fields_to_ignore`](Self::set_fields_to_ignore).
    pub fn with_fields_to_ignore<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_fields_to_ignore(paths);
        self
    }

    /// Builder form of [`set_keys_to_ignore`](Self::set_keys_to_ignore).
    pub fn with_keys_to_ignore<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_keys_to_ignore(paths);
        self
    }

    /// Builder form of [`set_omit_empty_policy`](Self::set_omit_empty_policy).
    pub fn with_omit_empty_policy(mut self, explicit: Option<bool>) -> Self {
        self.set_omit_empty_policy(explicit);
        self
    }

    /// Whether omit-tolerant fields are excused from the missing report.
    pub fn omit_empty(&self) -> bool {
        self.omit_empty
    }

    /// The registered field suppressions.
    pub fn fields_to_ignore(&self) -> &[FieldSuppression] {
        &self.fields_to_ignore
    }

    /// The registered key suppressions, lower-cased.
    pub fn keys_to_ignore(&self) -> &[String] {
        &self.keys_to_ignore
    }

    /// Whether the field `field_name` directly under the field path `parent`
    /// is suppressed.
    ///
    /// Only entries whose depth equals the field's own depth are compared.
    pub fn is_field_ignored(&self, parent: &KeyPath, field_name: &str) -> bool {
        if self.fields_to_ignore.is_empty() {
            return false;
        }
        let depth = parent.depth() + 1;
        let candidate = parent.join(&field_name.to_lowercase()).to_lowercase();
        self.fields_to_ignore
            .iter()
            .filter(|s| s.depth == depth)
            .any(|s| s.path == candidate)
    }

    /// Whether the lower-cased JSON key `key` directly under the key path
    /// `parent` is suppressed.
    pub fn is_key_ignored(&self, parent: &KeyPath, key: &str) -> bool {
        if self.keys_to_ignore.is_empty() {
            return false;
        }
        let candidate = parent.join(key);
        self.keys_to_ignore
            .iter()
            .any(|k| candidate.as_str() == k.as_str())
    }

    /// Load options from a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the text is not a valid options document.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_yaml::from_str(text)?;
        tracing::debug!(
            fields = options.fields_to_ignore.len(),
            keys = options.keys_to_ignore.len(),
            omit_empty = options.omit_empty,
            "loaded check options"
        );
        Ok(options)
    }

    /// Load options from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if the text is not a valid options document.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// On-disk shape of [`CheckOptions`]. Every key is optional; an absent key
/// keeps the default, a present empty list clears.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct OptionsDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fields_to_ignore: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    keys_to_ignore: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    omit_empty: Option<bool>,
}

impl From<OptionsDocument> for CheckOptions {
    fn from(doc: OptionsDocument) -> Self {
        let mut options = CheckOptions::default();
        if let Some(fields) = doc.fields_to_ignore {
            options.set_fields_to_ignore(fields);
        }
        if let Some(keys) = doc.keys_to_ignore {
            options.set_keys_to_ignore(keys);
        }
        if let Some(omit_empty) = doc.omit_empty {
            options.set_omit_empty_policy(Some(omit_empty));
        }
        options
    }
}

impl From<CheckOptions> for OptionsDocument {
    fn from(options: CheckOptions) -> Self {
        Self {
            fields_to_ignore: Some(
                options
                    .fields_to_ignore
                    .into_iter()
                    .map(|s| s.path)
                    .collect(),
            ),
            keys_to_ignore: Some(options.keys_to_ignore),
            omit_empty: Some(options.omit_empty),
        }
    }
}
