//! # Result Policies
//!
//! The four ways of consuming a traversal:
//!
//! | Policy              | Walk   | Collects                                   |
//! |---------------------|--------|--------------------------------------------|
//! | [`FailFast`]        | keys   | nothing; the first violation is an error   |
//! | [`CollectMissing`]  | fields | field paths whose key is absent            |
//! | [`CollectUnknown`]  | keys   | key paths that match no field              |
//! | [`CollectExisting`] | fields | field paths whose key is present (or excused) |
//!
//! A shape mismatch is the only finding every policy handles: fail-fast
//! raises [`CheckError::ShapeMismatch`], the field-walking collectors record
//! the expected type's name, and the unknown-key collector records the key
//! path of the offending value.

use std::convert::Infallible;

use keycheck_core::{CheckError, Expected, Frame, KeyPath};

use crate::reconcile::{Cursor, Policy, Walk};

/// Stop at the first unknown key, tag mismatch or shape mismatch.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailFast;

impl Policy for FailFast {
    type Error = CheckError;
    const WALK: Walk = Walk::Keys;

    fn on_unknown_key(&mut self, _key_path: KeyPath, key: &str) -> Result<(), CheckError> {
        Err(CheckError::UnknownKey {
            key: key.to_string(),
        })
    }

    fn on_tag_mismatch(&mut self, _parent: &KeyPath, key: &str, tag: &str) -> Result<(), CheckError> {
        Err(CheckError::TagMismatch {
            key: key.to_string(),
            tag: tag.to_string(),
        })
    }

    fn on_shape_mismatch(
        &mut self,
        _at: &Cursor,
        type_name: &str,
        expected: Expected,
    ) -> Result<(), CheckError> {
        Err(CheckError::ShapeMismatch {
            type_name: type_name.to_string(),
            expected,
        })
    }

    fn nest(error: CheckError, frame: Frame) -> CheckError {
        error.nested(frame)
    }
}

/// Field paths whose key is absent.
#[derive(Debug, Clone, Default)]
pub struct CollectMissing(Vec<KeyPath>);

impl CollectMissing {
    /// The collected paths, in traversal order.
    pub fn into_paths(self) -> Vec<KeyPath> {
        self.0
    }
}

impl Policy for CollectMissing {
    type Error = Infallible;
    const WALK: Walk = Walk::Fields;

    fn on_missing(&mut self, field_path: &KeyPath) {
        self.0.push(field_path.clone());
    }

    fn on_shape_mismatch(&mut self, _at: &Cursor, type_name: &str, _: Expected) -> Result<(), Infallible> {
        self.0.push(KeyPath::from(type_name));
        Ok(())
    }

    fn nest(error: Infallible, _frame: Frame) -> Infallible {
        error
    }
}

/// Field paths whose key is present, plus absent fields the omit-empty
/// policy excuses.
#[derive(Debug, Clone, Default)]
pub struct CollectExisting(Vec<KeyPath>);

impl CollectExisting {
    /// The collected paths, in traversal order.
    pub fn into_paths(self) -> Vec<KeyPath> {
        self.0
    }
}

impl Policy for CollectExisting {
    type Error = Infallible;
    const WALK: Walk = Walk::Fields;

    fn on_found(&mut self, field_path: &KeyPath) {
        self.0.push(field_path.clone());
    }

    fn on_excused(&mut self, field_path: &KeyPath) {
        self.0.push(field_path.clone());
    }

    fn on_shape_mismatch(&mut self, _at: &Cursor, type_name: &str, _: Expected) -> Result<(), Infallible> {
        self.0.push(KeyPath::from(type_name));
        Ok(())
    }

    fn nest(error: Infallible, _frame: Frame) -> Infallible {
        error
    }
}

/// Key paths that match no field.
///
/// A key naming a renamed field by its plain name is recorded as
/// `parent.[tag]`.
#[derive(Debug, Clone, Default)]
pub struct CollectUnknown(Vec<KeyPath>);

impl CollectUnknown {
    /// The collected paths, in document order.
    pub fn into_paths(self) -> Vec<KeyPath> {
        self.0
    }
}

impl Policy for CollectUnknown {
    type Error = Infallible;
    const WALK: Walk = Walk::Keys;

    fn on_unknown_key(&mut self, key_path: KeyPath, _key: &str) -> Result<(), Infallible> {
        self.0.push(key_path);
        Ok(())
    }

    fn on_tag_mismatch(&mut self, parent: &KeyPath, _key: &str, tag: &str) -> Result<(), Infallible> {
        self.0.push(parent.join_expected_tag(tag));
        Ok(())
    }

    fn on_shape_mismatch(&mut self, at: &Cursor, type_name: &str, _: Expected) -> Result<(), Infallible> {
        // The root has no key path of its own.
        let path = if at.key_path.is_root() {
            KeyPath::from(type_name)
        } else {
            at.key_path.clone()
        };
        self.0.push(path);
        Ok(())
    }

    fn nest(error: Infallible, _frame: Frame) -> Infallible {
        error
    }
}
