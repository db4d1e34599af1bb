//! # Checks Against Derived Schemas
//!
//! Schemas produced by `#[derive(JsonSchema)]` are imported through
//! [`StructSchema::from_json_schema`] and used to check documents, the way
//! a service would check its configuration against its own types.
//!
//! Set `RUST_LOG=keycheck_schema=debug` to see the per-check events.

#![allow(dead_code)]

use keycheck_core::{CheckOptions, KeyPath};
use keycheck_schema::{KeyChecker, Shape, StructSchema};
use schemars::{schema_for, JsonSchema};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(JsonSchema)]
struct Home {
    addr: String,
    port: u16,
}

#[derive(JsonSchema)]
struct ServiceConfig {
    id: String,
    homes: Vec<Home>,
    backup: Option<Home>,
    notes: Option<String>,
}

#[derive(JsonSchema)]
struct Node {
    value: i64,
    children: Vec<Node>,
}

fn derived<T: JsonSchema>() -> StructSchema {
    let document = serde_json::to_value(schema_for!(T)).unwrap();
    StructSchema::from_json_schema(&document).unwrap()
}

fn paths(found: Vec<KeyPath>) -> Vec<String> {
    found.into_iter().map(KeyPath::into_string).collect()
}

#[test]
fn derived_schema_shape() {
    let schema = derived::<ServiceConfig>();
    assert_eq!(schema.type_name(), "ServiceConfig");

    let fields = schema.fields();
    let names: Vec<&str> = fields.iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["id", "homes", "backup", "notes"]);
    assert!(!fields[0].is_omit_empty());
    assert!(!fields[1].is_omit_empty());
    assert!(fields[2].is_omit_empty());
    assert!(fields[3].is_omit_empty());
    assert_eq!(fields[1].shape().type_name(), "Vec<Home>");
    assert_eq!(fields[2].shape().type_name(), "Home");
    assert_eq!(fields[3].shape(), &Shape::Scalar);
}

#[test]
fn derived_schema_reports() {
    init_tracing();
    let checker = KeyChecker::new(derived::<ServiceConfig>());

    let full = br#"{"id":"svc","homes":[{"addr":"a","port":1}],"backup":{"addr":"b","port":2},"notes":"n"}"#;
    checker.validate(full).unwrap();
    assert_eq!(checker.existing_keys(full).unwrap(), checker.field_paths());

    let sparse = br#"{"id":"svc","homes":[{"addr":"a"},{"port":2,"weight":3}],"extra":true}"#;
    assert_eq!(
        paths(checker.missing_keys(sparse).unwrap()),
        vec!["homes.port", "homes.addr"]
    );
    assert_eq!(
        paths(checker.unknown_keys(sparse).unwrap()),
        vec!["homes.2.weight", "extra"]
    );
    assert_eq!(
        paths(checker.existing_keys(sparse).unwrap()),
        vec!["id", "homes", "homes.addr", "homes.port", "backup", "notes"]
    );
}

#[test]
fn derived_schema_optional_fields_without_omit_empty() {
    let options = CheckOptions::new().with_omit_empty_policy(Some(false));
    let checker = KeyChecker::with_options(derived::<ServiceConfig>(), options);
    let report = checker.check_all(br#"{"id":"svc","homes":[]}"#).unwrap();
    assert_eq!(paths(report.missing), vec!["backup", "notes"]);
    assert!(report.unknown.is_empty());
}

#[test]
fn derived_recursive_schema_imports() {
    init_tracing();
    let checker = KeyChecker::new(derived::<Node>());
    assert_eq!(checker.schema().fields()[0].name(), "value");
    checker
        .validate(br#"{"value":1,"children":[{"value":2,"children":[]}]}"#)
        .unwrap();
    assert_eq!(
        paths(checker.unknown_keys(br#"{"value":1,"children":[],"parent":null}"#).unwrap()),
        vec!["parent"]
    );
}
