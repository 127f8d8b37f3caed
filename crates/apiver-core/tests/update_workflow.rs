//! End-to-end behaviour of a single-file update.

use std::fs;

use apiver_core::{resolve, update_file_to, ConfigDocument, ErrorKind};
use chrono::NaiveDate;
use toml::Value;

const EXTENSION_TOML: &str = r#"
name = "Test Extension"
type = "product_discounts"
api_version = "2022-10"

[build]
command = "cargo wasi build --release"
path = "target/wasm32-wasi/release/test-extension.wasm"

[ui.paths]
create = "/test-extension/new"
details = "/test-extension/:id"
"#;

const NESTED_TOML: &str = r#"
name = "Nested"
api_version = "2023-01"
handle = "nested-ext"
tags = ["a", "b", 3]

[build]
command = "npm run build"
watch = ["src/**/*.ts", "schema.graphql"]

[input.variables]
query = "input.graphql"
enabled = true
retries = 2

[[targeting]]
target = "purchase.payment-customization.run"
input_query = "src/run.graphql"

[[targeting]]
target = "purchase.payment-customization.fetch"
input_query = "src/fetch.graphql"
"#;

fn may_15_2024() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
}

#[test]
fn mid_quarter_date_rewrites_to_quarter_start() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shopify.extension.toml");
    fs::write(&path, EXTENSION_TOML).unwrap();

    let version = resolve(&may_15_2024());
    update_file_to(&path, &version).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("api_version = \"2024-04\""), "got:\n{text}");

    let doc = ConfigDocument::parse(&text).unwrap();
    assert_eq!(doc.get("name"), Some(&Value::String("Test Extension".into())));
    let build = doc.get("build").and_then(Value::as_table).unwrap();
    assert_eq!(build["command"].as_str(), Some("cargo wasi build --release"));
    assert_eq!(
        build["path"].as_str(),
        Some("target/wasm32-wasi/release/test-extension.wasm")
    );
}

#[test]
fn every_other_key_survives_with_equal_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shopify.extension.toml");
    fs::write(&path, NESTED_TOML).unwrap();
    let before = ConfigDocument::parse(NESTED_TOML).unwrap();

    update_file_to(&path, &resolve(&may_15_2024())).unwrap();
    let after = ConfigDocument::parse(&fs::read_to_string(&path).unwrap()).unwrap();

    for key in before.keys() {
        if key == "api_version" {
            continue;
        }
        assert_eq!(before.get(key), after.get(key), "key {key} changed");
    }
    assert_eq!(before.keys().count(), after.keys().count());
    assert_eq!(after.api_version(), Some("2024-04"));
}

#[test]
fn applying_twice_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shopify.extension.toml");
    fs::write(&path, NESTED_TOML).unwrap();
    let version = resolve(&may_15_2024());

    let first = update_file_to(&path, &version).unwrap();
    let after_first = fs::read_to_string(&path).unwrap();
    let second = update_file_to(&path, &version).unwrap();
    let after_second = fs::read_to_string(&path).unwrap();

    assert!(first.changed);
    assert!(!second.changed);
    assert_eq!(second.previous.as_deref(), Some("2024-04"));
    assert_eq!(after_first, after_second);
}

#[test]
fn missing_api_version_is_inserted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shopify.extension.toml");
    fs::write(&path, "name = \"fresh\"\n\n[build]\ncommand = \"make\"\n").unwrap();

    let outcome = update_file_to(&path, &resolve(&may_15_2024())).unwrap();
    assert!(outcome.previous.is_none());

    let doc = ConfigDocument::parse(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc.api_version(), Some("2024-04"));
    assert_eq!(doc.get("name").and_then(Value::as_str), Some("fresh"));
}

#[test]
fn error_kinds_are_distinguishable() {
    let dir = tempfile::tempdir().unwrap();
    let version = resolve(&may_15_2024());

    let missing = update_file_to(&dir.path().join("missing.toml"), &version).unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::Read);

    let bad = dir.path().join("bad.toml");
    fs::write(&bad, "api_version = [").unwrap();
    assert_eq!(update_file_to(&bad, &version).unwrap_err().kind(), ErrorKind::Parse);

    let not_utf8 = dir.path().join("binary.toml");
    fs::write(&not_utf8, [0xff, 0xfe, 0x00]).unwrap();
    assert_eq!(
        update_file_to(&not_utf8, &version).unwrap_err().kind(),
        ErrorKind::Read
    );
}
