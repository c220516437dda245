#![allow(non_snake_case)]

use super::*;
use std::path::PathBuf;
use tempfile::TempDir;
use witgen::RecursionPolicy;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

// load_options tests

#[test]
fn load_options___no_flags___returns_defaults() {
    let options = load_options(&GenerateArgs::default()).unwrap();

    assert_eq!(options, GeneratorOptions::default());
}

#[test]
fn load_options___config_file___is_applied() {
    let dir = TempDir::new().unwrap();
    let config = write(
        &dir,
        "witgen.toml",
        "package = \"acme:api@2.0.0\"\ndoc_width = 60\nrecursion = \"reject\"\n",
    );
    let args = GenerateArgs {
        config: Some(config),
        ..GenerateArgs::default()
    };

    let options = load_options(&args).unwrap();

    assert_eq!(options.package, "acme:api@2.0.0");
    assert_eq!(options.doc_width, 60);
    assert_eq!(options.recursion, RecursionPolicy::Reject);
    assert!(options.emit_docs);
}

#[test]
fn load_options___flags___override_config_file() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "witgen.toml", "package = \"acme:api\"\nemit_docs = true\n");
    let args = GenerateArgs {
        config: Some(config),
        package: Some("acme:other@1.0.0".into()),
        no_docs: true,
        doc_width: Some(100),
        recursion: Some(RecursionPolicy::JsonString),
        dedupe_inline_types: true,
        ..GenerateArgs::default()
    };

    let options = load_options(&args).unwrap();

    assert_eq!(options.package, "acme:other@1.0.0");
    assert!(!options.emit_docs);
    assert_eq!(options.doc_width, 100);
    assert!(options.dedupe_inline_types);
}

#[test]
fn load_options___invalid_package___returns_options_error() {
    let args = GenerateArgs {
        package: Some("no-colon".into()),
        ..GenerateArgs::default()
    };

    let err = load_options(&args).unwrap_err();

    assert_eq!(err.downcast_ref::<witgen::GenerateError>().map(|e| e.exit_code()), Some(2));
}

#[test]
fn load_options___missing_config___reports_path() {
    let args = GenerateArgs {
        config: Some(PathBuf::from("/nonexistent/witgen.toml")),
        ..GenerateArgs::default()
    };

    let err = load_options(&args).unwrap_err();

    assert!(format!("{err:#}").contains("/nonexistent/witgen.toml"));
}

// read_schema tests

#[test]
fn read_schema___valid_file___parses_json() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "schema.json", r#"{"definitions": {}}"#);

    let schema = read_schema(path.to_str().unwrap()).unwrap();

    assert!(schema["definitions"].is_object());
}

#[test]
fn read_schema___malformed_json___reports_parse_failure() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "schema.json", "{ not json");

    let err = read_schema(path.to_str().unwrap()).unwrap_err();

    assert!(err.to_string().starts_with("Failed to parse JSON schema"));
}

// run tests

#[test]
fn run___output_path___writes_document() {
    let dir = TempDir::new().unwrap();
    let input = write(
        &dir,
        "schema.json",
        r#"{"definitions": {"Mode": {"enum": ["a", "b"]}}}"#,
    );
    let output = dir.path().join("out.wit");
    let args = GenerateArgs {
        input: Some(input.to_str().unwrap().to_string()),
        output: Some(output.clone()),
        ..GenerateArgs::default()
    };

    run(&args).unwrap();

    let wit = fs::read_to_string(output).unwrap();
    assert!(wit.contains("enum mode { a, b }"));
}
