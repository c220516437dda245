#![allow(non_snake_case)]

use super::*;
use crate::ir::{Alias, Case, Enum, Field, Record, Variant, WitType};

fn document(types: Vec<TypeDefinition>, interfaces: Vec<Interface>) -> Document {
    Document {
        package: "mcp:protocol@0.1.0".into(),
        types,
        interfaces,
    }
}

fn field(name: &str, ty: WitType, optional: bool) -> Field {
    Field {
        name: name.into(),
        ty,
        optional,
        docs: None,
    }
}

// render tests

#[test]
fn render___empty_document___has_header_package_and_types_block() {
    let wit = render(&document(vec![], vec![]), &GeneratorOptions::default());

    assert_eq!(
        wit,
        "// Generated by witgen from a JSON Schema document.\n\
         // Do not edit by hand.\n\
         \n\
         package mcp:protocol@0.1.0;\n\
         \n\
         interface types {\n\
         }\n"
    );
}

#[test]
fn render___record___lists_fields_with_optional_wrapping() {
    let widget = TypeDefinition::Record(Record {
        name: "widget".into(),
        fields: vec![
            field("id", WitType::U8, false),
            field("label", WitType::String, true),
        ],
        docs: Some("A widget.".into()),
    });

    let wit = render(&document(vec![widget], vec![]), &GeneratorOptions::default());

    assert!(wit.contains(
        "    /// A widget.\n    record widget {\n        id: u8,\n        label: option<string>,\n    }\n"
    ));
}

#[test]
fn render___variant___renders_unit_and_payload_cases() {
    let content = TypeDefinition::Variant(Variant {
        name: "content".into(),
        cases: vec![
            Case {
                name: "none".into(),
                payload: None,
                docs: None,
            },
            Case {
                name: "text".into(),
                payload: Some(WitType::Named("text-content".into())),
                docs: None,
            },
        ],
        docs: None,
    });

    let wit = render(&document(vec![content], vec![]), &GeneratorOptions::default());

    assert!(wit.contains("    variant content {\n        none,\n        text(text-content),\n    }\n"));
}

#[test]
fn render___short_enum_without_docs___fits_on_one_line() {
    let mode = TypeDefinition::Enum(Enum {
        name: "mode".into(),
        values: vec!["a".into(), "b".into()],
        docs: None,
    });

    let wit = render(&document(vec![mode], vec![]), &GeneratorOptions::default());

    assert!(wit.contains("    enum mode { a, b }\n"));
}

#[test]
fn render___documented_enum___uses_block_form() {
    let mode = TypeDefinition::Enum(Enum {
        name: "mode".into(),
        values: vec!["a".into(), "b".into()],
        docs: Some("Mode.".into()),
    });

    let wit = render(&document(vec![mode], vec![]), &GeneratorOptions::default());

    assert!(wit.contains("    /// Mode.\n    enum mode {\n        a,\n        b,\n    }\n"));
}

#[test]
fn render___docs_disabled___omits_comments() {
    let alias = TypeDefinition::Alias(Alias {
        name: "cursor".into(),
        target: WitType::String,
        docs: Some("Opaque cursor.".into()),
    });
    let options = GeneratorOptions {
        emit_docs: false,
        ..GeneratorOptions::default()
    };

    let wit = render(&document(vec![alias], vec![]), &options);

    assert!(wit.contains("    type cursor = string;\n"));
    assert!(!wit.contains("///"));
}

#[test]
fn render___interface___has_use_line_and_signatures() {
    let tools = Interface {
        name: "tools".into(),
        uses: vec!["protocol-error".into(), "list-tools-request".into()],
        functions: vec![Function {
            name: "%list".into(),
            request: WitType::Named("list-tools-request".into()),
            response: WitType::String,
            docs: None,
        }],
    };

    let wit = render(&document(vec![], vec![tools]), &GeneratorOptions::default());

    assert!(wit.ends_with(
        "\ninterface tools {\n    use types.{protocol-error, list-tools-request};\n\n    \
         %list: func(request: list-tools-request) -> result<string, protocol-error>;\n}\n"
    ));
}

// wrap_doc tests

#[test]
fn wrap_doc___long_text___respects_width() {
    let text = "The server's response to a tools/list request from the client, with pagination.";

    let lines = wrap_doc(text, "    ", 40);

    assert!(lines.len() > 1);
    for line in &lines {
        assert!(line.len() <= 40, "line too long: {line:?}");
        assert!(line.starts_with("    /// "));
    }
    let rejoined: Vec<&str> = lines.iter().map(|l| &l[8..]).collect();
    assert_eq!(rejoined.join(" "), text);
}

#[test]
fn wrap_doc___paragraphs___are_separated_by_empty_comment() {
    let lines = wrap_doc("First.\n\nSecond.", "", 80);

    assert_eq!(lines, ["/// First.", "///", "/// Second."]);
}

#[test]
fn wrap_doc___overlong_word___gets_own_line() {
    let lines = wrap_doc("see https://example.com/a/very/long/link/that/cannot/break", "", 20);

    assert_eq!(
        lines,
        ["/// see", "/// https://example.com/a/very/long/link/that/cannot/break"]
    );
}

#[test]
fn wrap_doc___blank_text___yields_nothing() {
    assert!(wrap_doc("  \n\n ", "", 80).is_empty());
}

#[test]
fn wrap_doc___overlong_first_word___following_words_start_new_line() {
    let lines = wrap_doc("https://example.com/a/very/long/link then more", "", 20);

    assert_eq!(
        lines,
        ["/// https://example.com/a/very/long/link", "/// then more"]
    );
}
