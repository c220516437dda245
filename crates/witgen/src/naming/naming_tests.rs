#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

// to_wit_identifier tests

#[test_case("ListToolsRequest", "list-tools-request" ; "pascal case")]
#[test_case("listChanged", "list-changed" ; "camel case")]
#[test_case("HTTPServer", "http-server" ; "acronym boundary")]
#[test_case("v2Beta", "v2-beta" ; "digit then upper")]
#[test_case("list_changed", "list-changed" ; "snake case")]
#[test_case("tools/call", "tools-call" ; "path separator")]
#[test_case("com.example:widget", "com-example-widget" ; "dot and colon")]
#[test_case("https://example.com/schema", "example-com-schema" ; "url scheme stripped")]
#[test_case("--weird__name--", "weird-name" ; "collapses and trims dashes")]
#[test_case("hello world!", "hello-world" ; "whitespace and punctuation")]
#[test_case("Widget", "widget" ; "single word")]
fn to_wit_identifier___converts(input: &str, expected: &str) {
    assert_eq!(to_wit_identifier(input), expected);
}

#[test_case("2024-11-05", "n20241105" ; "leading digit prefixed and fragments joined")]
#[test_case("3d", "n3d" ; "leading digit")]
#[test_case("level-1", "level1" ; "numeric fragment joins previous")]
fn to_wit_identifier___digit_fragments___stay_valid(input: &str, expected: &str) {
    assert_eq!(to_wit_identifier(input), expected);
}

#[test_case("" ; "empty")]
#[test_case("$$$" ; "only symbols")]
#[test_case("日本" ; "non ascii")]
fn to_wit_identifier___nothing_left___returns_placeholder(input: &str) {
    assert_eq!(to_wit_identifier(input), EMPTY_IDENTIFIER);
}

#[test_case("type", "type-value")]
#[test_case("list", "list-value")]
#[test_case("String", "string-value")]
#[test_case("U8", "u8-value")]
#[test_case("error_context", "error-context-value")]
fn to_wit_identifier___reserved___gets_suffix(input: &str, expected: &str) {
    assert_eq!(to_wit_identifier(input), expected);
}

#[test]
fn to_wit_identifier___is_deterministic() {
    let input = "CallToolRequest/params.arguments";

    assert_eq!(to_wit_identifier(input), to_wit_identifier(input));
}

// to_function_name tests

#[test]
fn to_function_name___keyword___escaped_not_suffixed() {
    assert_eq!(to_function_name("list"), "%list");
}

#[test]
fn to_function_name___plain_action___unchanged() {
    assert_eq!(to_function_name("call"), "call");
    assert_eq!(to_function_name("handle-list"), "handle-list");
}

#[test]
fn to_kebab_label___keyword___left_bare() {
    assert_eq!(to_kebab_label("list"), "list");
    assert_eq!(to_kebab_label("setLevel"), "set-level");
}

#[test]
fn to_function_name___nested_action___dashed() {
    assert_eq!(to_function_name("tools/list_changed"), "tools-list-changed");
}

// capitalize / singularize tests

#[test]
fn capitalize___capitalizes_first_letter() {
    assert_eq!(capitalize("tools"), "Tools");
    assert_eq!(capitalize("a"), "A");
    assert_eq!(capitalize(""), "");
}

#[test]
fn singularize___strips_one_trailing_s() {
    assert_eq!(singularize("tools"), "tool");
    assert_eq!(singularize("resources"), "resource");
    assert_eq!(singularize("class"), "clas");
    assert_eq!(singularize("completion"), "completion");
}

// UniqueNames tests

#[test]
fn UniqueNames___first_claim___returns_base() {
    let mut names = UniqueNames::new();

    assert_eq!(names.claim("foo"), "foo");
}

#[test]
fn UniqueNames___repeated_claims___get_numbered() {
    let mut names = UniqueNames::new();

    names.claim("foo");

    assert_eq!(names.claim("foo"), "foo2");
    assert_eq!(names.claim("foo"), "foo3");
}

#[test]
fn UniqueNames___numbered_candidate_skips_keywords() {
    let mut names = UniqueNames::new();
    for _ in 0..7 {
        names.claim("s");
    }

    // s, s2 .. s7 are taken; s8 is a keyword.
    assert_eq!(names.claim("s"), "s9");
}

#[test]
fn UniqueNames___reserved_name___is_not_handed_out() {
    let mut names = UniqueNames::new();
    names.reserve("protocol-error");

    assert!(names.contains("protocol-error"));
    assert_eq!(names.claim("protocol-error"), "protocol-error2");
}
