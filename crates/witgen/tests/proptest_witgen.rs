//! Property-based tests for identifier sanitization, integer width inference
//! and generation determinism.

use proptest::prelude::*;
use serde_json::{Value, json};
use witgen::ir::WitType;
use witgen::mapper::integer_type;
use witgen::naming::{is_reserved, to_wit_identifier};
use witgen::schema::IntegerBounds;
use witgen::{GeneratorOptions, generate};

fn is_valid_identifier(ident: &str) -> bool {
    !ident.is_empty()
        && ident.split('-').all(|fragment| {
            fragment.starts_with(|c: char| c.is_ascii_lowercase())
                && fragment
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}

/// Inclusive range of each integer type, in the order widths are tried.
fn width_range(ty: &WitType) -> (i128, i128) {
    match ty {
        WitType::U8 => (0, u8::MAX.into()),
        WitType::U16 => (0, u16::MAX.into()),
        WitType::U32 => (0, u32::MAX.into()),
        WitType::U64 => (0, u64::MAX.into()),
        WitType::S8 => (i8::MIN.into(), i8::MAX.into()),
        WitType::S16 => (i16::MIN.into(), i16::MAX.into()),
        WitType::S32 => (i32::MIN.into(), i32::MAX.into()),
        WitType::S64 => (i64::MIN.into(), i64::MAX.into()),
        other => panic!("not an integer type: {other}"),
    }
}

fn narrower(ty: &WitType) -> Option<WitType> {
    match ty {
        WitType::U16 => Some(WitType::U8),
        WitType::U32 => Some(WitType::U16),
        WitType::U64 => Some(WitType::U32),
        WitType::S16 => Some(WitType::S8),
        WitType::S32 => Some(WitType::S16),
        WitType::S64 => Some(WitType::S32),
        _ => None,
    }
}

// Strategy: identifier-ish text mixing cases, digits and separators
fn arb_name() -> impl Strategy<Value = String> {
    prop_oneof![
        ".*",
        "[a-zA-Z0-9_/.:# -]{0,40}",
        Just("type".to_string()),
        Just("list".to_string()),
        Just("https://example.com/Schema.v2".to_string()),
    ]
}

// Strategy: small object schemas with nested objects, arrays and unions
fn arb_schema() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(json!({"type": "string"})),
        Just(json!({"type": "boolean"})),
        (any::<i16>(), any::<u16>()).prop_map(|(min, span)| {
            json!({"type": "integer", "minimum": min, "maximum": i32::from(min) + i32::from(span)})
        }),
        Just(json!({"enum": ["a", "b", "list"]})),
        Just(json!({"$ref": "#/definitions/D0"})),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::btree_map("[a-z][a-zA-Z]{0,6}", inner.clone(), 1..4).prop_map(
                |props| {
                    let required: Vec<&String> = props.keys().take(1).collect();
                    json!({"type": "object", "properties": props, "required": required})
                }
            ),
            inner
                .clone()
                .prop_map(|items| json!({"type": "array", "items": items})),
            prop::collection::vec(inner, 2..4).prop_map(|alts| json!({"anyOf": alts})),
        ]
    })
}

fn arb_document() -> impl Strategy<Value = Value> {
    prop::collection::vec(arb_schema(), 1..4).prop_map(|schemas| {
        let definitions: serde_json::Map<String, Value> = schemas
            .into_iter()
            .enumerate()
            .map(|(i, schema)| (format!("D{i}"), schema))
            .collect();
        json!({ "definitions": definitions })
    })
}

proptest! {
    /// Property: sanitized identifiers are valid kebab-case and never keywords
    #[test]
    fn proptest_identifier_validity(name in arb_name()) {
        let ident = to_wit_identifier(&name);

        prop_assert!(is_valid_identifier(&ident), "invalid identifier {:?} from {:?}", ident, name);
        prop_assert!(!is_reserved(&ident));
    }

    /// Property: sanitization is deterministic and idempotent
    #[test]
    fn proptest_identifier_idempotent(name in arb_name()) {
        let once = to_wit_identifier(&name);

        prop_assert_eq!(to_wit_identifier(&name), once.clone());
        prop_assert_eq!(to_wit_identifier(&once), once);
    }

    /// Property: the chosen width covers the range and no narrower width does
    #[test]
    fn proptest_integer_width_minimality(a in any::<i64>(), b in any::<i64>()) {
        let (min, max) = (i128::from(a.min(b)), i128::from(a.max(b)));
        let ty = integer_type(IntegerBounds { min: Some(min), max: Some(max) });

        let (low, high) = width_range(&ty);
        prop_assert!(low <= min && max <= high, "{} does not cover [{}, {}]", ty, min, max);
        if let Some(smaller) = narrower(&ty) {
            let (low, high) = width_range(&smaller);
            prop_assert!(min < low || max > high, "{} would also cover [{}, {}]", smaller, min, max);
        }
        prop_assert_eq!(matches!(ty, WitType::U8 | WitType::U16 | WitType::U32 | WitType::U64), min >= 0);
    }

    /// Property: generating twice yields byte-identical output
    #[test]
    fn proptest_generate_deterministic(document in arb_document()) {
        let options = GeneratorOptions::default();

        let first = generate(&document, &options).unwrap();
        let second = generate(&document, &options).unwrap();

        prop_assert_eq!(first, second);
    }

    /// Property: every generated document passes the required-field invariant
    #[test]
    fn proptest_required_fields_not_optional(document in arb_document()) {
        let generated = witgen::Generator::default().build(&document).unwrap();

        for (key, schema) in document["definitions"].as_object().unwrap() {
            let Some(witgen::TypeDefinition::Record(record)) =
                generated.type_named(&to_wit_identifier(key))
            else {
                continue;
            };
            let required: Vec<String> = schema["required"]
                .as_array()
                .map(|r| r.iter().filter_map(Value::as_str).map(to_wit_identifier).collect())
                .unwrap_or_default();
            for field in &record.fields {
                prop_assert_eq!(field.optional, !required.contains(&field.name));
            }
        }
    }
}
