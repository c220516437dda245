//! Read-only view over JSON Schema nodes.
//!
//! Every node is classified once into a [`SchemaShape`]; the mapper and the
//! generator match exhaustively on it instead of probing keywords ad hoc.
//! Classification follows a fixed precedence:
//!
//! 1. `$ref`
//! 2. `anyOf` / `oneOf` (collapsing to [`SchemaShape::ConstUnion`] when every
//!    alternative is a bare `const`)
//! 3. `allOf`
//! 4. `type` (a list of types becomes [`SchemaShape::TypeUnion`])
//! 5. shape fallbacks: `properties`, `enum`, `const`, `items`
//!
//! Anything else is [`SchemaShape::Opaque`].

use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::HashSet;

/// Top-level `definitions` of a document, keyed by their declared name.
pub type Definitions = Map<String, Value>;

static EMPTY_PROPERTIES: Lazy<Map<String, Value>> = Lazy::new(Map::new);

/// Deepest `allOf` / `$ref` chain followed while merging.
const MAX_MERGE_DEPTH: usize = 16;

/// Scalar types that map directly onto a WIT primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    /// `string` with `format: byte` (base64 on the wire)
    Bytes,
    Integer(IntegerBounds),
    Number,
    Boolean,
    Null,
}

/// Inclusive integer range declared by `minimum`/`maximum` and their exclusive forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntegerBounds {
    pub min: Option<i128>,
    pub max: Option<i128>,
}

/// The closed set of shapes the generator understands.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaShape<'a> {
    /// `$ref` pointer, unresolved
    Ref(&'a str),
    /// `anyOf`/`oneOf` where every alternative is a bare `const`
    ConstUnion(Vec<String>),
    /// `anyOf`/`oneOf` alternatives in declaration order
    Union(&'a [Value]),
    /// `allOf` branches in declaration order
    Intersection(&'a [Value]),
    /// `type` given as a list of more than one type name
    TypeUnion(Vec<&'a str>),
    /// `enum` of scalar literals (nulls dropped)
    Enum(Vec<String>),
    /// `const` without any other shape information
    Const(&'a Value),
    Primitive(Primitive),
    /// `array`, with its `items` schema when it is a single schema
    Array(Option<&'a Value>),
    /// `array` with positional `items` / `prefixItems`
    Tuple(&'a [Value]),
    /// object without properties whose `additionalProperties` is a schema
    Map(&'a Value),
    /// object with at least one property
    Object(&'a Map<String, Value>),
    /// free-form or unsupported
    Opaque,
}

/// Classify a schema node.
pub fn classify(node: &Value) -> SchemaShape<'_> {
    let Some(obj) = node.as_object() else {
        return SchemaShape::Opaque;
    };

    if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
        return SchemaShape::Ref(reference);
    }

    if let Some(alternatives) = union_alternatives(obj) {
        if alternatives.is_empty() {
            return SchemaShape::Opaque;
        }
        if let Some(values) = const_union_values(alternatives) {
            return SchemaShape::ConstUnion(values);
        }
        return SchemaShape::Union(alternatives);
    }

    if let Some(branches) = obj.get("allOf").and_then(Value::as_array) {
        if !branches.is_empty() {
            return SchemaShape::Intersection(branches);
        }
    }

    match obj.get("type") {
        Some(Value::String(ty)) => return classify_typed(node, ty),
        Some(Value::Array(types)) => {
            let types: Vec<&str> = types.iter().filter_map(Value::as_str).collect();
            match types.len() {
                0 => {}
                1 => return classify_typed(node, types[0]),
                _ => return SchemaShape::TypeUnion(types),
            }
        }
        _ => {}
    }

    if has_properties(node) {
        return classify_typed(node, "object");
    }
    if let Some(values) = enum_values(node) {
        return SchemaShape::Enum(values);
    }
    if let Some(value) = obj.get("const") {
        return SchemaShape::Const(value);
    }
    if obj.contains_key("items") || obj.contains_key("prefixItems") {
        return classify_typed(node, "array");
    }

    SchemaShape::Opaque
}

/// Classify `node` as though its `type` were exactly `ty`.
pub fn classify_typed<'a>(node: &'a Value, ty: &str) -> SchemaShape<'a> {
    match ty {
        "string" => {
            if let Some(values) = enum_values(node) {
                return SchemaShape::Enum(values);
            }
            if format(node) == Some("byte") {
                return SchemaShape::Primitive(Primitive::Bytes);
            }
            SchemaShape::Primitive(Primitive::String)
        }
        "integer" => SchemaShape::Primitive(Primitive::Integer(integer_bounds(node))),
        "number" => SchemaShape::Primitive(Primitive::Number),
        "boolean" => SchemaShape::Primitive(Primitive::Boolean),
        "null" => SchemaShape::Primitive(Primitive::Null),
        "array" => {
            if let Some(prefix) = node.get("prefixItems").and_then(Value::as_array) {
                if !prefix.is_empty() {
                    return SchemaShape::Tuple(prefix);
                }
            }
            match node.get("items") {
                Some(Value::Array(items)) if !items.is_empty() => SchemaShape::Tuple(items),
                Some(items @ Value::Object(_)) => SchemaShape::Array(Some(items)),
                _ => SchemaShape::Array(None),
            }
        }
        "object" => {
            if has_properties(node) {
                return SchemaShape::Object(properties(node));
            }
            match node.get("additionalProperties") {
                Some(value @ Value::Object(_)) => SchemaShape::Map(value),
                _ => SchemaShape::Opaque,
            }
        }
        _ => SchemaShape::Opaque,
    }
}

/// Shape name used for variant cases built from inline alternatives.
pub fn shape_name(node: &Value) -> &'static str {
    match classify(node) {
        SchemaShape::Ref(_) => "ref",
        SchemaShape::ConstUnion(_) | SchemaShape::Enum(_) => "enum",
        SchemaShape::Union(_) | SchemaShape::TypeUnion(_) => "union",
        SchemaShape::Intersection(_) | SchemaShape::Object(_) | SchemaShape::Map(_) => "object",
        SchemaShape::Const(_) => "const",
        SchemaShape::Primitive(Primitive::String | Primitive::Bytes) => "string",
        SchemaShape::Primitive(Primitive::Integer(_)) => "integer",
        SchemaShape::Primitive(Primitive::Number) => "number",
        SchemaShape::Primitive(Primitive::Boolean) => "boolean",
        SchemaShape::Primitive(Primitive::Null) => "null",
        SchemaShape::Array(_) | SchemaShape::Tuple(_) => "array",
        SchemaShape::Opaque => "value",
    }
}

fn union_alternatives(obj: &Map<String, Value>) -> Option<&[Value]> {
    obj.get("anyOf")
        .or_else(|| obj.get("oneOf"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
}

fn const_union_values(alternatives: &[Value]) -> Option<Vec<String>> {
    alternatives
        .iter()
        .map(|alt| {
            let obj = alt.as_object()?;
            if obj.contains_key("properties") || obj.contains_key("$ref") {
                return None;
            }
            obj.get("const").and_then(scalar_text)
        })
        .collect()
}

/// Returns true if `node` is a null-only schema.
pub fn is_null(node: &Value) -> bool {
    matches!(classify(node), SchemaShape::Primitive(Primitive::Null))
        || node.get("const").is_some_and(Value::is_null)
}

/// The single non-null alternative of a union, and whether a null alternative was present.
pub fn single_non_null(alternatives: &[Value]) -> Option<(&Value, bool)> {
    let mut non_null = alternatives.iter().filter(|alt| !is_null(alt));
    let inner = non_null.next()?;
    if non_null.next().is_some() {
        return None;
    }
    Some((inner, alternatives.len() > 1))
}

/// Scalar literals of an `enum`, rendered as text. `None` if absent or empty.
pub fn enum_values(node: &Value) -> Option<Vec<String>> {
    let values: Vec<String> = node
        .get("enum")?
        .as_array()?
        .iter()
        .filter_map(scalar_text)
        .collect();
    (!values.is_empty()).then_some(values)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn has_properties(node: &Value) -> bool {
    node.get("properties")
        .and_then(Value::as_object)
        .is_some_and(|props| !props.is_empty())
}

/// Declared properties in declaration order.
pub fn properties(node: &Value) -> &Map<String, Value> {
    node.get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&EMPTY_PROPERTIES)
}

/// Names listed in `required`.
pub fn required(node: &Value) -> HashSet<&str> {
    node.get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

pub fn description(node: &Value) -> Option<&str> {
    node.get("description")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|d| !d.is_empty())
}

pub fn format(node: &Value) -> Option<&str> {
    node.get("format").and_then(Value::as_str)
}

/// Integer range implied by the inclusive and exclusive bound keywords.
pub fn integer_bounds(node: &Value) -> IntegerBounds {
    let lower = [
        node.get("minimum").and_then(|v| bound(v, f64::ceil, 0)),
        node.get("exclusiveMinimum")
            .and_then(|v| bound(v, f64::floor, 1)),
    ];
    let upper = [
        node.get("maximum").and_then(|v| bound(v, f64::floor, 0)),
        node.get("exclusiveMaximum")
            .and_then(|v| bound(v, f64::ceil, -1)),
    ];

    IntegerBounds {
        min: lower.into_iter().flatten().max(),
        max: upper.into_iter().flatten().min(),
    }
}

fn bound(value: &Value, round: fn(f64) -> f64, offset: i128) -> Option<i128> {
    let Value::Number(n) = value else {
        return None;
    };
    let base = if let Some(i) = n.as_i64() {
        i128::from(i)
    } else if let Some(u) = n.as_u64() {
        i128::from(u)
    } else {
        let f = n.as_f64().filter(|f| f.is_finite())?;
        // Saturates; bounds that far out select the widest type either way.
        round(f) as i128
    };
    base.checked_add(offset)
}

/// Trailing path segment of a `$ref`, with JSON Pointer escapes decoded.
///
/// `#/definitions/Tool` → `Tool`, `#/$defs/a~1b` → `a/b`.
pub fn ref_name(reference: &str) -> &str {
    reference
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(reference)
}

/// Look up the definition a `$ref` points at.
pub fn resolve_ref<'a>(
    reference: &str,
    definitions: &'a Definitions,
) -> Option<(&'a str, &'a Value)> {
    let name = ref_name(reference).replace("~1", "/").replace("~0", "~");
    definitions
        .iter()
        .find(|(key, _)| **key == name)
        .map(|(key, value)| (key.as_str(), value))
}

/// Collect `definitions` and `$defs` of a document root, `definitions` first.
pub fn collect_definitions(root: &Value) -> Definitions {
    let mut definitions = Definitions::new();
    for key in ["definitions", "$defs"] {
        if let Some(map) = root.get(key).and_then(Value::as_object) {
            for (name, schema) in map {
                definitions
                    .entry(name.clone())
                    .or_insert_with(|| schema.clone());
            }
        }
    }
    definitions
}

/// The schema an `allOf` stands for.
///
/// A single branch is used as is. When branches contribute properties they are
/// merged into one object with [`merge_all_of`]; otherwise the first branch
/// that has a shape of its own wins, so `allOf: [{ "$ref": .. }]` next to a
/// description keeps the referenced type.
pub fn intersection<'a>(branches: &'a [Value], definitions: &Definitions) -> Cow<'a, Value> {
    if let [single] = branches {
        return Cow::Borrowed(single);
    }
    let merged = merge_all_of(branches, definitions);
    if has_properties(&merged) {
        return Cow::Owned(merged);
    }
    branches
        .iter()
        .find(|branch| classify(branch) != SchemaShape::Opaque)
        .map_or(Cow::Owned(merged), Cow::Borrowed)
}

/// Returns true if `node` is a union whose only other alternative is `null`.
pub fn is_nullable(node: &Value) -> bool {
    match classify(node) {
        SchemaShape::Union(alternatives) => {
            single_non_null(alternatives).is_some_and(|(_, nullable)| nullable)
        }
        SchemaShape::TypeUnion(types) => {
            types.contains(&"null") && types.iter().filter(|t| **t != "null").count() == 1
        }
        _ => false,
    }
}

/// Structurally merge the branches of an `allOf`.
///
/// `$ref` branches are resolved through `definitions` and nested `allOf`
/// branches are flattened. Properties keep their first declaration, `required`
/// is the union of all branches, and the first `description` wins.
pub fn merge_all_of(branches: &[Value], definitions: &Definitions) -> Value {
    let mut merged = Map::new();
    let mut properties = Map::new();
    let mut required: Vec<Value> = Vec::new();
    let mut visited = HashSet::new();

    for branch in branches {
        merge_branch(
            branch,
            definitions,
            &mut merged,
            &mut properties,
            &mut required,
            &mut visited,
            0,
        );
    }

    if !properties.is_empty() {
        merged.insert("type".into(), Value::String("object".into()));
        merged.insert("properties".into(), Value::Object(properties));
    }
    if !required.is_empty() {
        merged.insert("required".into(), Value::Array(required));
    }
    Value::Object(merged)
}

fn merge_branch(
    branch: &Value,
    definitions: &Definitions,
    merged: &mut Map<String, Value>,
    properties: &mut Map<String, Value>,
    required: &mut Vec<Value>,
    visited: &mut HashSet<String>,
    depth: usize,
) {
    if depth > MAX_MERGE_DEPTH {
        return;
    }
    let Some(obj) = branch.as_object() else {
        return;
    };

    if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
        if !visited.insert(reference.to_string()) {
            return;
        }
        if let Some((_, target)) = resolve_ref(reference, definitions) {
            merge_branch(
                target,
                definitions,
                merged,
                properties,
                required,
                visited,
                depth + 1,
            );
        } else {
            tracing::warn!(reference, "allOf branch references a missing definition");
        }
    }

    if let Some(nested) = obj.get("allOf").and_then(Value::as_array) {
        for inner in nested {
            merge_branch(
                inner,
                definitions,
                merged,
                properties,
                required,
                visited,
                depth + 1,
            );
        }
    }

    for (name, schema) in self::properties(branch) {
        if !properties.contains_key(name) {
            properties.insert(name.clone(), schema.clone());
        }
    }

    if let Some(names) = obj.get("required").and_then(Value::as_array) {
        for name in names {
            if !required.contains(name) {
                required.push(name.clone());
            }
        }
    }

    for key in ["description", "additionalProperties", "title"] {
        if let Some(value) = obj.get(key) {
            if !merged.contains_key(key) {
                merged.insert(key.to_string(), value.clone());
            }
        }
    }
}
