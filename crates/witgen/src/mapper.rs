//! Schema node → WIT type mapping.
//!
//! [`TypeMapper::map_type`] turns one schema node into a [`WitType`]
//! reference. It never creates named types: when a node needs one (an inline
//! object, union or enum) the caller passes the name it will register under,
//! and the mapper returns a reference to it. Without a name such nodes
//! degrade to `string`.
//!
//! The `generate_*` methods build the named definitions themselves. Field and
//! case types for nested anonymous shapes are named by position through
//! [`InlineNames`]; the document generator walks the same positions with the
//! same allocator, so every synthesized reference has a definition.

use crate::error::{GenerateError, GenerateResult};
use crate::ir::{Case, Enum, Field, Record, Variant, WitType};
use crate::naming::{UniqueNames, to_wit_identifier};
use crate::schema::{
    Definitions, IntegerBounds, Primitive, SchemaShape, classify, classify_typed, description,
    intersection, is_null, is_nullable, properties, ref_name, required, resolve_ref, shape_name,
    single_non_null,
};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Longest chain of `$ref`s to unnamed definitions followed before giving up.
const MAX_REF_DEPTH: usize = 32;

/// The kind of named definition a schema node produces, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedKind {
    Record,
    Variant,
    Enum,
    Alias,
}

/// Names handed out to nested anonymous types, one per position.
///
/// A position is a member (`config`, `item`, `entry`, a case name) of an
/// already named parent. The first request for a position claims
/// `{parent}-{member}`, or a numbered variant of it when that name is reserved
/// or taken; later requests for the same position get the same name back.
#[derive(Debug, Default)]
pub struct InlineNames {
    claimed: UniqueNames,
    positions: HashMap<(String, String), String>,
}

impl InlineNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `name` away from every inline type.
    pub fn reserve(&mut self, name: &str) {
        self.claimed.reserve(name);
    }

    /// The name of the anonymous type at `member` of `parent`.
    pub fn name(&mut self, parent: &str, member: &str) -> String {
        let key = (parent.to_string(), member.to_string());
        if let Some(name) = self.positions.get(&key) {
            return name.clone();
        }
        let name = self.claimed.claim(&inline_type_name(parent, member));
        self.positions.insert(key, name.clone());
        name
    }

    /// Like [`name`](Self::name), but only for schemas that can need a named
    /// type; references and scalars get `None` and claim nothing.
    pub fn member(&mut self, parent: Option<&str>, member: &str, schema: &Value) -> Option<String> {
        let parent = parent?;
        match classify(schema) {
            SchemaShape::Ref(_)
            | SchemaShape::Const(_)
            | SchemaShape::Primitive(_)
            | SchemaShape::Opaque => None,
            _ => Some(self.name(parent, member)),
        }
    }
}

/// Maps schema nodes to WIT types, resolving `$ref` against one document's definitions.
#[derive(Debug, Clone, Copy)]
pub struct TypeMapper<'a> {
    definitions: &'a Definitions,
}

impl<'a> TypeMapper<'a> {
    pub fn new(definitions: &'a Definitions) -> Self {
        Self { definitions }
    }

    pub fn definitions(&self) -> &'a Definitions {
        self.definitions
    }

    /// Map a schema node to a type reference.
    ///
    /// `type_name` is the name a nested object, union or enum at this
    /// position is registered under. Types nested deeper get plain positional
    /// names; use [`map_type_with`](Self::map_type_with) to share an allocator
    /// with the code that declares them.
    pub fn map_type(&self, schema: &Value, type_name: Option<&str>) -> WitType {
        self.map_type_with(schema, type_name, &mut InlineNames::new())
    }

    pub fn map_type_with(
        &self,
        schema: &Value,
        type_name: Option<&str>,
        names: &mut InlineNames,
    ) -> WitType {
        self.map_shape(classify(schema), schema, type_name, 0, names)
    }

    fn map_shape(
        &self,
        shape: SchemaShape<'_>,
        schema: &Value,
        type_name: Option<&str>,
        depth: usize,
        names: &mut InlineNames,
    ) -> WitType {
        match shape {
            SchemaShape::Ref(reference) => self.map_ref(reference, depth, names),
            SchemaShape::ConstUnion(_) | SchemaShape::Enum(_) | SchemaShape::Object(_) => {
                named_or_string(type_name)
            }
            SchemaShape::Union(alternatives) => match single_non_null(alternatives) {
                Some((inner, nullable)) => {
                    let ty = self.map_shape(classify(inner), inner, type_name, depth, names);
                    if nullable { ty.optional() } else { ty }
                }
                None => named_or_string(type_name),
            },
            SchemaShape::Intersection(branches) => {
                let target = intersection(branches, self.definitions);
                self.map_shape(classify(&target), &target, type_name, depth, names)
            }
            SchemaShape::TypeUnion(types) => {
                let non_null: Vec<&str> = types.iter().copied().filter(|t| *t != "null").collect();
                match non_null.as_slice() {
                    [single] => {
                        let shape = classify_typed(schema, single);
                        let ty = self.map_shape(shape, schema, type_name, depth, names);
                        if non_null.len() < types.len() {
                            ty.optional()
                        } else {
                            ty
                        }
                    }
                    _ => named_or_string(type_name),
                }
            }
            SchemaShape::Primitive(primitive) => primitive_type(primitive),
            SchemaShape::Const(value) => const_type(value),
            SchemaShape::Array(items) => {
                let item = match items {
                    Some(items) => {
                        let item_name = names.member(type_name, "item", items);
                        self.map_shape(classify(items), items, item_name.as_deref(), depth, names)
                    }
                    None => WitType::String,
                };
                WitType::list(item)
            }
            SchemaShape::Tuple(items) => {
                let mut members = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let item_name = names.member(type_name, &tuple_member(i), item);
                    members.push(self.map_shape(
                        classify(item),
                        item,
                        item_name.as_deref(),
                        depth,
                        names,
                    ));
                }
                WitType::Tuple(members)
            }
            SchemaShape::Map(values) => {
                let entry_name = names.member(type_name, "entry", values);
                let value =
                    self.map_shape(classify(values), values, entry_name.as_deref(), depth, names);
                WitType::list(WitType::Tuple(vec![WitType::String, value]))
            }
            SchemaShape::Opaque => {
                if let Some(ty) = schema.get("type").and_then(Value::as_str) {
                    if !matches!(ty, "object" | "array") {
                        warn!(schema_type = ty, "unsupported schema type, using string");
                    }
                }
                WitType::String
            }
        }
    }

    fn map_ref(&self, reference: &str, depth: usize, names: &mut InlineNames) -> WitType {
        let Some((key, target)) = resolve_ref(reference, self.definitions) else {
            warn!(reference, "reference to a missing definition, using string");
            return WitType::String;
        };

        if self.named_kind(target).is_some() {
            // The declared type is the non-null alternative.
            let named = WitType::Named(to_wit_identifier(key));
            return if is_nullable(target) {
                named.optional()
            } else {
                named
            };
        }

        // Scalar definitions get no named type; inline what they map to.
        if depth >= MAX_REF_DEPTH {
            warn!(reference, "reference chain too deep, using string");
            return WitType::String;
        }
        self.map_shape(classify(target), target, None, depth + 1, names)
    }

    /// The kind of named type a definition produces, or `None` for plain
    /// scalars and references that need no declaration of their own.
    pub fn named_kind(&self, schema: &Value) -> Option<NamedKind> {
        self.shape_kind(classify(schema), schema)
    }

    fn shape_kind(&self, shape: SchemaShape<'_>, schema: &Value) -> Option<NamedKind> {
        match shape {
            SchemaShape::Object(_) => Some(NamedKind::Record),
            SchemaShape::ConstUnion(_) | SchemaShape::Enum(_) => Some(NamedKind::Enum),
            SchemaShape::Union(alternatives) => match single_non_null(alternatives) {
                Some((inner, _)) => self.named_kind(inner),
                None => Some(NamedKind::Variant),
            },
            SchemaShape::Intersection(branches) => {
                self.named_kind(&intersection(branches, self.definitions))
            }
            SchemaShape::TypeUnion(types) => {
                let non_null: Vec<&str> = types.iter().copied().filter(|t| *t != "null").collect();
                match non_null.as_slice() {
                    [single] => self.shape_kind(classify_typed(schema, single), schema),
                    _ => Some(NamedKind::Variant),
                }
            }
            SchemaShape::Array(_) | SchemaShape::Tuple(_) | SchemaShape::Map(_) => {
                Some(NamedKind::Alias)
            }
            SchemaShape::Ref(_)
            | SchemaShape::Const(_)
            | SchemaShape::Primitive(_)
            | SchemaShape::Opaque => None,
        }
    }

    /// Build a record from an object schema.
    ///
    /// Fields follow property declaration order; a field is optional exactly
    /// when its property is missing from `required`. Nested anonymous types
    /// are named after the field, not the raw property.
    pub fn generate_record(
        &self,
        name: &str,
        schema: &Value,
        processing: &mut HashSet<String>,
        inline_names: &mut InlineNames,
    ) -> GenerateResult<Record> {
        if !processing.insert(name.to_string()) {
            return Err(recursive(name));
        }

        let required = required(schema);
        let mut field_names = UniqueNames::new();
        let mut fields = Vec::new();
        for (property, property_schema) in properties(schema) {
            let field_name = field_names.claim(&to_wit_identifier(property));
            let type_name = inline_names.member(Some(name), &field_name, property_schema);
            fields.push(Field {
                ty: self.map_type_with(property_schema, type_name.as_deref(), inline_names),
                name: field_name,
                optional: !required.contains(property.as_str()),
                docs: description(property_schema).map(str::to_string),
            });
        }

        processing.remove(name);

        Ok(Record {
            name: name.to_string(),
            fields,
            docs: description(schema).map(str::to_string),
        })
    }

    /// Build a variant with one case per alternative of a union.
    pub fn generate_variant(
        &self,
        name: &str,
        schema: &Value,
        processing: &mut HashSet<String>,
        inline_names: &mut InlineNames,
    ) -> GenerateResult<Variant> {
        if !processing.insert(name.to_string()) {
            return Err(recursive(name));
        }

        let alternatives = variant_alternatives(schema);
        let mut case_names = UniqueNames::new();
        let mut cases = Vec::with_capacity(alternatives.len());
        for alternative in alternatives.iter() {
            let case_name = case_names.claim(&case_name(alternative));
            let payload = if has_payload(alternative) {
                let type_name = inline_names.member(Some(name), &case_name, alternative);
                Some(self.map_type_with(alternative, type_name.as_deref(), inline_names))
            } else {
                None
            };
            cases.push(Case {
                name: case_name,
                payload,
                docs: description(alternative).map(str::to_string),
            });
        }

        processing.remove(name);

        Ok(Variant {
            name: name.to_string(),
            cases,
            docs: description(schema).map(str::to_string),
        })
    }

    /// Build an enum with one case per literal value.
    pub fn generate_enum(&self, name: &str, values: &[String], docs: Option<&str>) -> Enum {
        let mut names = UniqueNames::new();
        Enum {
            name: name.to_string(),
            values: values
                .iter()
                .map(|value| names.claim(&to_wit_identifier(value)))
                .collect(),
            docs: docs.map(str::to_string),
        }
    }
}

/// The alternatives a variant is built from, in declaration order.
///
/// A `type` list becomes one alternative per listed type.
pub fn variant_alternatives(schema: &Value) -> Cow<'_, [Value]> {
    match classify(schema) {
        SchemaShape::Union(alternatives) => Cow::Borrowed(alternatives),
        SchemaShape::TypeUnion(types) => Cow::Owned(
            types
                .iter()
                .map(|ty| {
                    let mut alternative = schema.clone();
                    if let Some(obj) = alternative.as_object_mut() {
                        obj.insert("type".into(), Value::String((*ty).to_string()));
                        obj.remove("description");
                    }
                    alternative
                })
                .collect(),
        ),
        SchemaShape::ConstUnion(values) => Cow::Owned(
            values
                .into_iter()
                .map(|value| serde_json::json!({ "const": value }))
                .collect(),
        ),
        _ => Cow::Owned(vec![schema.clone()]),
    }
}

/// Returns true if a union alternative becomes a case with a payload.
pub fn has_payload(alternative: &Value) -> bool {
    alternative.get("const").is_none() && !is_null(alternative)
}

/// Case name for one union alternative: the constant, the referenced
/// definition, or the shape of the inline schema.
fn case_name(alternative: &Value) -> String {
    match alternative.get("const") {
        Some(Value::String(s)) => return to_wit_identifier(s),
        Some(Value::Number(n)) => return to_wit_identifier(&n.to_string()),
        Some(Value::Bool(b)) => return to_wit_identifier(&b.to_string()),
        Some(Value::Null) => return "null".to_string(),
        _ => {}
    }
    match classify(alternative) {
        SchemaShape::Ref(reference) => to_wit_identifier(ref_name(reference)),
        _ => to_wit_identifier(shape_name(alternative)),
    }
}

/// Positional name for a nested anonymous type: `{parent}-{member}`.
pub fn inline_type_name(parent: &str, member: &str) -> String {
    to_wit_identifier(&format!("{parent}-{member}"))
}

/// Member label for the `index`th element of a tuple: `item1`, `item2`, ...
pub fn tuple_member(index: usize) -> String {
    format!("item{}", index + 1)
}

/// The narrowest integer type covering `bounds`.
///
/// Unsigned when the lower bound is non-negative; signed otherwise. Missing
/// bounds fall back to the widest type of the chosen signedness.
pub fn integer_type(bounds: IntegerBounds) -> WitType {
    match (bounds.min, bounds.max) {
        (Some(min), max) if min >= 0 => match max {
            Some(max) if max <= i128::from(u8::MAX) => WitType::U8,
            Some(max) if max <= i128::from(u16::MAX) => WitType::U16,
            Some(max) if max <= i128::from(u32::MAX) => WitType::U32,
            _ => WitType::U64,
        },
        (Some(min), Some(max)) => {
            if min >= i128::from(i8::MIN) && max <= i128::from(i8::MAX) {
                WitType::S8
            } else if min >= i128::from(i16::MIN) && max <= i128::from(i16::MAX) {
                WitType::S16
            } else if min >= i128::from(i32::MIN) && max <= i128::from(i32::MAX) {
                WitType::S32
            } else {
                WitType::S64
            }
        }
        _ => WitType::S64,
    }
}

fn primitive_type(primitive: Primitive) -> WitType {
    match primitive {
        Primitive::String => WitType::String,
        Primitive::Bytes => WitType::list(WitType::U8),
        Primitive::Integer(bounds) => integer_type(bounds),
        Primitive::Number => WitType::F64,
        Primitive::Boolean => WitType::Bool,
        // No unit type in field position.
        Primitive::Null => WitType::String,
    }
}

fn const_type(value: &Value) -> WitType {
    match value {
        Value::Bool(_) => WitType::Bool,
        Value::Number(n) if n.is_i64() => WitType::S64,
        Value::Number(n) if n.is_u64() => WitType::U64,
        Value::Number(_) => WitType::F64,
        _ => WitType::String,
    }
}

fn named_or_string(type_name: Option<&str>) -> WitType {
    match type_name {
        Some(name) => WitType::Named(name.to_string()),
        None => {
            debug!("anonymous structured type without a name, using string");
            WitType::String
        }
    }
}

fn recursive(name: &str) -> GenerateError {
    GenerateError::RecursiveType {
        cycle: vec![name.to_string(), name.to_string()],
    }
}
