//! Whole-document generation.
//!
//! [`Generator::build`] runs the passes in order:
//!
//! 1. every definition that needs a named type is declared, followed by the
//!    anonymous types nested inside it, named by position
//! 2. inline types with identical bodies are merged (opt-in)
//! 3. method patterns are mined and paired interfaces planned
//! 4. references that were never declared degrade to `string`
//! 5. reference cycles are broken or rejected
//!
//! All intermediate state lives in a [`GenerationContext`] created per call.

use crate::config::{GeneratorOptions, RecursionPolicy};
use crate::emit;
use crate::error::{GenerateError, GenerateResult};
use crate::ir::{Alias, Document, Field, Record, TypeDefinition, WitType};
use crate::mapper::{
    InlineNames, NamedKind, TypeMapper, has_payload, tuple_member, variant_alternatives,
};
use crate::methods::{extract_methods, group_methods, plan_interfaces};
use crate::naming::to_wit_identifier;
use crate::schema::{
    Definitions, SchemaShape, classify, classify_typed, collect_definitions, description,
    intersection, single_non_null,
};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Name of the error record shared by every interface.
pub const PROTOCOL_ERROR: &str = "protocol-error";

/// Generates WIT documents from JSON Schema documents.
///
/// Holds only options; every call to [`generate`](Generator::generate) starts
/// from fresh state, so one generator can serve any number of documents.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    options: GeneratorOptions,
}

impl Generator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Generate the WIT text for `schema`.
    pub fn generate(&self, schema: &Value) -> GenerateResult<String> {
        let document = self.build(schema)?;
        Ok(emit::render(&document, &self.options))
    }

    /// Build the document model without rendering it.
    pub fn build(&self, schema: &Value) -> GenerateResult<Document> {
        self.options.validate()?;

        let definitions = match schema {
            Value::Object(_) => collect_definitions(schema),
            Value::Bool(_) => {
                debug!("boolean schema, emitting an empty document");
                Definitions::new()
            }
            other => {
                return Err(GenerateError::InvalidSchema(format!(
                    "document root must be a JSON object, found {}",
                    json_kind(other)
                )));
            }
        };

        let mut context = GenerationContext::new(&definitions);
        context.generate_types()?;
        if self.options.dedupe_inline_types {
            context.dedupe_inline_types();
        }

        let groups = group_methods(extract_methods(schema));
        let plan = plan_interfaces(&groups, |name| context.types.contains_key(name));
        for alias in plan.aliases {
            warn!(name = %alias.name, "request type was never declared, aliasing it to string");
            context.insert(TypeDefinition::Alias(alias));
        }

        context.replace_dangling();
        context.break_cycles(self.options.recursion)?;

        info!(
            types = context.types.len(),
            interfaces = plan.interfaces.len(),
            "generated document"
        );

        let mut types = Vec::with_capacity(context.types.len() + 1);
        types.push(protocol_error());
        types.extend(context.types.into_values());

        Ok(Document {
            package: self.options.package.clone(),
            types,
            interfaces: plan.interfaces,
        })
    }
}

/// Generate a WIT document with the given options.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use witgen::{GeneratorOptions, generate};
///
/// let schema = json!({
///     "definitions": {
///         "Mode": { "anyOf": [{ "const": "a" }, { "const": "b" }] }
///     }
/// });
///
/// let wit = generate(&schema, &GeneratorOptions::default()).unwrap();
/// assert!(wit.contains("enum mode { a, b }"));
/// ```
pub fn generate(schema: &Value, options: &GeneratorOptions) -> GenerateResult<String> {
    Generator::new(options.clone()).generate(schema)
}

/// Per-call state threaded through type collection.
struct GenerationContext<'a> {
    mapper: TypeMapper<'a>,
    /// Names currently being expanded.
    processing: HashSet<String>,
    /// Names of anonymous types, shared with the mapper.
    inline_names: InlineNames,
    /// Every declared type, primaries and inline types interleaved in discovery order.
    types: IndexMap<String, TypeDefinition>,
    /// Names of the types declared for top-level definitions.
    primaries: HashSet<String>,
    /// Names of synthesized anonymous types.
    inline: HashSet<String>,
    current_primary: Option<String>,
}

impl<'a> GenerationContext<'a> {
    fn new(definitions: &'a Definitions) -> Self {
        Self {
            mapper: TypeMapper::new(definitions),
            processing: HashSet::new(),
            inline_names: InlineNames::new(),
            types: IndexMap::new(),
            primaries: HashSet::new(),
            inline: HashSet::new(),
            current_primary: None,
        }
    }

    fn generate_types(&mut self) -> GenerateResult<()> {
        let definitions = self.mapper.definitions();

        // Claim every primary name first so inline types never shadow a later definition.
        let mut declared = Vec::new();
        for (key, schema) in definitions {
            let Some(kind) = self.mapper.named_kind(schema) else {
                debug!(definition = %key, "scalar definition, no named type");
                continue;
            };
            let name = to_wit_identifier(key);
            if name == PROTOCOL_ERROR {
                warn!(definition = %key, "definition collides with the built-in error record, skipping");
                continue;
            }
            if !self.primaries.insert(name.clone()) {
                warn!(definition = %key, name = %name, "duplicate type name, keeping the first definition");
                continue;
            }
            declared.push((name, kind, schema));
        }

        self.inline_names.reserve(PROTOCOL_ERROR);
        for name in &self.primaries {
            self.inline_names.reserve(name);
        }

        for (name, kind, schema) in declared {
            self.current_primary = Some(name.clone());
            if kind == NamedKind::Alias {
                let target = self
                    .mapper
                    .map_type_with(schema, Some(&name), &mut self.inline_names);
                self.insert(TypeDefinition::Alias(Alias {
                    name: name.clone(),
                    target,
                    docs: description(schema).map(str::to_string),
                }));
            }
            self.declare(&name, schema)?;
            debug!(name = %name, kind = ?kind, "declared type");
        }
        self.current_primary = None;

        Ok(())
    }

    /// Declare the named type `schema` produces under `name`, then the
    /// anonymous types nested inside it.
    ///
    /// Walks the same positions as [`TypeMapper::map_type_with`] and asks the
    /// same [`InlineNames`] for their names, so every name the mapper
    /// references is declared here.
    fn declare(&mut self, name: &str, schema: &Value) -> GenerateResult<()> {
        self.declare_shape(name, classify(schema), schema)
    }

    fn declare_shape(
        &mut self,
        name: &str,
        shape: SchemaShape<'_>,
        schema: &Value,
    ) -> GenerateResult<()> {
        match shape {
            SchemaShape::Object(properties) => {
                if !self.accepts(name) {
                    return Ok(());
                }
                let record = self.mapper.generate_record(
                    name,
                    schema,
                    &mut self.processing,
                    &mut self.inline_names,
                )?;
                // Fields come back in property order.
                let members: Vec<String> = record.fields.iter().map(|f| f.name.clone()).collect();
                self.insert(TypeDefinition::Record(record));
                for (field, property_schema) in members.iter().zip(properties.values()) {
                    self.declare_member(name, field, property_schema)?;
                }
            }
            SchemaShape::Intersection(branches) => {
                let target = intersection(branches, self.mapper.definitions());
                self.declare(name, &target)?;
            }
            SchemaShape::Union(alternatives) => match single_non_null(alternatives) {
                Some((inner, _)) => self.declare(name, inner)?,
                None => self.declare_variant(name, schema)?,
            },
            SchemaShape::TypeUnion(types) => {
                let non_null: Vec<&str> = types.iter().copied().filter(|t| *t != "null").collect();
                match non_null.as_slice() {
                    [single] => self.declare_shape(name, classify_typed(schema, single), schema)?,
                    _ => self.declare_variant(name, schema)?,
                }
            }
            SchemaShape::ConstUnion(values) | SchemaShape::Enum(values) => {
                if self.accepts(name) {
                    let generated = self
                        .mapper
                        .generate_enum(name, &values, description(schema));
                    self.insert(TypeDefinition::Enum(generated));
                }
            }
            SchemaShape::Array(Some(items)) => self.declare_member(name, "item", items)?,
            SchemaShape::Tuple(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.declare_member(name, &tuple_member(i), item)?;
                }
            }
            SchemaShape::Map(values) => self.declare_member(name, "entry", values)?,
            SchemaShape::Array(None)
            | SchemaShape::Ref(_)
            | SchemaShape::Const(_)
            | SchemaShape::Primitive(_)
            | SchemaShape::Opaque => {}
        }
        Ok(())
    }

    fn declare_member(
        &mut self,
        parent: &str,
        member: &str,
        schema: &Value,
    ) -> GenerateResult<()> {
        match self.inline_names.member(Some(parent), member, schema) {
            Some(name) => self.declare(&name, schema),
            None => Ok(()),
        }
    }

    fn declare_variant(&mut self, name: &str, schema: &Value) -> GenerateResult<()> {
        if !self.accepts(name) {
            return Ok(());
        }
        let variant = self.mapper.generate_variant(
            name,
            schema,
            &mut self.processing,
            &mut self.inline_names,
        )?;
        let case_names: Vec<String> = variant.cases.iter().map(|c| c.name.clone()).collect();
        self.insert(TypeDefinition::Variant(variant));

        let alternatives = variant_alternatives(schema);
        for (case, alternative) in case_names.iter().zip(alternatives.iter()) {
            if has_payload(alternative) {
                self.declare_member(name, case, alternative)?;
            }
        }
        Ok(())
    }

    /// Returns true if a type may be declared under `name`.
    fn accepts(&self, name: &str) -> bool {
        if self.types.contains_key(name) {
            debug!(name, "type already declared");
            return false;
        }
        let is_primary = self.current_primary.as_deref() == Some(name);
        if !is_primary && (self.primaries.contains(name) || name == PROTOCOL_ERROR) {
            warn!(name, "inline type name collides with a declared type, skipping");
            return false;
        }
        true
    }

    fn insert(&mut self, definition: TypeDefinition) {
        let name = definition.name().to_string();
        if !self.primaries.contains(&name) {
            self.inline.insert(name.clone());
        }
        self.types.insert(name, definition);
    }

    /// Merge inline types whose bodies are identical into the first one seen.
    ///
    /// Repeats until nothing changes, so parents whose children were merged
    /// become identical in turn.
    fn dedupe_inline_types(&mut self) {
        loop {
            let mut seen: HashMap<String, &str> = HashMap::new();
            let mut duplicate = None;
            for (name, definition) in &self.types {
                if !self.inline.contains(name) {
                    continue;
                }
                let key = definition.shape_key();
                if let Some(existing) = seen.get(&key) {
                    duplicate = Some((name.clone(), existing.to_string()));
                    break;
                }
                seen.insert(key, name);
            }

            let Some((duplicate, existing)) = duplicate else {
                break;
            };
            debug!(duplicate = %duplicate, existing = %existing, "merged identical inline type");
            self.types.shift_remove(&duplicate);
            self.inline.remove(&duplicate);
            let replacement = WitType::Named(existing);
            for definition in self.types.values_mut() {
                definition.replace_named(&duplicate, &replacement);
            }
        }
    }

    /// Replace references to names that were never declared with `string`.
    fn replace_dangling(&mut self) {
        let mut dangling: Vec<String> = Vec::new();
        for definition in self.types.values() {
            for reference in definition.references() {
                if reference != PROTOCOL_ERROR
                    && !self.types.contains_key(reference)
                    && !dangling.iter().any(|d| d == reference)
                {
                    dangling.push(reference.to_string());
                }
            }
        }

        for name in dangling {
            warn!(name = %name, "reference to an undeclared type, using string");
            for definition in self.types.values_mut() {
                definition.replace_named(&name, &WitType::String);
            }
        }
    }

    /// Break every reference cycle according to `policy`.
    fn break_cycles(&mut self, policy: RecursionPolicy) -> GenerateResult<()> {
        while let Some(cycle) = find_cycle(&self.types) {
            if policy == RecursionPolicy::Reject {
                return Err(GenerateError::RecursiveType { cycle });
            }

            let (from, to) = match cycle.as_slice() {
                [.., from, to] => (from.clone(), to.clone()),
                _ => break,
            };
            let note = format!("Recursive reference to `{to}`, JSON-encoded.");
            let Some(definition) = self.types.get_mut(&from) else {
                break;
            };
            let changed = definition.replace_named(&to, &WitType::String);
            if changed.is_empty() {
                break;
            }
            for member in &changed {
                definition.annotate(member, &note);
            }
            warn!(from = %from, to = %to, "recursive reference replaced with a JSON string");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Active,
    Done,
}

/// The first reference cycle found, walking definitions in emission order.
///
/// The returned path starts and ends with the same name; its last step is the
/// reference that closes the cycle.
fn find_cycle(types: &IndexMap<String, TypeDefinition>) -> Option<Vec<String>> {
    let mut marks = HashMap::new();
    let mut path = Vec::new();
    types
        .keys()
        .find_map(|name| visit(name, types, &mut marks, &mut path))
}

fn visit<'t>(
    name: &'t str,
    types: &'t IndexMap<String, TypeDefinition>,
    marks: &mut HashMap<&'t str, Mark>,
    path: &mut Vec<&'t str>,
) -> Option<Vec<String>> {
    match marks.get(name) {
        Some(Mark::Done) => return None,
        Some(Mark::Active) => {
            let start = path.iter().position(|n| *n == name).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
            cycle.push(name.to_string());
            return Some(cycle);
        }
        None => {}
    }

    let definition = types.get(name)?;
    marks.insert(name, Mark::Active);
    path.push(name);
    for reference in definition.references() {
        if let Some(cycle) = visit(reference, types, marks, path) {
            return Some(cycle);
        }
    }
    path.pop();
    marks.insert(name, Mark::Done);
    None
}

fn protocol_error() -> TypeDefinition {
    let field = |name: &str, ty: WitType, optional: bool| Field {
        name: name.to_string(),
        ty,
        optional,
        docs: None,
    };
    TypeDefinition::Record(Record {
        name: PROTOCOL_ERROR.to_string(),
        fields: vec![
            field("code", WitType::S64, false),
            field("message", WitType::String, false),
            field("data", WitType::String, true),
        ],
        docs: None,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
