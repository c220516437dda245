//! Protocol method mining.
//!
//! Methods are not declared anywhere in a JSON Schema; they show up as
//! `"method": { "const": "tools/list" }` properties scattered through the
//! document. This module finds them, groups them by category (the text before
//! the first `/`), derives request and result type names, and plans one caller
//! and one handler interface per category.

use crate::generator::PROTOCOL_ERROR;
use crate::ir::{Alias, Function, Interface, WitType};
use crate::naming::{
    UniqueNames, capitalize, escape_keyword, singularize, to_function_name, to_kebab_label,
    to_wit_identifier,
};
use crate::schema::description;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

const REQUEST_SUFFIX: &str = "Request";
const RESULT_SUFFIX: &str = "Result";
const HANDLER_PREFIX: &str = "handle-";
const HANDLER_SUFFIX: &str = "-handler";

/// One protocol method found in the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodEntry<'a> {
    /// The full method constant, e.g. `tools/list`.
    pub method: String,
    /// Text before the first `/`; the whole method when there is none.
    pub category: String,
    /// Text after the first `/`; the whole method when there is none.
    pub action: String,
    /// The schema node that declared the method constant.
    pub schema: &'a Value,
    /// Sanitized name of the definition the method was declared on, if any.
    pub request_type_name: Option<String>,
    /// Sanitized name of the paired `...Result` definition, if any.
    pub response_type_name: Option<String>,
}

impl<'a> MethodEntry<'a> {
    fn new(method: &str, schema: &'a Value) -> Self {
        let (category, action) = split_method(method);
        Self {
            method: method.to_string(),
            category: category.to_string(),
            action: action.to_string(),
            schema,
            request_type_name: None,
            response_type_name: None,
        }
    }
}

/// Methods sharing a category, in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceGroup<'a> {
    pub category: String,
    pub methods: Vec<MethodEntry<'a>>,
}

/// Request and result type names derived from a method name alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeNames {
    pub request: String,
    pub response: String,
}

/// Interfaces to emit, plus the aliases needed for request types that no
/// definition declared.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InterfacePlan {
    pub interfaces: Vec<Interface>,
    pub aliases: Vec<Alias>,
}

/// Find every method constant in `root`.
///
/// Entries come back in first-seen order, one per distinct method. `$ref`
/// keys are never followed.
pub fn extract_methods(root: &Value) -> Vec<MethodEntry<'_>> {
    let mut found: IndexMap<String, MethodEntry<'_>> = IndexMap::new();

    if let Some(method) = method_const(root) {
        found.insert(method.to_string(), MethodEntry::new(method, root));
    }

    if let Some(obj) = root.as_object() {
        for (key, value) in obj {
            if is_definitions_key(key) {
                if let Some(definitions) = value.as_object() {
                    for (name, schema) in definitions {
                        walk(schema, Some(name.as_str()), &mut found);
                    }
                    continue;
                }
            }
            if key != "$ref" {
                walk(value, None, &mut found);
            }
        }
    }

    pair_definitions(root, &mut found);

    debug!(count = found.len(), "extracted methods");
    found.into_values().collect()
}

fn walk<'a>(
    node: &'a Value,
    definition: Option<&str>,
    found: &mut IndexMap<String, MethodEntry<'a>>,
) {
    match node {
        Value::Object(obj) => {
            if let Some(method) = method_const(node) {
                let entry = found
                    .entry(method.to_string())
                    .or_insert_with(|| MethodEntry::new(method, node));
                if entry.request_type_name.is_none() {
                    entry.request_type_name = definition
                        .filter(|name| !name.ends_with(RESULT_SUFFIX))
                        .map(to_wit_identifier);
                }
            }
            for (key, value) in obj {
                if key != "$ref" {
                    walk(value, None, found);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, None, found);
            }
        }
        _ => {}
    }
}

/// Pair `{Base}Request` and `{Base}Result` definitions, recovering methods
/// whose constant appears on only one side.
fn pair_definitions<'a>(root: &'a Value, found: &mut IndexMap<String, MethodEntry<'a>>) {
    let mut definitions: IndexMap<&str, &'a Value> = IndexMap::new();
    for key in ["definitions", "$defs"] {
        if let Some(map) = root.get(key).and_then(Value::as_object) {
            for (name, schema) in map {
                definitions.entry(name.as_str()).or_insert(schema);
            }
        }
    }

    for (&name, &schema) in &definitions {
        let Some(method) = method_const(schema) else {
            continue;
        };

        if let Some(base) = name.strip_suffix(REQUEST_SUFFIX) {
            let result = format!("{base}{RESULT_SUFFIX}");
            let entry = found
                .entry(method.to_string())
                .or_insert_with(|| MethodEntry::new(method, schema));
            if entry.request_type_name.is_none() {
                entry.request_type_name = Some(to_wit_identifier(name));
            }
            if entry.response_type_name.is_none() && definitions.contains_key(result.as_str()) {
                entry.response_type_name = Some(to_wit_identifier(&result));
            }
        } else if let Some(base) = name.strip_suffix(RESULT_SUFFIX) {
            let request = format!("{base}{REQUEST_SUFFIX}");
            let request_schema = definitions.get(request.as_str()).copied();
            let entry = found
                .entry(method.to_string())
                .or_insert_with(|| MethodEntry::new(method, request_schema.unwrap_or(schema)));
            if entry.request_type_name.is_none() && request_schema.is_some() {
                entry.request_type_name = Some(to_wit_identifier(&request));
            }
            if entry.response_type_name.is_none() {
                entry.response_type_name = Some(to_wit_identifier(name));
            }
        }
    }
}

fn is_definitions_key(key: &str) -> bool {
    key == "definitions" || key == "$defs"
}

/// The string constant of `properties.method`, if set and non-empty.
fn method_const(node: &Value) -> Option<&str> {
    node.get("properties")?
        .get("method")?
        .get("const")?
        .as_str()
        .filter(|method| !method.is_empty())
}

fn split_method(method: &str) -> (&str, &str) {
    method.split_once('/').unwrap_or((method, method))
}

/// Group methods by category, keeping first-seen order for categories and
/// for methods within each category.
pub fn group_methods(entries: Vec<MethodEntry<'_>>) -> Vec<InterfaceGroup<'_>> {
    let mut groups: IndexMap<String, Vec<MethodEntry<'_>>> = IndexMap::new();
    for entry in entries {
        groups.entry(entry.category.clone()).or_default().push(entry);
    }
    groups
        .into_iter()
        .map(|(category, methods)| InterfaceGroup { category, methods })
        .collect()
}

/// Derive request and result type names from a method name.
///
/// | Method | Request | Result |
/// |--------|---------|--------|
/// | `tools/call` | `call-tool-request` | `call-tool-result` |
/// | `tools/list` | `list-tools-request` | `list-tools-result` |
/// | `prompts/get` | `get-prompts-request` | `get-prompts-result` |
/// | `ping` | `ping-request` | `ping-result` |
pub fn derive_type_names(method: &str) -> TypeNames {
    let base = match method.split_once('/') {
        Some((category, "call")) => format!("Call{}", capitalize(singularize(category))),
        Some((category, "list")) => format!("List{}", capitalize(category)),
        Some((category, action)) => format!("{}{}", capitalize(action), capitalize(category)),
        None => capitalize(method),
    };
    TypeNames {
        request: to_wit_identifier(&format!("{base}{REQUEST_SUFFIX}")),
        response: to_wit_identifier(&format!("{base}{RESULT_SUFFIX}")),
    }
}

/// Plan the caller and handler interfaces for every group.
///
/// `is_declared` reports whether a type with the given name will be emitted.
/// Request types fall back to the name found while scanning and finally to a
/// `string` alias under the derived name; result types fall back to the
/// scanned name and finally to plain `string`.
pub fn plan_interfaces(
    groups: &[InterfaceGroup<'_>],
    is_declared: impl Fn(&str) -> bool,
) -> InterfacePlan {
    let mut plan = InterfacePlan::default();
    let mut interface_names = UniqueNames::new();
    interface_names.reserve("types");

    for group in groups {
        let name = interface_name(&mut interface_names, &group.category);
        let handler_name = format!("{name}{HANDLER_SUFFIX}");
        interface_names.reserve(&handler_name);

        let mut uses = vec![PROTOCOL_ERROR.to_string()];
        let mut function_names = UniqueNames::new();
        let mut callers = Vec::with_capacity(group.methods.len());
        let mut handlers = Vec::with_capacity(group.methods.len());

        for entry in &group.methods {
            let derived = derive_type_names(&entry.method);
            let request =
                resolve_request(entry, &derived, &is_declared, &mut plan.aliases);
            let response = resolve_response(entry, &derived, &is_declared);

            let mut referenced = Vec::new();
            request.collect_named(&mut referenced);
            response.collect_named(&mut referenced);
            for ty in referenced {
                if !uses.iter().any(|u| u == ty) {
                    uses.push(ty.to_string());
                }
            }

            let label = function_names.claim(&to_kebab_label(&entry.action));
            let docs = description(entry.schema).map(str::to_string);
            callers.push(Function {
                name: escape_keyword(&label),
                request: request.clone(),
                response: response.clone(),
                docs: docs.clone(),
            });
            handlers.push(Function {
                name: to_function_name(&format!("{HANDLER_PREFIX}{label}")),
                request,
                response,
                docs,
            });
        }

        debug!(interface = %name, functions = callers.len(), "planned interface pair");
        plan.interfaces.push(Interface {
            name,
            uses: uses.clone(),
            functions: callers,
        });
        plan.interfaces.push(Interface {
            name: handler_name,
            uses,
            functions: handlers,
        });
    }

    plan
}

fn interface_name(names: &mut UniqueNames, category: &str) -> String {
    let mut base = to_wit_identifier(category);
    if base == "types" {
        base = "types-api".to_string();
    }
    let name = names.claim(&base);
    // Keep the paired handler name free as well.
    if names.contains(&format!("{name}{HANDLER_SUFFIX}")) {
        return names.claim(&format!("{name}-api"));
    }
    name
}

fn resolve_request(
    entry: &MethodEntry<'_>,
    derived: &TypeNames,
    is_declared: &impl Fn(&str) -> bool,
    aliases: &mut Vec<Alias>,
) -> WitType {
    if is_declared(&derived.request) || aliases.iter().any(|a| a.name == derived.request) {
        return WitType::Named(derived.request.clone());
    }
    if let Some(scanned) = entry.request_type_name.as_deref() {
        if is_declared(scanned) {
            return WitType::Named(scanned.to_string());
        }
    }
    aliases.push(Alias {
        name: derived.request.clone(),
        target: WitType::String,
        docs: Some(format!("JSON-encoded `{}` request.", entry.method)),
    });
    WitType::Named(derived.request.clone())
}

fn resolve_response(
    entry: &MethodEntry<'_>,
    derived: &TypeNames,
    is_declared: &impl Fn(&str) -> bool,
) -> WitType {
    if is_declared(&derived.response) {
        return WitType::Named(derived.response.clone());
    }
    match entry.response_type_name.as_deref() {
        Some(scanned) if is_declared(scanned) => WitType::Named(scanned.to_string()),
        _ => WitType::String,
    }
}
