//! WIT text rendering.

use crate::config::GeneratorOptions;
use crate::ir::{Document, Function, Interface, TypeDefinition};

/// Comment lines opening every generated document.
pub const HEADER: [&str; 2] = [
    "// Generated by witgen from a JSON Schema document.",
    "// Do not edit by hand.",
];

const INDENT: &str = "    ";

/// Render a document as WIT text.
///
/// Output ends with exactly one newline.
pub fn render(document: &Document, options: &GeneratorOptions) -> String {
    let mut code = String::new();

    // Header and package
    for line in HEADER {
        code.push_str(line);
        code.push('\n');
    }
    code.push('\n');
    code.push_str(&format!("package {};\n", document.package));

    // Shared types
    code.push_str("\ninterface types {\n");
    for (i, definition) in document.types.iter().enumerate() {
        if i > 0 {
            code.push('\n');
        }
        render_type(&mut code, definition, options);
    }
    code.push_str("}\n");

    for interface in &document.interfaces {
        code.push('\n');
        render_interface(&mut code, interface, options);
    }

    code
}

fn render_type(code: &mut String, definition: &TypeDefinition, options: &GeneratorOptions) {
    let indent = INDENT;
    let member_indent = format!("{INDENT}{INDENT}");

    match definition {
        TypeDefinition::Record(record) => {
            push_docs(code, record.docs.as_deref(), indent, options);
            code.push_str(&format!("{indent}record {} {{\n", record.name));
            for field in &record.fields {
                push_docs(code, field.docs.as_deref(), &member_indent, options);
                code.push_str(&format!(
                    "{member_indent}{}: {},\n",
                    field.name,
                    field.wit_type()
                ));
            }
            code.push_str(&format!("{indent}}}\n"));
        }
        TypeDefinition::Variant(variant) => {
            push_docs(code, variant.docs.as_deref(), indent, options);
            code.push_str(&format!("{indent}variant {} {{\n", variant.name));
            for case in &variant.cases {
                push_docs(code, case.docs.as_deref(), &member_indent, options);
                match &case.payload {
                    Some(payload) => {
                        code.push_str(&format!("{member_indent}{}({payload}),\n", case.name))
                    }
                    None => code.push_str(&format!("{member_indent}{},\n", case.name)),
                }
            }
            code.push_str(&format!("{indent}}}\n"));
        }
        TypeDefinition::Enum(e) => {
            let has_docs = options.emit_docs && e.docs.is_some();
            let single_line = format!("{indent}enum {} {{ {} }}", e.name, e.values.join(", "));
            if !has_docs && single_line.len() <= options.doc_width {
                code.push_str(&single_line);
                code.push('\n');
                return;
            }
            push_docs(code, e.docs.as_deref(), indent, options);
            code.push_str(&format!("{indent}enum {} {{\n", e.name));
            for value in &e.values {
                code.push_str(&format!("{member_indent}{value},\n"));
            }
            code.push_str(&format!("{indent}}}\n"));
        }
        TypeDefinition::Alias(alias) => {
            push_docs(code, alias.docs.as_deref(), indent, options);
            code.push_str(&format!("{indent}type {} = {};\n", alias.name, alias.target));
        }
    }
}

fn render_interface(code: &mut String, interface: &Interface, options: &GeneratorOptions) {
    code.push_str(&format!("interface {} {{\n", interface.name));
    if !interface.uses.is_empty() {
        code.push_str(&format!(
            "{INDENT}use types.{{{}}};\n",
            interface.uses.join(", ")
        ));
    }
    if !interface.functions.is_empty() {
        code.push('\n');
    }
    for function in &interface.functions {
        push_docs(code, function.docs.as_deref(), INDENT, options);
        code.push_str(&format!("{INDENT}{}\n", signature(function)));
    }
    code.push_str("}\n");
}

/// `name: func(request: T) -> result<R, protocol-error>;`
pub fn signature(function: &Function) -> String {
    format!(
        "{}: func(request: {}) -> result<{}, protocol-error>;",
        function.name, function.request, function.response
    )
}

fn push_docs(code: &mut String, docs: Option<&str>, indent: &str, options: &GeneratorOptions) {
    if !options.emit_docs {
        return;
    }
    if let Some(docs) = docs {
        for line in wrap_doc(docs, indent, options.doc_width) {
            code.push_str(&line);
            code.push('\n');
        }
    }
}

/// Reflow `text` into `///` comment lines no wider than `width`.
///
/// Paragraphs (separated by blank lines) are kept apart by an empty `///`
/// line. A single word longer than the available width gets a line of its own.
pub fn wrap_doc(text: &str, indent: &str, width: usize) -> Vec<String> {
    let prefix = format!("{indent}///");
    let mut lines = Vec::new();

    let paragraphs = text
        .split("\n\n")
        .map(|p| p.split_whitespace().collect::<Vec<_>>())
        .filter(|words| !words.is_empty());

    for (i, words) in paragraphs.enumerate() {
        if i > 0 {
            lines.push(prefix.clone());
        }
        let mut line = prefix.clone();
        for word in words {
            let has_words = line.len() > prefix.len();
            if has_words && line.len() + 1 + word.len() > width {
                lines.push(std::mem::replace(&mut line, prefix.clone()));
            }
            line.push(' ');
            line.push_str(word);
        }
        // Paragraphs are never empty, so the last line always has a word.
        lines.push(line);
    }

    lines
}

#[cfg(test)]
#[path = "emit/emit_tests.rs"]
mod emit_tests;
