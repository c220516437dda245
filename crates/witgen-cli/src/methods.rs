//! `witgen methods`: list the protocol methods a schema declares.

use crate::generate::read_schema;
use anyhow::{Context, Result};
use witgen::methods::{extract_methods, group_methods};
use witgen::{Document, Generator};

const HEADINGS: [&str; 4] = ["method", "category", "request", "response"];

/// Run the methods command
pub fn run(input: &str) -> Result<()> {
    let schema = read_schema(input)?;
    let document = Generator::default()
        .build(&schema)
        .with_context(|| format!("Failed to analyze {input}"))?;

    let rows = method_rows(&schema, &document);
    if rows.is_empty() {
        println!("No methods found in {input}");
        return Ok(());
    }
    print!("{}", format_table(&rows));
    Ok(())
}

/// One row per method, with the request and response types the generated
/// signatures use.
pub fn method_rows(schema: &serde_json::Value, document: &Document) -> Vec<[String; 4]> {
    let groups = group_methods(extract_methods(schema));
    // Interfaces alternate caller, handler; callers carry the same signatures.
    let callers = document.interfaces.iter().step_by(2);

    let mut rows = Vec::new();
    for (group, caller) in groups.iter().zip(callers) {
        for (entry, function) in group.methods.iter().zip(&caller.functions) {
            rows.push([
                entry.method.clone(),
                entry.category.clone(),
                function.request.to_string(),
                function.response.to_string(),
            ]);
        }
    }
    rows
}

/// Left-aligned columns separated by two spaces, headings first.
pub fn format_table(rows: &[[String; 4]]) -> String {
    let mut widths = HEADINGS.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut output = String::new();
    let headings = HEADINGS.map(str::to_string);
    for row in std::iter::once(&headings).chain(rows) {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        output.push_str(line.join("  ").trim_end());
        output.push('\n');
    }
    output
}
