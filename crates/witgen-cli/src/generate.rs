//! Default command: schema in, WIT out.

use crate::GenerateArgs;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::debug;
use witgen::{Generator, GeneratorOptions};

/// Run the generate command
pub fn run(args: &GenerateArgs) -> Result<()> {
    let input = args.input.as_deref().context("No input schema given")?;
    let options = load_options(args)?;
    let schema = read_schema(input)?;

    let wit = Generator::new(options)
        .generate(&schema)
        .with_context(|| format!("Failed to generate WIT from {input}"))?;

    match &args.output {
        Some(path) => {
            fs::write(path, &wit)
                .with_context(|| format!("Failed to write WIT file: {}", path.display()))?;
            debug!(path = %path.display(), bytes = wit.len(), "wrote WIT document");
        }
        None => {
            io::stdout()
                .write_all(wit.as_bytes())
                .context("Failed to write WIT to stdout")?;
        }
    }

    Ok(())
}

/// Resolve options: defaults, then the TOML config file, then flags.
pub fn load_options(args: &GenerateArgs) -> Result<GeneratorOptions> {
    let mut options = match &args.config {
        Some(path) => read_config(path)?,
        None => GeneratorOptions::default(),
    };

    if let Some(package) = &args.package {
        options.package = package.clone();
    }
    if args.no_docs {
        options.emit_docs = false;
    }
    if let Some(width) = args.doc_width {
        options.doc_width = width;
    }
    if let Some(recursion) = args.recursion {
        options.recursion = recursion;
    }
    if args.dedupe_inline_types {
        options.dedupe_inline_types = true;
    }

    options.validate()?;
    Ok(options)
}

fn read_config(path: &Path) -> Result<GeneratorOptions> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    GeneratorOptions::from_toml(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Read and parse a schema from a path, or from stdin when `input` is `-`.
pub fn read_schema(input: &str) -> Result<Value> {
    let text = if input == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read schema from stdin")?;
        text
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read schema: {input}"))?
    };

    serde_json::from_str(&text).with_context(|| format!("Failed to parse JSON schema: {input}"))
}

#[cfg(test)]
#[path = "generate/generate_tests.rs"]
mod generate_tests;
