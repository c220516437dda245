//! Generator configuration types

use crate::error::{GenerateError, GenerateResult};
use serde::{Deserialize, Serialize};

/// Package declared when the caller does not supply one
pub const DEFAULT_PACKAGE: &str = "mcp:protocol@0.1.0";

/// Narrowest comment width accepted by [`GeneratorOptions::validate`]
pub const MIN_DOC_WIDTH: usize = 20;

/// How reference cycles between generated types are handled
///
/// WIT has no recursive types, so a cycle must be broken or refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecursionPolicy {
    /// Replace the reference that closes the cycle with a JSON-encoded `string`
    #[default]
    JsonString,

    /// Fail generation with [`GenerateError::RecursiveType`]
    Reject,
}

impl std::str::FromStr for RecursionPolicy {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json-string" => Ok(RecursionPolicy::JsonString),
            "reject" => Ok(RecursionPolicy::Reject),
            other => Err(GenerateError::InvalidOptions(format!(
                "unknown recursion policy '{other}' (expected json-string or reject)"
            ))),
        }
    }
}

/// Options for one generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorOptions {
    /// Package declaration, e.g. `mcp:protocol@0.1.0`
    #[serde(default = "default_package")]
    pub package: String,

    /// Reflow schema descriptions into `///` comments
    #[serde(default = "default_emit_docs")]
    pub emit_docs: bool,

    /// Maximum width of a generated comment line, indentation included
    #[serde(default = "default_doc_width")]
    pub doc_width: usize,

    /// Cycle handling between generated types
    #[serde(default)]
    pub recursion: RecursionPolicy,

    /// Reuse an existing inline type when a new one has an identical body
    #[serde(default)]
    pub dedupe_inline_types: bool,
}

fn default_package() -> String {
    DEFAULT_PACKAGE.to_string()
}

fn default_emit_docs() -> bool {
    true
}

fn default_doc_width() -> usize {
    80
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            package: default_package(),
            emit_docs: default_emit_docs(),
            doc_width: default_doc_width(),
            recursion: RecursionPolicy::default(),
            dedupe_inline_types: false,
        }
    }
}

impl GeneratorOptions {
    /// Create options with every field at its default
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the package declaration
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    /// Parse options from JSON bytes; empty input yields defaults
    pub fn from_json(bytes: &[u8]) -> GenerateResult<Self> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Parse options from a TOML document
    pub fn from_toml(content: &str) -> GenerateResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Check that the options can produce a well-formed document
    pub fn validate(&self) -> GenerateResult<()> {
        validate_package(&self.package)?;

        if self.doc_width < MIN_DOC_WIDTH {
            return Err(GenerateError::InvalidOptions(format!(
                "doc_width must be at least {MIN_DOC_WIDTH}, got {}",
                self.doc_width
            )));
        }

        Ok(())
    }
}

/// Accepts `namespace:name` with an optional `@version` suffix.
fn validate_package(package: &str) -> GenerateResult<()> {
    let invalid = |reason: &str| {
        Err(GenerateError::InvalidOptions(format!(
            "package '{package}' {reason}"
        )))
    };

    let (path, version) = match package.split_once('@') {
        Some((path, version)) => (path, Some(version)),
        None => (package, None),
    };

    let Some((namespace, name)) = path.split_once(':') else {
        return invalid("must have the form namespace:name[@version]");
    };

    for part in [namespace, name] {
        let valid = !part.is_empty()
            && part.starts_with(|c: char| c.is_ascii_lowercase())
            && part
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid {
            return invalid("has an invalid namespace or name segment");
        }
    }

    if let Some(version) = version {
        let valid = !version.is_empty()
            && version
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+'));
        if !valid {
            return invalid("has an invalid version");
        }
    }

    Ok(())
}
