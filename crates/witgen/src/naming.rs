//! Naming convention utilities for WIT generation.
//!
//! WIT identifiers are kebab-case: lowercase ASCII fragments joined by single
//! dashes, each fragment starting with a letter. This module turns arbitrary
//! schema names (`ListToolsRequest`, `https://example.com/v2.schema`,
//! `list_changed`) into such identifiers.
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `ListToolsRequest` | [`to_wit_identifier`] | `list-tools-request` |
//! | `type` | [`to_wit_identifier`] | `type-value` |
//! | `list` | [`to_function_name`] | `%list` |
//! | `tools` | [`singularize`] | `tool` |

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Identifier used when sanitization leaves nothing behind.
pub const EMPTY_IDENTIFIER: &str = "unnamed";

/// Suffix appended to identifiers that collide with a WIT keyword.
pub const RESERVED_SUFFIX: &str = "-value";

static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "as",
        "async",
        "await",
        "bool",
        "borrow",
        "char",
        "constructor",
        "enum",
        "error-context",
        "export",
        "f32",
        "f64",
        "flags",
        "float32",
        "float64",
        "from",
        "func",
        "future",
        "import",
        "include",
        "interface",
        "list",
        "option",
        "own",
        "package",
        "record",
        "resource",
        "result",
        "s8",
        "s16",
        "s32",
        "s64",
        "static",
        "stream",
        "string",
        "tuple",
        "type",
        "u8",
        "u16",
        "u32",
        "u64",
        "use",
        "variant",
        "with",
        "world",
    ]
    .into_iter()
    .collect()
});

/// Returns true if `ident` is a WIT keyword.
pub fn is_reserved(ident: &str) -> bool {
    RESERVED_WORDS.contains(ident)
}

/// Convert an arbitrary string into a valid, non-reserved WIT identifier.
///
/// Deterministic: the same input always yields the same identifier.
///
/// # Examples
///
/// ```
/// use witgen::naming::to_wit_identifier;
///
/// assert_eq!(to_wit_identifier("ListToolsRequest"), "list-tools-request");
/// assert_eq!(to_wit_identifier("notifications/tools/list_changed"), "notifications-tools-list-changed");
/// assert_eq!(to_wit_identifier("type"), "type-value");
/// assert_eq!(to_wit_identifier("2024-11-05"), "n20241105");
/// assert_eq!(to_wit_identifier("$$$"), "unnamed");
/// ```
pub fn to_wit_identifier(s: &str) -> String {
    let label = to_kebab_label(s);
    if is_reserved(&label) {
        format!("{label}{RESERVED_SUFFIX}")
    } else {
        label
    }
}

/// Convert an action into a function name.
///
/// Keywords are escaped with `%` rather than suffixed, so `list` stays a
/// function named `list`.
pub fn to_function_name(s: &str) -> String {
    let label = to_kebab_label(s);
    escape_keyword(&label)
}

/// Prefix a keyword with the WIT `%` escape.
pub fn escape_keyword(ident: &str) -> String {
    if is_reserved(ident) {
        format!("%{ident}")
    } else {
        ident.to_string()
    }
}

/// Sanitize into a kebab-case label without the keyword check.
pub fn to_kebab_label(s: &str) -> String {
    let without_scheme = match s.find("://") {
        Some(idx) => &s[idx + 3..],
        None => s,
    };

    let chars: Vec<char> = without_scheme.chars().collect();
    let mut dashed = String::with_capacity(chars.len() + 8);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase() && i > 0 {
                let prev = chars[i - 1];
                let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
                if prev.is_ascii_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_ascii_uppercase() && next_is_lower)
                {
                    dashed.push('-');
                }
            }
            dashed.push(c.to_ascii_lowercase());
        } else if matches!(c, '/' | '.' | ':' | '_' | '-' | '#') || c.is_whitespace() {
            dashed.push('-');
        }
    }

    let mut label = String::with_capacity(dashed.len());
    for fragment in dashed.split('-').filter(|f| !f.is_empty()) {
        // Fragments must start with a letter; a numeric fragment joins the previous one.
        let starts_with_digit = fragment.starts_with(|c: char| c.is_ascii_digit());
        if !label.is_empty() && !starts_with_digit {
            label.push('-');
        }
        label.push_str(fragment);
    }

    if label.is_empty() {
        return EMPTY_IDENTIFIER.to_string();
    }
    if label.starts_with(|c: char| c.is_ascii_digit()) {
        label.insert(0, 'n');
    }
    label
}

/// Capitalize the first letter of a string.
///
/// # Examples
///
/// ```
/// use witgen::naming::capitalize;
///
/// assert_eq!(capitalize("tools"), "Tools");
/// assert_eq!(capitalize(""), "");
/// ```
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Strip a single trailing `s`.
pub fn singularize(s: &str) -> &str {
    s.strip_suffix('s').unwrap_or(s)
}

/// Hands out names that are unique within one scope.
///
/// A repeated name gets a numeric suffix on its last fragment (`foo`, `foo2`,
/// `foo3`), skipping any candidate that would land on a keyword.
#[derive(Debug, Default)]
pub struct UniqueNames {
    taken: HashSet<String>,
}

impl UniqueNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `name` has already been handed out or reserved.
    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Mark `name` as used without claiming a variant of it.
    pub fn reserve(&mut self, name: &str) {
        self.taken.insert(name.to_string());
    }

    /// Claim `base`, or the first free numbered variant of it.
    pub fn claim(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }
        let mut n = 2usize;
        loop {
            let candidate = format!("{base}{n}");
            if !is_reserved(&candidate) && self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
#[path = "naming/naming_tests.rs"]
mod naming_tests;
