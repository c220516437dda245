//! Intermediate representation of generated WIT.
//!
//! The generator builds these values from the schema, then the emitter turns
//! them into text. Everything here is owned and immutable once built, apart
//! from the whole-document passes that rewrite named references.
//!
//! # Structure
//!
//! - [`WitType`]: a type reference (`u8`, `list<string>`, `option<tool>`, ...)
//! - [`TypeDefinition`]: a named record, variant, enum or type alias
//! - [`Interface`]: one `interface` block with its functions
//! - [`Document`]: everything rendered into one `.wit` file

use std::fmt;

/// A reference to a WIT type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WitType {
    Bool,
    S8,
    S16,
    S32,
    S64,
    U8,
    U16,
    U32,
    U64,
    F64,
    String,
    List(Box<WitType>),
    Option(Box<WitType>),
    Tuple(Vec<WitType>),
    /// A type declared in the `types` interface.
    Named(String),
}

impl WitType {
    pub fn list(inner: WitType) -> Self {
        WitType::List(Box::new(inner))
    }

    /// Wrap in `option<..>` unless already optional.
    pub fn optional(self) -> Self {
        match self {
            WitType::Option(_) => self,
            other => WitType::Option(Box::new(other)),
        }
    }

    pub fn is_option(&self) -> bool {
        matches!(self, WitType::Option(_))
    }

    /// Append every named type referenced, depth first.
    pub fn collect_named<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            WitType::Named(name) => out.push(name),
            WitType::List(inner) | WitType::Option(inner) => inner.collect_named(out),
            WitType::Tuple(items) => items.iter().for_each(|item| item.collect_named(out)),
            _ => {}
        }
    }

    /// Replace every reference to `name`. Returns true if anything changed.
    pub fn replace_named(&mut self, name: &str, replacement: &WitType) -> bool {
        match self {
            WitType::Named(current) if current == name => {
                *self = replacement.clone();
                true
            }
            WitType::List(inner) | WitType::Option(inner) => inner.replace_named(name, replacement),
            WitType::Tuple(items) => items
                .iter_mut()
                .fold(false, |changed, item| item.replace_named(name, replacement) || changed),
            _ => false,
        }
    }
}

impl fmt::Display for WitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WitType::Bool => write!(f, "bool"),
            WitType::S8 => write!(f, "s8"),
            WitType::S16 => write!(f, "s16"),
            WitType::S32 => write!(f, "s32"),
            WitType::S64 => write!(f, "s64"),
            WitType::U8 => write!(f, "u8"),
            WitType::U16 => write!(f, "u16"),
            WitType::U32 => write!(f, "u32"),
            WitType::U64 => write!(f, "u64"),
            WitType::F64 => write!(f, "f64"),
            WitType::String => write!(f, "string"),
            WitType::List(inner) => write!(f, "list<{inner}>"),
            WitType::Option(inner) => write!(f, "option<{inner}>"),
            WitType::Tuple(items) => {
                write!(f, "tuple<")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ">")
            }
            WitType::Named(name) => write!(f, "{name}"),
        }
    }
}

/// A field in a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Sanitized field name.
    pub name: String,

    /// Field type, without the `option<..>` added for optional fields.
    pub ty: WitType,

    /// Whether the source property was absent from `required`.
    pub optional: bool,

    pub docs: Option<String>,
}

impl Field {
    /// The type as declared, wrapped in `option<..>` when optional.
    pub fn wit_type(&self) -> WitType {
        if self.optional {
            self.ty.clone().optional()
        } else {
            self.ty.clone()
        }
    }
}

/// A case in a variant.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub name: String,
    pub payload: Option<WitType>,
    pub docs: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,
    pub fields: Vec<Field>,
    pub docs: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub name: String,
    pub cases: Vec<Case>,
    pub docs: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    pub name: String,
    pub values: Vec<String>,
    pub docs: Option<String>,
}

/// `type name = target;`
#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    pub name: String,
    pub target: WitType,
    pub docs: Option<String>,
}

/// A named type emitted into the `types` interface.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefinition {
    Record(Record),
    Variant(Variant),
    Enum(Enum),
    Alias(Alias),
}

impl TypeDefinition {
    pub fn name(&self) -> &str {
        match self {
            TypeDefinition::Record(r) => &r.name,
            TypeDefinition::Variant(v) => &v.name,
            TypeDefinition::Enum(e) => &e.name,
            TypeDefinition::Alias(a) => &a.name,
        }
    }

    /// The WIT keyword introducing the declaration.
    pub fn keyword(&self) -> &'static str {
        match self {
            TypeDefinition::Record(_) => "record",
            TypeDefinition::Variant(_) => "variant",
            TypeDefinition::Enum(_) => "enum",
            TypeDefinition::Alias(_) => "type",
        }
    }

    /// Named types this definition refers to, in declaration order.
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        match self {
            TypeDefinition::Record(r) => r.fields.iter().for_each(|f| f.ty.collect_named(&mut out)),
            TypeDefinition::Variant(v) => v
                .cases
                .iter()
                .filter_map(|c| c.payload.as_ref())
                .for_each(|p| p.collect_named(&mut out)),
            TypeDefinition::Enum(_) => {}
            TypeDefinition::Alias(a) => a.target.collect_named(&mut out),
        }
        out
    }

    /// Rewrite references to `name` inside this definition.
    ///
    /// Returns the names of the members (fields or cases) that changed.
    pub fn replace_named(&mut self, name: &str, replacement: &WitType) -> Vec<String> {
        let mut changed = Vec::new();
        match self {
            TypeDefinition::Record(r) => {
                for field in &mut r.fields {
                    if field.ty.replace_named(name, replacement) {
                        changed.push(field.name.clone());
                    }
                }
            }
            TypeDefinition::Variant(v) => {
                for case in &mut v.cases {
                    if let Some(payload) = case.payload.as_mut() {
                        if payload.replace_named(name, replacement) {
                            changed.push(case.name.clone());
                        }
                    }
                }
            }
            TypeDefinition::Enum(_) => {}
            TypeDefinition::Alias(a) => {
                if a.target.replace_named(name, replacement) {
                    changed.push(a.name.clone());
                }
            }
        }
        changed
    }

    /// Append a note to the docs of a member (or of the definition itself).
    pub fn annotate(&mut self, member: &str, note: &str) {
        let docs = match self {
            TypeDefinition::Record(r) => r
                .fields
                .iter_mut()
                .find(|f| f.name == member)
                .map(|f| &mut f.docs),
            TypeDefinition::Variant(v) => v
                .cases
                .iter_mut()
                .find(|c| c.name == member)
                .map(|c| &mut c.docs),
            TypeDefinition::Enum(e) => Some(&mut e.docs),
            TypeDefinition::Alias(a) => Some(&mut a.docs),
        };
        if let Some(docs) = docs {
            *docs = Some(match docs.take() {
                Some(existing) => format!("{existing}\n\n{note}"),
                None => note.to_string(),
            });
        }
    }

    /// Everything but the name and docs, for structural comparison.
    pub fn shape_key(&self) -> String {
        match self {
            TypeDefinition::Record(r) => {
                let fields: Vec<String> = r
                    .fields
                    .iter()
                    .map(|f| format!("{}:{}", f.name, f.wit_type()))
                    .collect();
                format!("record{{{}}}", fields.join(","))
            }
            TypeDefinition::Variant(v) => {
                let cases: Vec<String> = v
                    .cases
                    .iter()
                    .map(|c| match &c.payload {
                        Some(p) => format!("{}({p})", c.name),
                        None => c.name.clone(),
                    })
                    .collect();
                format!("variant{{{}}}", cases.join(","))
            }
            TypeDefinition::Enum(e) => format!("enum{{{}}}", e.values.join(",")),
            TypeDefinition::Alias(a) => format!("type={}", a.target),
        }
    }
}

/// A function in an interface block.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// Function name, `%`-escaped if it is a keyword.
    pub name: String,
    pub request: WitType,
    pub response: WitType,
    pub docs: Option<String>,
}

/// One `interface` block.
#[derive(Debug, Clone, PartialEq)]
pub struct Interface {
    pub name: String,
    /// Names imported with `use types.{..}`.
    pub uses: Vec<String>,
    pub functions: Vec<Function>,
}

/// A complete generated document, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub package: String,
    /// Contents of the `types` interface, in emission order.
    pub types: Vec<TypeDefinition>,
    /// Caller and handler interfaces, paired per category.
    pub interfaces: Vec<Interface>,
}

impl Document {
    pub fn type_named(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.iter().find(|t| t.name() == name)
    }

    pub fn interface_named(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|i| i.name == name)
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    fn named(name: &str) -> WitType {
        WitType::Named(name.to_string())
    }

    #[test]
    fn WitType___display___renders_nested_types() {
        let ty = WitType::list(WitType::Tuple(vec![
            WitType::String,
            WitType::Option(Box::new(named("tool"))),
        ]));

        assert_eq!(ty.to_string(), "list<tuple<string, option<tool>>>");
    }

    #[test]
    fn WitType___optional___does_not_double_wrap() {
        let ty = WitType::String.optional().optional();

        assert_eq!(ty.to_string(), "option<string>");
    }

    #[test]
    fn WitType___replace_named___rewrites_deep_references() {
        let mut ty = WitType::list(WitType::Option(Box::new(named("node"))));

        let changed = ty.replace_named("node", &WitType::String);

        assert!(changed);
        assert_eq!(ty.to_string(), "list<option<string>>");
    }

    #[test]
    fn Field___wit_type___wraps_optional_fields() {
        let field = Field {
            name: "label".into(),
            ty: WitType::String,
            optional: true,
            docs: None,
        };

        assert_eq!(field.wit_type().to_string(), "option<string>");
    }

    #[test]
    fn TypeDefinition___references___lists_field_types_in_order() {
        let def = TypeDefinition::Record(Record {
            name: "tool".into(),
            fields: vec![
                Field {
                    name: "schema".into(),
                    ty: named("tool-input-schema"),
                    optional: false,
                    docs: None,
                },
                Field {
                    name: "tags".into(),
                    ty: WitType::list(named("tag")),
                    optional: true,
                    docs: None,
                },
            ],
            docs: None,
        });

        assert_eq!(def.references(), vec!["tool-input-schema", "tag"]);
    }

    #[test]
    fn TypeDefinition___shape_key___ignores_name_and_docs() {
        let a = TypeDefinition::Enum(Enum {
            name: "a".into(),
            values: vec!["x".into(), "y".into()],
            docs: Some("First".into()),
        });
        let b = TypeDefinition::Enum(Enum {
            name: "b".into(),
            values: vec!["x".into(), "y".into()],
            docs: None,
        });

        assert_eq!(a.shape_key(), b.shape_key());
    }

    #[test]
    fn TypeDefinition___annotate___appends_to_field_docs() {
        let mut def = TypeDefinition::Record(Record {
            name: "node".into(),
            fields: vec![Field {
                name: "parent".into(),
                ty: WitType::String,
                optional: true,
                docs: Some("Parent node.".into()),
            }],
            docs: None,
        });

        def.annotate("parent", "JSON-encoded.");

        let TypeDefinition::Record(record) = def else {
            panic!("expected record");
        };
        assert_eq!(
            record.fields[0].docs.as_deref(),
            Some("Parent node.\n\nJSON-encoded.")
        );
    }
}
