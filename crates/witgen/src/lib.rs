//! witgen - WIT interface generation from JSON Schema
//!
//! Translates a JSON Schema document describing an RPC-style protocol
//! (request/response pairs tagged with a `"method"` constant such as
//! `"tools/list"`) into a WebAssembly Interface Type document: a package
//! declaration, a shared `types` interface, and a caller/handler interface
//! pair per method category.
//!
//! # Architecture
//!
//! ```text
//! JSON Schema
//!     ↓
//!  [schema]    classify each node into a SchemaShape
//!     ↓
//!  [mapper]    SchemaShape → WitType / Record / Variant / Enum
//!     ↓
//!  [generator] definitions + positional inline types + cycle pass
//!     ↓        [methods] method mining → interface pairs
//!    IR (Document)
//!     ↓
//!  [emit]      WIT text
//! ```
//!
//! # Usage
//!
//! ```rust
//! use serde_json::json;
//! use witgen::{Generator, GeneratorOptions};
//!
//! let schema = json!({
//!     "definitions": {
//!         "ListToolsRequest": {
//!             "type": "object",
//!             "properties": { "method": { "const": "tools/list" } },
//!             "required": ["method"]
//!         },
//!         "ListToolsResult": {
//!             "type": "object",
//!             "properties": { "tools": { "type": "array", "items": { "type": "string" } } },
//!             "required": ["tools"]
//!         }
//!     }
//! });
//!
//! let generator = Generator::new(GeneratorOptions::default());
//! let wit = generator.generate(&schema).unwrap();
//!
//! assert!(wit.contains("package mcp:protocol@0.1.0;"));
//! assert!(wit.contains("%list: func(request: list-tools-request) -> result<list-tools-result, protocol-error>;"));
//! assert!(wit.contains("handle-list: func(request: list-tools-request)"));
//! ```
//!
//! Unsupported schema shapes never fail generation; they degrade to `string`
//! and log a warning through `tracing`.

mod config;
pub mod emit;
mod error;
mod generator;
pub mod ir;
pub mod mapper;
pub mod methods;
pub mod naming;
pub mod schema;

pub use config::{DEFAULT_PACKAGE, GeneratorOptions, MIN_DOC_WIDTH, RecursionPolicy};
pub use error::{GenerateError, GenerateResult};
pub use generator::{Generator, PROTOCOL_ERROR, generate};
pub use ir::{Document, TypeDefinition, WitType};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        GenerateError, GenerateResult, Generator, GeneratorOptions, RecursionPolicy, generate,
    };
}
