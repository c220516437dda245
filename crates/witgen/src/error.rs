//! Error types for WIT generation

use thiserror::Error;

/// Result type alias for generation operations
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Error type for generation operations
///
/// Unsupported schema shapes never surface here: they degrade to the most
/// conservative WIT type instead. Only caller mistakes and recursive types
/// under [`RecursionPolicy::Reject`](crate::RecursionPolicy::Reject) do.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// Generator options are unusable
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// The document root is not a JSON Schema object
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// A type references itself, directly or through other types
    #[error("unsupported recursive shape: {}", cycle.join(" -> "))]
    RecursiveType { cycle: Vec<String> },
}

impl GenerateError {
    /// Returns a stable process exit code for the error
    pub fn exit_code(&self) -> i32 {
        match self {
            GenerateError::InvalidOptions(_) => 2,
            GenerateError::InvalidSchema(_) => 3,
            GenerateError::RecursiveType { .. } => 4,
        }
    }
}

impl From<serde_json::Error> for GenerateError {
    fn from(err: serde_json::Error) -> Self {
        GenerateError::InvalidOptions(err.to_string())
    }
}

impl From<toml::de::Error> for GenerateError {
    fn from(err: toml::de::Error) -> Self {
        GenerateError::InvalidOptions(err.to_string())
    }
}
