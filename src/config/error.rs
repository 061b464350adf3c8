use super::field::FieldType;
use thiserror::Error;

/// Errors raised by config classes and config instances.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("'{class}' has no field named '{field}'")]
    UnknownField { class: String, field: String },

    #[error("field '{field}' of '{class}' is not a nested config")]
    NotNested { class: String, field: String },

    #[error("field '{field}' of '{class}' is a nested config, not a scalar")]
    NotScalar { class: String, field: String },

    #[error("field '{field}' of '{class}' expects {expected}, got {found}")]
    TypeMismatch {
        class: String,
        field: String,
        expected: FieldType,
        found: FieldType,
    },

    #[error("field '{field}' of '{class}' is required but has no value")]
    MissingValue { class: String, field: String },

    #[error("Empty field path")]
    EmptyPath,
}
