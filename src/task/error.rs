use crate::config::ConfigError;
use thiserror::Error;

/// Fatal errors raised while declaring a config class.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeclarationError {
    #[error("PipelineTaskConfig '{class}' or one of its bases must be declared with a connections class")]
    MissingConnections { class: String },

    #[error("Can only assign a connections class to pipeline_connections of '{class}', got {found}")]
    InvalidConnectionsType { class: String, found: String },

    #[error("'{class}' declares '{field}' more than once in its connections config")]
    FieldCollision { class: String, field: String },

    #[error("'{class}' is not a PipelineTaskConfig and cannot take pipeline_connections")]
    UnexpectedConnections { class: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while reading configured connection names back from a config.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaskError {
    #[error("config class '{0}' is not a PipelineTaskConfig")]
    NotPipelineTask(String),

    #[error("connection '{connection}' uses unknown template '{template}'")]
    UnknownTemplate { connection: String, template: String },

    #[error("connection '{0}' has no configured name")]
    UnsetConnection(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
