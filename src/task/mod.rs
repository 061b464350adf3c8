//! Pipeline task configs: declaration-time synthesis of the `connections`
//! config and read-back of configured connection names.

pub mod connections;
pub mod def;
pub mod error;
pub mod synthesis;

pub use connections::{ResolvedConnection, TaskConnections};
pub use def::TaskDef;
pub use error::{DeclarationError, TaskError};
pub use synthesis::{
    is_pipeline_task_config, pipeline_task_config, ConfigDeclaration, CONNECTIONS_FIELD,
    PIPELINE_TASK_CONFIG,
};
