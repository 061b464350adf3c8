use crate::task::TaskError;
use thiserror::Error;

/// Errors that can occur while inspecting or ordering a pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Dataset type '{0}' appears more than once as output")]
    DuplicateOutput(String),

    #[error("Pipeline has data cycles:\n{0}")]
    DataCycle(String),

    #[error("Task '{task}': {source}")]
    Task {
        task: String,
        #[source]
        source: TaskError,
    },
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
