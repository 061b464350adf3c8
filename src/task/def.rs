use super::connections::TaskConnections;
use super::error::TaskError;
use crate::config::Config;

/// A task in a pipeline: the name of the task implementation, its
/// configuration and an optional label.
#[derive(Clone, Debug)]
pub struct TaskDef {
    pub task_name: String,
    pub config: Config,
    pub label: String,
}

impl TaskDef {
    pub fn new(task_name: &str, config: Config) -> Self {
        Self {
            task_name: task_name.to_string(),
            config,
            label: String::new(),
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    /// Label if set, task name otherwise.
    pub fn display_name(&self) -> &str {
        if self.label.is_empty() {
            &self.task_name
        } else {
            &self.label
        }
    }

    pub fn connections(&self) -> Result<TaskConnections, TaskError> {
        TaskConnections::from_config(&self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Field, FieldType, FieldValue};
    use crate::connections::ConnectionsSpec;
    use crate::task::synthesis::{pipeline_task_config, ConfigDeclaration};

    #[test]
    fn test_task_def() {
        let spec = ConnectionsSpec::builder("DummyConnections").build();
        let add_config = ConfigDeclaration::new("AddConfig")
            .base(&pipeline_task_config())
            .pipeline_connections(&spec)
            .field("addend", Field::new(FieldType::Float, "amount to add").with_default(3.1))
            .declare()
            .unwrap();

        let task1 = TaskDef::new("pipetask.tests.Add", add_config.instantiate());
        assert_eq!(task1.task_name, "pipetask.tests.Add");
        assert_eq!(task1.config.class(), &add_config);
        assert_eq!(task1.label, "");
        assert_eq!(task1.display_name(), "pipetask.tests.Add");
        assert_eq!(task1.config.get("addend").unwrap(), Some(&FieldValue::Float(3.1)));

        let task2 = TaskDef::new("pipetask.tests.Add", add_config.instantiate()).with_label("add_task");
        assert_eq!(task2.label, "add_task");
        assert_eq!(task2.display_name(), "add_task");
        assert!(task2.connections().unwrap().iter().next().is_none());
    }
}
