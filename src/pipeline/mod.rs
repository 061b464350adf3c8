//! Pipeline Module
//!
//! A pipeline is an ordered list of configured tasks. The tools in this
//! module use each task's configured connection names to check and repair the
//! order in which tasks must run.

pub mod error;
pub mod tools;

pub use error::{PipelineError, PipelineResult};
pub use tools::{is_pipeline_ordered, order_pipeline};

use crate::task::TaskDef;

use std::ops::Index;

#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    tasks: Vec<TaskDef>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: impl IntoIterator<Item = TaskDef>) -> Self {
        Self {
            tasks: tasks.into_iter().collect(),
        }
    }

    pub fn push(&mut self, task: TaskDef) {
        self.tasks.push(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TaskDef> {
        self.tasks.iter()
    }

    pub fn into_tasks(self) -> Vec<TaskDef> {
        self.tasks
    }
}

impl Index<usize> for Pipeline {
    type Output = TaskDef;

    fn index(&self, index: usize) -> &TaskDef {
        &self.tasks[index]
    }
}

impl<'a> IntoIterator for &'a Pipeline {
    type Item = &'a TaskDef;
    type IntoIter = std::slice::Iter<'a, TaskDef>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

impl FromIterator<TaskDef> for Pipeline {
    fn from_iter<I: IntoIterator<Item = TaskDef>>(iter: I) -> Self {
        Self::from_tasks(iter)
    }
}
