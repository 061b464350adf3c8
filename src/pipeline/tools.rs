//! Pipeline ordering tools.
//!
//! A pipeline is correctly ordered when every task producing a dataset runs
//! before all tasks consuming it. Datasets consumed but produced by no task
//! are pre-existing and impose no ordering.

use super::error::{PipelineError, PipelineResult};
use super::Pipeline;
use crate::task::{TaskConnections, TaskDef};

use std::collections::{BTreeMap, HashMap, HashSet};

fn task_connections(task: &TaskDef) -> PipelineResult<TaskConnections> {
    task.connections().map_err(|source| PipelineError::Task {
        task: task.display_name().to_string(),
        source,
    })
}

fn all_connections(pipeline: &Pipeline) -> PipelineResult<Vec<TaskConnections>> {
    pipeline.iter().map(task_connections).collect()
}

/// Checks whether every producer in the pipeline precedes its consumers.
///
/// Only regular inputs are considered; prerequisite inputs are expected to
/// exist before the pipeline runs.
pub fn is_pipeline_ordered(pipeline: &Pipeline) -> PipelineResult<bool> {
    let connections = all_connections(pipeline)?;

    let mut producer_index: HashMap<&str, usize> = HashMap::new();
    for (idx, task) in connections.iter().enumerate() {
        for output in task.outputs() {
            if producer_index.insert(output, idx).is_some() {
                return Err(PipelineError::DuplicateOutput(output.to_string()));
            }
        }
    }

    for (idx, task) in connections.iter().enumerate() {
        for input in task.inputs() {
            if let Some(&producer) = producer_index.get(input) {
                if producer >= idx {
                    tracing::debug!(
                        "Task '{}' consumes '{}' before it is produced",
                        pipeline[idx].display_name(),
                        input
                    );
                    return Ok(false);
                }
            }
        }
    }

    Ok(true)
}

/// Reorders tasks so that data dependencies are satisfied, keeping the
/// original relative order wherever the dependencies allow it.
pub fn order_pipeline(pipeline: Pipeline) -> PipelineResult<Pipeline> {
    let connections = all_connections(&pipeline)?;

    // Kahn's algorithm with an ordered ready queue

    // Collect the inputs and outputs of every task
    let mut inputs: BTreeMap<usize, HashSet<String>> = BTreeMap::new();
    let mut outputs: Vec<HashSet<String>> = Vec::with_capacity(connections.len());
    let mut all_inputs: HashSet<String> = HashSet::new();
    let mut all_outputs: HashSet<String> = HashSet::new();

    for (idx, task) in connections.iter().enumerate() {
        for output in task.outputs() {
            if all_outputs.contains(output) {
                return Err(PipelineError::DuplicateOutput(output.to_string()));
            }
        }
        let task_outputs: HashSet<String> =
            task.outputs().into_iter().map(str::to_string).collect();
        all_outputs.extend(task_outputs.iter().cloned());
        outputs.push(task_outputs);

        let task_inputs: HashSet<String> = task
            .inputs()
            .into_iter()
            .chain(task.prerequisite_inputs())
            .map(str::to_string)
            .collect();
        all_inputs.extend(task_inputs.iter().cloned());
        inputs.insert(idx, task_inputs);
    }

    // Inputs nobody produces must already exist
    let pre_existing: HashSet<String> = all_inputs.difference(&all_outputs).cloned().collect();

    let mut queue: Vec<usize> = Vec::new();
    let mut order: Vec<usize> = Vec::with_capacity(connections.len());
    let mut produced = &pre_existing;

    // Release tasks whose inputs are all produced, lowest index first
    loop {
        for task_inputs in inputs.values_mut() {
            task_inputs.retain(|name| !produced.contains(name));
        }

        let ready: Vec<usize> = inputs
            .iter()
            .filter(|(_, pending)| pending.is_empty())
            .map(|(&idx, _)| idx)
            .collect();
        for idx in &ready {
            inputs.remove(idx);
        }
        queue.extend(ready);
        queue.sort_unstable();

        if queue.is_empty() {
            break;
        }
        let idx = queue.remove(0);
        order.push(idx);
        produced = &outputs[idx];
    }

    // Tasks still waiting are part of a cycle
    if !inputs.is_empty() {
        let loops: Vec<String> = inputs
            .iter()
            .map(|(&idx, pending)| {
                format!(
                    "   {} -> {} -> {}",
                    format_names(pending),
                    pipeline[idx].display_name(),
                    format_names(&outputs[idx])
                )
            })
            .collect();
        return Err(PipelineError::DataCycle(loops.join("\n")));
    }

    tracing::debug!("Pipeline order: {:?}", order);

    // Rebuild the pipeline in the new order
    let mut slots: Vec<Option<TaskDef>> = pipeline.into_tasks().into_iter().map(Some).collect();
    Ok(order
        .into_iter()
        .filter_map(|idx| slots[idx].take())
        .collect())
}

fn format_names(names: &HashSet<String>) -> String {
    let mut sorted: Vec<&str> = names.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    format!("{{{}}}", sorted.join(", "))
}
