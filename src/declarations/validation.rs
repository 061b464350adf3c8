use super::types::*;
use crate::task::PIPELINE_TASK_CONFIG;

use std::collections::HashSet;

/// Checks that names in a declarations file are unique and that every
/// reference points at something declared somewhere in the file.
pub fn validate_declarations(declarations: &Declarations) -> Result<(), String> {
    let mut classes: HashSet<&str> = HashSet::new();
    classes.insert(PIPELINE_TASK_CONFIG);

    for connections in &declarations.connections {
        if connections.name.is_empty() {
            return Err("Connections class with an empty name".into());
        }
        if !classes.insert(&connections.name) {
            return Err(format!("Class '{}' is declared more than once", connections.name));
        }

        let mut fields = HashSet::new();
        for entry in &connections.connections {
            if !fields.insert(entry.field.as_str()) {
                return Err(format!(
                    "Connections class '{}' declares field '{}' more than once",
                    connections.name, entry.field
                ));
            }
        }
    }

    for config in &declarations.configs {
        if config.name.is_empty() {
            return Err("Config class with an empty name".into());
        }
        if !classes.insert(&config.name) {
            return Err(format!("Class '{}' is declared more than once", config.name));
        }

        let mut fields = HashSet::new();
        for field in &config.fields {
            if !fields.insert(field.name.as_str()) {
                return Err(format!(
                    "Config class '{}' declares field '{}' more than once",
                    config.name, field.name
                ));
            }
        }
    }

    for connections in &declarations.connections {
        if let Some(base) = &connections.extends {
            if !classes.contains(base.as_str()) {
                return Err(format!(
                    "Connections class '{}' extends unknown class '{}'",
                    connections.name, base
                ));
            }
        }
    }

    for config in &declarations.configs {
        for base in &config.bases {
            if !classes.contains(base.as_str()) {
                return Err(format!(
                    "Config class '{}' references unknown base '{}'",
                    config.name, base
                ));
            }
        }
        if let Some(connections) = &config.pipeline_connections {
            if !classes.contains(connections.as_str()) {
                return Err(format!(
                    "Config class '{}' references unknown connections class '{}'",
                    config.name, connections
                ));
            }
        }
    }

    for task in &declarations.tasks {
        if !declarations.configs.iter().any(|c| c.name == task.config) {
            return Err(format!(
                "Task '{}' references unknown config class '{}'",
                task.task, task.config
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declarations::load_declarations_from_string;

    fn check(content: &str) -> Result<(), String> {
        validate_declarations(&load_declarations_from_string(content).unwrap())
    }

    #[test]
    fn test_valid_declarations() {
        let content = r#"
[[connections]]
name = "C"

[[configs]]
name = "TaskConfig"
bases = ["PipelineTaskConfig"]
pipeline_connections = "C"

[[tasks]]
task = "pkg.Task"
config = "TaskConfig"
"#;
        assert_eq!(check(content), Ok(()));
    }

    #[test]
    fn test_duplicate_class_name() {
        let content = r#"
[[connections]]
name = "Same"

[[configs]]
name = "Same"
"#;
        assert_eq!(check(content), Err("Class 'Same' is declared more than once".to_string()));
    }

    #[test]
    fn test_root_name_is_reserved() {
        let content = r#"
[[configs]]
name = "PipelineTaskConfig"
"#;
        assert!(check(content).is_err());
    }

    #[test]
    fn test_duplicate_connection_field() {
        let content = r#"
[[connections]]
name = "C"

[[connections.connection]]
field = "input"
name = "raw"
kind = "input"

[[connections.connection]]
field = "input"
name = "flat"
kind = "input"
"#;
        assert!(check(content).unwrap_err().contains("field 'input'"));
    }

    #[test]
    fn test_unknown_references() {
        let unknown_base = r#"
[[configs]]
name = "A"
bases = ["Missing"]
"#;
        assert!(check(unknown_base).unwrap_err().contains("unknown base 'Missing'"));

        let unknown_task_config = r#"
[[tasks]]
task = "pkg.Task"
config = "Missing"
"#;
        assert!(check(unknown_task_config).unwrap_err().contains("unknown config class"));
    }
}
