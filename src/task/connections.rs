use super::error::TaskError;
use super::synthesis::CONNECTIONS_FIELD;
use crate::config::Config;
use crate::connections::ConnectionKind;

use indexmap::IndexMap;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static TEMPLATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("valid template pattern"));

/// A connection whose configured name has been formatted with the task's
/// template values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedConnection {
    pub kind: ConnectionKind,
    pub name: String,
}

/// The connection names of one configured task, keyed by connection field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskConnections {
    connections: IndexMap<String, ResolvedConnection>,
}

impl TaskConnections {
    /// Reads the configured connection names of a pipeline task config instance.
    pub fn from_config(config: &Config) -> Result<Self, TaskError> {
        let class = config.class();
        let spec = class
            .connections_class()
            .ok_or_else(|| TaskError::NotPipelineTask(class.name().to_string()))?;
        let values = config.nested(CONNECTIONS_FIELD)?;

        let mut templates: HashMap<&str, &str> = HashMap::new();
        if let Some(defaults) = spec.default_templates() {
            for template in defaults.keys() {
                if let Some(value) = values.get_str(template)? {
                    templates.insert(template.as_str(), value);
                }
            }
        }

        let mut connections = IndexMap::new();
        for (field, descriptor) in spec.all_connections() {
            let configured = values
                .get_str(field)?
                .ok_or_else(|| TaskError::UnsetConnection(field.clone()))?;
            let name = format_template(field, configured, &templates)?;

            connections.insert(
                field.clone(),
                ResolvedConnection {
                    kind: descriptor.kind,
                    name,
                },
            );
        }

        Ok(Self { connections })
    }

    pub fn get(&self, field: &str) -> Option<&ResolvedConnection> {
        self.connections.get(field)
    }

    pub fn name(&self, field: &str) -> Option<&str> {
        self.get(field).map(|c| c.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedConnection)> {
        self.connections.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Resolved names of every connection of `kind`, in declaration order.
    pub fn names_of(&self, kind: ConnectionKind) -> Vec<&str> {
        self.connections
            .values()
            .filter(|c| c.kind == kind)
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn inputs(&self) -> Vec<&str> {
        self.names_of(ConnectionKind::Input)
    }

    pub fn prerequisite_inputs(&self) -> Vec<&str> {
        self.names_of(ConnectionKind::PrerequisiteInput)
    }

    pub fn outputs(&self) -> Vec<&str> {
        self.names_of(ConnectionKind::Output)
    }
}

/// Replaces every `{template}` placeholder in `pattern`.
fn format_template(
    connection: &str,
    pattern: &str,
    templates: &HashMap<&str, &str>,
) -> Result<String, TaskError> {
    let mut out = String::with_capacity(pattern.len());
    let mut last = 0;

    for placeholder in TEMPLATE_PATTERN.find_iter(pattern) {
        let key = &pattern[placeholder.start() + 1..placeholder.end() - 1];
        let value = templates
            .get(key)
            .ok_or_else(|| TaskError::UnknownTemplate {
                connection: connection.to_string(),
                template: key.to_string(),
            })?;
        out.push_str(&pattern[last..placeholder.start()]);
        out.push_str(value);
        last = placeholder.end();
    }
    out.push_str(&pattern[last..]);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigClass, Namespace};
    use crate::connections::ConnectionsSpec;
    use crate::task::synthesis::{pipeline_task_config, ConfigDeclaration};
    use std::sync::Arc;

    fn coadd_class() -> Arc<ConfigClass> {
        let spec = ConnectionsSpec::builder("CoaddConnections")
            .input("calexp", "calexp")
            .prerequisite_input("skyMap", "{coaddName}Coadd_skyMap")
            .output("coadd", "{coaddName}Coadd_{band}")
            .template("coaddName", "deep")
            .template("band", "r")
            .build();
        ConfigDeclaration::new("CoaddConfig")
            .base(&pipeline_task_config())
            .pipeline_connections(&spec)
            .declare()
            .unwrap()
    }

    #[test]
    fn test_names_formatted_with_template_defaults() {
        let config = coadd_class().instantiate();
        let connections = TaskConnections::from_config(&config).unwrap();

        assert_eq!(connections.inputs(), vec!["calexp"]);
        assert_eq!(connections.prerequisite_inputs(), vec!["deepCoadd_skyMap"]);
        assert_eq!(connections.outputs(), vec!["deepCoadd_r"]);
        assert_eq!(connections.get("coadd").unwrap().kind, ConnectionKind::Output);
    }

    #[test]
    fn test_overridden_names_and_templates_are_used() {
        let mut config = coadd_class().instantiate();
        config.set_path("connections.coaddName", "goodSeeing").unwrap();
        config.set_path("connections.calexp", "fakes_calexp").unwrap();

        let connections = TaskConnections::from_config(&config).unwrap();
        assert_eq!(connections.name("calexp"), Some("fakes_calexp"));
        assert_eq!(connections.name("coadd"), Some("goodSeeingCoadd_r"));
    }

    #[test]
    fn test_unknown_template_is_reported() {
        let mut config = coadd_class().instantiate();
        config.set_path("connections.calexp", "{visit}_calexp").unwrap();

        let err = TaskConnections::from_config(&config).unwrap_err();
        assert_eq!(
            err,
            TaskError::UnknownTemplate {
                connection: "calexp".to_string(),
                template: "visit".to_string()
            }
        );
    }

    #[test]
    fn test_unset_connection_is_reported() {
        let mut config = coadd_class().instantiate();
        config.nested_mut("connections").unwrap().unset("calexp").unwrap();

        assert_eq!(
            TaskConnections::from_config(&config),
            Err(TaskError::UnsetConnection("calexp".to_string()))
        );
    }

    #[test]
    fn test_plain_config_is_rejected() {
        let plain = ConfigClass::new("Plain", vec![], Namespace::new()).unwrap();
        assert_eq!(
            TaskConnections::from_config(&plain.instantiate()),
            Err(TaskError::NotPipelineTask("Plain".to_string()))
        );
    }
}
