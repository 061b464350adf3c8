//! Class Catalog
//!
//! The catalog turns declarations into classes, in file order, and keeps them
//! by name. `PipelineTaskConfig` is always present. Declaration errors raised
//! by the synthesizer are surfaced unchanged under an `anyhow` context naming
//! the class being declared.

use super::types::*;
use crate::config::{ClassRef, ConfigClass, Field};
use crate::connections::{ConnectionDescriptor, ConnectionsSpec};
use crate::pipeline::Pipeline;
use crate::task::{pipeline_task_config, ConfigDeclaration, TaskDef, PIPELINE_TASK_CONFIG};

use anyhow::{anyhow, bail, Context};
use indexmap::IndexMap;
use std::sync::Arc;

pub struct Catalog {
    classes: IndexMap<String, ClassRef>,
    tasks: Vec<TaskDeclaration>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        let mut classes = IndexMap::new();
        classes.insert(
            PIPELINE_TASK_CONFIG.to_string(),
            ClassRef::Config(pipeline_task_config()),
        );
        Self {
            classes,
            tasks: Vec::new(),
        }
    }

    /// Declares every connections class, then every config class, then
    /// records the tasks.
    pub fn from_declarations(declarations: &Declarations) -> anyhow::Result<Self> {
        let mut catalog = Self::new();

        // Connections classes first, so config classes can name them
        for connections in &declarations.connections {
            catalog.declare_connections(connections)?;
        }
        // Config classes in file order, bases before derived classes
        for config in &declarations.configs {
            catalog.declare_config(config)?;
        }
        // Tasks must name a declared config class
        for task in &declarations.tasks {
            catalog.config_class(&task.config)?;
            catalog.tasks.push(task.clone());
        }

        tracing::info!(
            "Catalog built: {} class(es), {} task(s)",
            catalog.classes.len(),
            catalog.tasks.len()
        );

        Ok(catalog)
    }

    pub fn declare_connections(
        &mut self,
        declaration: &ConnectionsDeclaration,
    ) -> anyhow::Result<Arc<ConnectionsSpec>> {
        self.ensure_unused(&declaration.name)?;

        let mut builder = ConnectionsSpec::builder(&declaration.name);
        if let Some(base) = &declaration.extends {
            let base = self
                .lookup(base)?
                .as_connections()
                .ok_or_else(|| {
                    anyhow!(
                        "'{}' extends '{}', which is not a connections class",
                        declaration.name,
                        base
                    )
                })?;
            builder = builder.extends(base);
        }
        for template in &declaration.templates {
            builder = builder.template(&template.name, &template.default);
        }
        for entry in &declaration.connections {
            let mut descriptor = ConnectionDescriptor::new(&entry.name, entry.kind);
            if let Some(doc) = &entry.doc {
                descriptor = descriptor.with_doc(doc);
            }
            builder = builder.connection(&entry.field, descriptor);
        }

        let spec = builder.build();
        self.classes
            .insert(declaration.name.clone(), ClassRef::Connections(Arc::clone(&spec)));
        Ok(spec)
    }

    pub fn declare_config(
        &mut self,
        declaration: &ConfigClassDeclaration,
    ) -> anyhow::Result<Arc<ConfigClass>> {
        self.ensure_unused(&declaration.name)?;

        let mut pending = ConfigDeclaration::new(&declaration.name);
        for base in &declaration.bases {
            let base = self.lookup(base)?.as_config().ok_or_else(|| {
                anyhow!(
                    "'{}' derives from '{}', which is not a config class",
                    declaration.name,
                    base
                )
            })?;
            pending = pending.base(base);
        }
        if let Some(connections) = &declaration.pipeline_connections {
            pending = pending.pipeline_connections(self.lookup(connections)?.clone());
        }
        for entry in &declaration.fields {
            let mut field = Field::new(entry.r#type, &entry.doc);
            if let Some(default) = &entry.default {
                field = field.with_default(default.clone());
            }
            if entry.optional {
                field = field.optional();
            }
            pending = pending.field(&entry.name, field);
        }

        let class = pending
            .declare()
            .with_context(|| format!("declaring config class '{}'", declaration.name))?;
        self.classes
            .insert(declaration.name.clone(), ClassRef::Config(Arc::clone(&class)));
        Ok(class)
    }

    pub fn get(&self, name: &str) -> Option<&ClassRef> {
        self.classes.get(name)
    }

    pub fn config_class(&self, name: &str) -> anyhow::Result<&Arc<ConfigClass>> {
        self.lookup(name)?
            .as_config()
            .ok_or_else(|| anyhow!("'{}' is not a config class", name))
    }

    /// Declared classes, in declaration order.
    pub fn classes(&self) -> impl Iterator<Item = (&str, &ClassRef)> {
        self.classes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Builds the pipeline of declared tasks, each configured with its class defaults.
    pub fn pipeline(&self) -> anyhow::Result<Pipeline> {
        self.tasks
            .iter()
            .map(|task| -> anyhow::Result<TaskDef> {
                let class = self.config_class(&task.config)?;
                Ok(TaskDef::new(&task.task, class.instantiate()).with_label(&task.label))
            })
            .collect()
    }

    fn lookup(&self, name: &str) -> anyhow::Result<&ClassRef> {
        self.classes
            .get(name)
            .ok_or_else(|| anyhow!("Unknown class '{}'", name))
    }

    fn ensure_unused(&self, name: &str) -> anyhow::Result<()> {
        if self.classes.contains_key(name) {
            bail!("Class '{}' is declared more than once", name);
        }
        Ok(())
    }
}
