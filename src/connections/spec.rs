//! Connections Specification
//!
//! A `ConnectionsSpec` is the blueprint of a task's data channels: the ordered
//! set of connections it reads and writes, and the template parameters used to
//! format their names. Specs are built once with `ConnectionsSpecBuilder`,
//! shared behind `Arc` and read-only afterwards. A spec may extend another,
//! inheriting its connections and templates before adding its own.

use super::descriptor::{ConnectionDescriptor, ConnectionKind};

use indexmap::IndexMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug)]
pub struct ConnectionsSpec {
    id: Uuid,
    name: String,
    base: Option<Arc<ConnectionsSpec>>,
    connections: IndexMap<String, ConnectionDescriptor>,
    default_templates: Option<IndexMap<String, String>>,
}

impl ConnectionsSpec {
    pub fn builder(name: &str) -> ConnectionsSpecBuilder {
        ConnectionsSpecBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> Option<&Arc<ConnectionsSpec>> {
        self.base.as_ref()
    }

    /// Every connection, keyed by the field name that configures it.
    pub fn all_connections(&self) -> &IndexMap<String, ConnectionDescriptor> {
        &self.connections
    }

    /// Template defaults, if this spec declares any templates.
    pub fn default_templates(&self) -> Option<&IndexMap<String, String>> {
        self.default_templates.as_ref()
    }

    /// Field names of the connections of the given kind, in declaration order.
    pub fn connections_of(&self, kind: ConnectionKind) -> Vec<&str> {
        self.connections
            .iter()
            .filter(|(_, descriptor)| descriptor.kind == kind)
            .map(|(field, _)| field.as_str())
            .collect()
    }
}

impl PartialEq for ConnectionsSpec {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConnectionsSpec {}

pub struct ConnectionsSpecBuilder {
    name: String,
    base: Option<Arc<ConnectionsSpec>>,
    connections: IndexMap<String, ConnectionDescriptor>,
    default_templates: Option<IndexMap<String, String>>,
}

impl ConnectionsSpecBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            base: None,
            connections: IndexMap::new(),
            default_templates: None,
        }
    }

    /// Inherits the connections and templates of `base`. Entries added later
    /// with the same field name replace the inherited ones.
    pub fn extends(mut self, base: &Arc<ConnectionsSpec>) -> Self {
        for (field, descriptor) in base.all_connections() {
            self.connections.insert(field.clone(), descriptor.clone());
        }
        if let Some(templates) = base.default_templates() {
            let own = self.default_templates.get_or_insert_with(IndexMap::new);
            for (name, default) in templates {
                own.insert(name.clone(), default.clone());
            }
        }
        self.base = Some(Arc::clone(base));
        self
    }

    pub fn connection(mut self, field: &str, descriptor: ConnectionDescriptor) -> Self {
        self.connections.insert(field.to_string(), descriptor);
        self
    }

    pub fn input(self, field: &str, name: &str) -> Self {
        self.connection(field, ConnectionDescriptor::input(name))
    }

    pub fn prerequisite_input(self, field: &str, name: &str) -> Self {
        self.connection(field, ConnectionDescriptor::prerequisite_input(name))
    }

    pub fn output(self, field: &str, name: &str) -> Self {
        self.connection(field, ConnectionDescriptor::output(name))
    }

    pub fn init_input(self, field: &str, name: &str) -> Self {
        self.connection(field, ConnectionDescriptor::init_input(name))
    }

    pub fn init_output(self, field: &str, name: &str) -> Self {
        self.connection(field, ConnectionDescriptor::init_output(name))
    }

    pub fn template(mut self, name: &str, default: &str) -> Self {
        self.default_templates
            .get_or_insert_with(IndexMap::new)
            .insert(name.to_string(), default.to_string());
        self
    }

    pub fn build(self) -> Arc<ConnectionsSpec> {
        tracing::debug!(
            "Connections class '{}' declared with {} connection(s)",
            self.name,
            self.connections.len()
        );

        Arc::new(ConnectionsSpec {
            id: Uuid::new_v4(),
            name: self.name,
            base: self.base,
            connections: self.connections,
            default_templates: self.default_templates,
        })
    }
}
