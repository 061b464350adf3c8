//! Config Class Module
//!
//! A `ConfigClass` is the runtime stand-in for a declared configuration type:
//! an ordered set of fields plus non-field class attributes. Classes are built
//! once from their bases and a `Namespace`, then shared behind `Arc` and never
//! mutated. Instances are created with `ConfigClass::instantiate`.

use super::error::ConfigError;
use super::field::{ConfigField, Field, FieldSpec};
use super::instance::Config;
use crate::connections::ConnectionsSpec;

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Attribute under which a class records the connections specification it
/// was derived from.
pub const CONNECTIONS_CLASS_ATTR: &str = "ConnectionsClass";

/// Attribute under which a pipeline task config exposes its synthesized
/// connections config class.
pub const CONNECTIONS_CONFIG_CLASS_ATTR: &str = "ConnectionsConfigClass";

/// A reference to a declared class of either kind.
#[derive(Clone, Debug)]
pub enum ClassRef {
    Config(Arc<ConfigClass>),
    Connections(Arc<ConnectionsSpec>),
}

impl ClassRef {
    pub fn name(&self) -> &str {
        match self {
            ClassRef::Config(class) => class.name(),
            ClassRef::Connections(spec) => spec.name(),
        }
    }

    pub fn as_config(&self) -> Option<&Arc<ConfigClass>> {
        match self {
            ClassRef::Config(class) => Some(class),
            ClassRef::Connections(_) => None,
        }
    }

    pub fn as_connections(&self) -> Option<&Arc<ConnectionsSpec>> {
        match self {
            ClassRef::Connections(spec) => Some(spec),
            ClassRef::Config(_) => None,
        }
    }
}

impl From<Arc<ConfigClass>> for ClassRef {
    fn from(class: Arc<ConfigClass>) -> Self {
        ClassRef::Config(class)
    }
}

impl From<&Arc<ConfigClass>> for ClassRef {
    fn from(class: &Arc<ConfigClass>) -> Self {
        ClassRef::Config(Arc::clone(class))
    }
}

impl From<Arc<ConnectionsSpec>> for ClassRef {
    fn from(spec: Arc<ConnectionsSpec>) -> Self {
        ClassRef::Connections(spec)
    }
}

impl From<&Arc<ConnectionsSpec>> for ClassRef {
    fn from(spec: &Arc<ConnectionsSpec>) -> Self {
        ClassRef::Connections(Arc::clone(spec))
    }
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ClassRef::Config(a), ClassRef::Config(b)) => a == b,
            (ClassRef::Connections(a), ClassRef::Connections(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassRef::Config(class) => write!(f, "config class '{}'", class.name()),
            ClassRef::Connections(spec) => write!(f, "connections class '{}'", spec.name()),
        }
    }
}

/// The attributes being defined for a new class, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct Namespace {
    fields: IndexMap<String, FieldSpec>,
    attributes: IndexMap<String, ClassRef>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field, replacing any earlier entry with the same name.
    pub fn insert_field(&mut self, name: &str, field: impl Into<FieldSpec>) {
        self.fields.insert(name.to_string(), field.into());
    }

    pub fn insert_attribute(&mut self, name: &str, value: impl Into<ClassRef>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }
}

/// A configuration class.
#[derive(Debug)]
pub struct ConfigClass {
    id: Uuid,
    name: String,
    bases: Vec<Arc<ConfigClass>>,
    fields: IndexMap<String, FieldSpec>,
    attributes: IndexMap<String, ClassRef>,
}

impl ConfigClass {
    /// Builds a new class from its bases and declared namespace.
    ///
    /// Fields and attributes are inherited from the bases (earlier bases take
    /// precedence) and then overridden by the namespace. Scalar defaults are
    /// checked against their field type.
    pub fn new(
        name: &str,
        bases: Vec<Arc<ConfigClass>>,
        namespace: Namespace,
    ) -> Result<Arc<Self>, ConfigError> {
        let mut fields: IndexMap<String, FieldSpec> = IndexMap::new();
        let mut attributes: IndexMap<String, ClassRef> = IndexMap::new();

        for base in &bases {
            for (field_name, spec) in &base.fields {
                fields
                    .entry(field_name.clone())
                    .or_insert_with(|| spec.clone());
            }
            for (attr_name, value) in &base.attributes {
                attributes
                    .entry(attr_name.clone())
                    .or_insert_with(|| value.clone());
            }
        }

        for (field_name, mut spec) in namespace.fields {
            if let FieldSpec::Scalar(field) = &mut spec {
                check_default(name, &field_name, field)?;
            }
            fields.insert(field_name, spec);
        }
        attributes.extend(namespace.attributes);

        Ok(Arc::new(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            bases,
            fields,
            attributes,
        }))
    }

    /// A class with no bases, fields or attributes.
    pub fn empty(name: &str) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            bases: Vec::new(),
            fields: IndexMap::new(),
            attributes: IndexMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if `other` is this class or one of its (transitive) bases.
    pub fn derives_from(&self, other: &ConfigClass) -> bool {
        self.id == other.id || self.bases.iter().any(|base| base.derives_from(other))
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(|k| k.as_str()).collect()
    }

    pub fn attribute(&self, name: &str) -> Option<&ClassRef> {
        self.attributes.get(name)
    }

    /// The connections specification recorded on this class, if any.
    pub fn connections_class(&self) -> Option<&Arc<ConnectionsSpec>> {
        self.attribute(CONNECTIONS_CLASS_ATTR)
            .and_then(ClassRef::as_connections)
    }

    /// The synthesized connections config class, if this is a pipeline task config.
    pub fn connections_config_class(&self) -> Option<&Arc<ConfigClass>> {
        self.attribute(CONNECTIONS_CONFIG_CLASS_ATTR)
            .and_then(ClassRef::as_config)
    }

    /// Creates an instance holding every field's default.
    pub fn instantiate(self: &Arc<Self>) -> Config {
        Config::new(Arc::clone(self))
    }

    /// Describes the schema of this class as JSON, recursing into nested fields.
    pub fn describe(&self) -> serde_json::Value {
        let mut fields = serde_json::Map::new();
        for (field_name, spec) in &self.fields {
            let entry = match spec {
                FieldSpec::Scalar(field) => serde_json::json!({
                    "type": field.dtype.to_string(),
                    "default": field.default.as_ref().map(|v| v.to_json()),
                    "optional": field.optional,
                    "doc": field.doc,
                }),
                FieldSpec::Nested(ConfigField { class, doc }) => serde_json::json!({
                    "type": "config",
                    "doc": doc,
                    "schema": class.describe(),
                }),
            };
            fields.insert(field_name.clone(), entry);
        }

        let attributes: serde_json::Map<String, serde_json::Value> = self
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::json!(v.name())))
            .collect();

        serde_json::json!({
            "name": self.name,
            "bases": self.bases.iter().map(|b| b.name()).collect::<Vec<_>>(),
            "fields": fields,
            "attributes": attributes,
        })
    }
}

impl PartialEq for ConfigClass {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConfigClass {}

fn check_default(class: &str, field_name: &str, field: &mut Field) -> Result<(), ConfigError> {
    if let Some(default) = field.default.take() {
        let found = default.field_type();
        match field.dtype.coerce(default) {
            Some(value) => field.default = Some(value),
            None => {
                return Err(ConfigError::TypeMismatch {
                    class: class.to_string(),
                    field: field_name.to_string(),
                    expected: field.dtype,
                    found,
                });
            }
        }
    }
    Ok(())
}
