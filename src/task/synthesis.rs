//! Connections Config Synthesis
//!
//! Declaring a config class that derives from `PipelineTaskConfig` generates a
//! nested `Connections` config class from the task's connections
//! specification: one `str` field per connection, defaulting to the
//! connection's name, and one `str` field per template parameter. The new
//! class is installed on the declared class as the `connections` field and
//! recorded under the `ConnectionsConfigClass` attribute, next to the
//! `ConnectionsClass` attribute naming the specification.
//!
//! The connections specification is taken from `pipeline_connections` when
//! given, otherwise from the first base that already has a synthesized
//! `connections` field. Every declaration gets its own class, so two tasks
//! built from the same specification never share connection defaults.
//!
//! # Example
//!
//! ```rust
//! use pipetask::connections::ConnectionsSpec;
//! use pipetask::task::{pipeline_task_config, ConfigDeclaration};
//!
//! let spec = ConnectionsSpec::builder("CalibrateConnections")
//!     .input("input", "raw")
//!     .output("output", "calib")
//!     .build();
//!
//! let class = ConfigDeclaration::new("CalibrateConfig")
//!     .base(&pipeline_task_config())
//!     .pipeline_connections(&spec)
//!     .declare()
//!     .unwrap();
//!
//! let config = class.instantiate();
//! assert_eq!(config.get_path("connections.input").unwrap().and_then(|v| v.as_str()), Some("raw"));
//! ```

use super::error::DeclarationError;
use crate::config::{
    ClassRef, ConfigClass, ConfigField, Field, FieldSpec, Namespace, CONNECTIONS_CLASS_ATTR,
    CONNECTIONS_CONFIG_CLASS_ATTR,
};
use crate::connections::ConnectionsSpec;

use std::sync::{Arc, OnceLock};

/// Name of the abstract root of all pipeline task configs.
pub const PIPELINE_TASK_CONFIG: &str = "PipelineTaskConfig";

/// Field under which a pipeline task config holds its connections config.
pub const CONNECTIONS_FIELD: &str = "connections";

/// Name given to every synthesized connections config class.
pub const CONNECTIONS_CONFIG_NAME: &str = "Connections";

const CONNECTIONS_DOC: &str =
    "Configurations describing the connections of the PipelineTask to datatypes";

const TEMPLATE_DOC: &str =
    "Template parameter used to format corresponding field template parameter";

static ROOT: OnceLock<Arc<ConfigClass>> = OnceLock::new();

/// The abstract root class. Declarations deriving from it get a synthesized
/// `connections` field; the root itself has no fields.
pub fn pipeline_task_config() -> Arc<ConfigClass> {
    Arc::clone(ROOT.get_or_init(|| ConfigClass::empty(PIPELINE_TASK_CONFIG)))
}

/// True if `class` derives from `PipelineTaskConfig` (the root included).
pub fn is_pipeline_task_config(class: &ConfigClass) -> bool {
    class.derives_from(&pipeline_task_config())
}

/// A pending config class declaration.
#[derive(Debug)]
pub struct ConfigDeclaration {
    name: String,
    bases: Vec<Arc<ConfigClass>>,
    namespace: Namespace,
    pipeline_connections: Option<ClassRef>,
}

impl ConfigDeclaration {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            bases: Vec::new(),
            namespace: Namespace::new(),
            pipeline_connections: None,
        }
    }

    pub fn base(mut self, base: &Arc<ConfigClass>) -> Self {
        self.bases.push(Arc::clone(base));
        self
    }

    pub fn field(mut self, name: &str, field: impl Into<FieldSpec>) -> Self {
        self.namespace.insert_field(name, field);
        self
    }

    /// Names the connections class this config is built from.
    pub fn pipeline_connections(mut self, class: impl Into<ClassRef>) -> Self {
        self.pipeline_connections = Some(class.into());
        self
    }

    /// Creates the class, synthesizing its connections config when it derives
    /// from `PipelineTaskConfig`.
    pub fn declare(self) -> Result<Arc<ConfigClass>, DeclarationError> {
        let is_task = self
            .bases
            .iter()
            .any(|base| is_pipeline_task_config(base));

        if !is_task {
            if self.pipeline_connections.is_some() {
                return Err(DeclarationError::UnexpectedConnections { class: self.name });
            }
            return Ok(ConfigClass::new(&self.name, self.bases, self.namespace)?);
        }

        let spec = resolve_connections(&self.name, &self.bases, self.pipeline_connections)?;
        let connections_class = synthesize_connections_config(&self.name, &spec)?;

        // A `connections` field that is not a synthesized connections config,
        // declared here or inherited, cannot be replaced
        let mut namespace = self.namespace;
        let inherited_plain = self.bases.iter().any(|base| {
            base.field(CONNECTIONS_FIELD).is_some() && inherited_connections(base).is_none()
        });
        if namespace.contains_field(CONNECTIONS_FIELD) || inherited_plain {
            return Err(DeclarationError::FieldCollision {
                class: self.name,
                field: CONNECTIONS_FIELD.to_string(),
            });
        }
        namespace.insert_field(
            CONNECTIONS_FIELD,
            ConfigField::new(&connections_class, CONNECTIONS_DOC),
        );
        namespace.insert_attribute(CONNECTIONS_CONFIG_CLASS_ATTR, &connections_class);
        namespace.insert_attribute(CONNECTIONS_CLASS_ATTR, &spec);

        let class = ConfigClass::new(&self.name, self.bases, namespace)?;
        tracing::debug!(
            "Config class '{}' declared with connections from '{}'",
            class.name(),
            spec.name()
        );

        Ok(class)
    }
}

/// Finds the connections class for a declaration: the explicit one if given,
/// otherwise the one recorded by the first base carrying a synthesized
/// `connections` field.
pub fn resolve_connections(
    class: &str,
    bases: &[Arc<ConfigClass>],
    explicit: Option<ClassRef>,
) -> Result<Arc<ConnectionsSpec>, DeclarationError> {
    let found = explicit.or_else(|| {
        bases
            .iter()
            .find_map(|base| inherited_connections(base))
            .map(ClassRef::Connections)
    });

    match found {
        None => Err(DeclarationError::MissingConnections {
            class: class.to_string(),
        }),
        Some(ClassRef::Connections(spec)) => Ok(spec),
        Some(other) => Err(DeclarationError::InvalidConnectionsType {
            class: class.to_string(),
            found: other.to_string(),
        }),
    }
}

fn inherited_connections(base: &ConfigClass) -> Option<Arc<ConnectionsSpec>> {
    base.field(CONNECTIONS_FIELD)
        .and_then(FieldSpec::as_nested)
        .and_then(|field| field.class.connections_class())
        .cloned()
}

/// Builds the namespace of a connections config: connection fields first,
/// then template fields, then the `ConnectionsClass` back-reference.
pub fn connections_namespace(
    class: &str,
    spec: &Arc<ConnectionsSpec>,
) -> Result<Namespace, DeclarationError> {
    let mut namespace = Namespace::new();

    for (field_name, descriptor) in spec.all_connections() {
        let doc = format!("name for connection {field_name}");
        namespace.insert_field(field_name, Field::string(&doc, &descriptor.name));
    }

    if let Some(templates) = spec.default_templates() {
        for (template_name, default) in templates {
            if namespace.contains_field(template_name) {
                return Err(DeclarationError::FieldCollision {
                    class: class.to_string(),
                    field: template_name.clone(),
                });
            }
            namespace.insert_field(template_name, Field::string(TEMPLATE_DOC, default));
        }
    }

    namespace.insert_attribute(CONNECTIONS_CLASS_ATTR, spec);
    Ok(namespace)
}

/// Creates a fresh connections config class for the declaration of `class`.
pub fn synthesize_connections_config(
    class: &str,
    spec: &Arc<ConnectionsSpec>,
) -> Result<Arc<ConfigClass>, DeclarationError> {
    let namespace = connections_namespace(class, spec)?;
    Ok(ConfigClass::new(CONNECTIONS_CONFIG_NAME, vec![], namespace)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldType, FieldValue};

    fn calibrate_spec() -> Arc<ConnectionsSpec> {
        ConnectionsSpec::builder("CalibrateConnections")
            .input("input", "raw")
            .output("output", "calib")
            .build()
    }

    fn declare_with(name: &str, spec: &Arc<ConnectionsSpec>) -> Arc<ConfigClass> {
        ConfigDeclaration::new(name)
            .base(&pipeline_task_config())
            .pipeline_connections(spec)
            .declare()
            .unwrap()
    }

    fn scalar_default(class: &ConfigClass, field: &str) -> Option<FieldValue> {
        class
            .field(field)
            .and_then(FieldSpec::as_scalar)
            .and_then(|f| f.default.clone())
    }

    #[test]
    fn test_one_field_per_connection() {
        let class = declare_with("CalibrateConfig", &calibrate_spec());
        let connections = class.connections_config_class().unwrap();

        assert_eq!(connections.field_names(), vec!["input", "output"]);
        assert_eq!(scalar_default(connections, "input"), Some("raw".into()));
        assert_eq!(scalar_default(connections, "output"), Some("calib".into()));

        let input = connections.field("input").and_then(FieldSpec::as_scalar).unwrap();
        assert_eq!(input.dtype, FieldType::String);
        assert_eq!(input.doc, "name for connection input");
    }

    #[test]
    fn test_template_fields_follow_connections() {
        let spec = ConnectionsSpec::builder("CoaddConnections")
            .input("coadd", "{coaddName}Coadd")
            .template("coaddName", "deep")
            .build();
        let class = declare_with("CoaddConfig", &spec);
        let connections = class.connections_config_class().unwrap();

        assert_eq!(connections.field_names(), vec!["coadd", "coaddName"]);
        assert_eq!(scalar_default(connections, "coaddName"), Some("deep".into()));
        assert_eq!(connections.field("coaddName").unwrap().doc(), TEMPLATE_DOC);
    }

    #[test]
    fn test_provenance_attributes_installed() {
        let spec = calibrate_spec();
        let class = declare_with("CalibrateConfig", &spec);

        assert_eq!(class.connections_class(), Some(&spec));
        let nested = class.field(CONNECTIONS_FIELD).and_then(FieldSpec::as_nested).unwrap();
        assert_eq!(nested.doc, CONNECTIONS_DOC);
        assert_eq!(Some(&nested.class), class.connections_config_class());
        assert_eq!(nested.class.connections_class(), Some(&spec));
        assert_eq!(nested.class.name(), CONNECTIONS_CONFIG_NAME);
    }

    #[test]
    fn test_subclass_inherits_connections_class() {
        let spec = calibrate_spec();
        let base = declare_with("CalibrateConfig", &spec);
        let derived = ConfigDeclaration::new("FastCalibrateConfig")
            .base(&base)
            .field("fast", Field::new(FieldType::Bool, "go fast").with_default(true))
            .declare()
            .unwrap();

        assert_eq!(derived.connections_class(), Some(&spec));
        assert_ne!(derived.connections_config_class(), base.connections_config_class());
        assert_eq!(derived.field_names(), vec!["connections", "fast"]);
    }

    #[test]
    fn test_explicit_connections_override_inherited() {
        let base = declare_with("CalibrateConfig", &calibrate_spec());
        let other = ConnectionsSpec::builder("IsrConnections")
            .input("ccdExposure", "raw")
            .output("outputExposure", "postISRCCD")
            .build();
        let derived = ConfigDeclaration::new("IsrConfig")
            .base(&base)
            .pipeline_connections(&other)
            .declare()
            .unwrap();

        assert_eq!(derived.connections_class(), Some(&other));
        assert_eq!(
            derived.connections_config_class().unwrap().field_names(),
            vec!["ccdExposure", "outputExposure"]
        );
    }

    #[test]
    fn test_first_base_with_connections_wins() {
        let first = calibrate_spec();
        let second = ConnectionsSpec::builder("Other").input("x", "y").build();
        let plain = ConfigClass::new("Plain", vec![], Namespace::new()).unwrap();
        let a = declare_with("A", &first);
        let b = declare_with("B", &second);

        let derived = ConfigDeclaration::new("AB")
            .base(&plain)
            .base(&a)
            .base(&b)
            .declare()
            .unwrap();
        assert_eq!(derived.connections_class(), Some(&first));
    }

    #[test]
    fn test_plain_connections_field_is_skipped_when_resolving() {
        let spec = calibrate_spec();
        let plain = ConfigDeclaration::new("Plain")
            .field(CONNECTIONS_FIELD, Field::string("not synthesized", "x"))
            .declare()
            .unwrap();
        let task = declare_with("Task", &spec);

        let found = resolve_connections("Mixed", &[plain, task], None).unwrap();
        assert_eq!(found, spec);
    }

    #[test]
    fn test_inherited_plain_connections_field_is_rejected() {
        let plain = ConfigDeclaration::new("Plain")
            .field(CONNECTIONS_FIELD, Field::string("not synthesized", "x"))
            .declare()
            .unwrap();
        let err = ConfigDeclaration::new("Mixed")
            .base(&plain)
            .base(&pipeline_task_config())
            .pipeline_connections(&calibrate_spec())
            .declare()
            .unwrap_err();
        assert_eq!(
            err,
            DeclarationError::FieldCollision {
                class: "Mixed".to_string(),
                field: CONNECTIONS_FIELD.to_string()
            }
        );
    }

    #[test]
    fn test_missing_connections_is_fatal() {
        let err = ConfigDeclaration::new("NoConnectionsConfig")
            .base(&pipeline_task_config())
            .declare()
            .unwrap_err();
        assert_eq!(
            err,
            DeclarationError::MissingConnections {
                class: "NoConnectionsConfig".to_string()
            }
        );
    }

    #[test]
    fn test_non_connections_argument_is_rejected() {
        let not_connections = ConfigClass::new("SomeConfig", vec![], Namespace::new()).unwrap();
        let err = ConfigDeclaration::new("BadConfig")
            .base(&pipeline_task_config())
            .pipeline_connections(&not_connections)
            .declare()
            .unwrap_err();
        assert!(matches!(
            err,
            DeclarationError::InvalidConnectionsType { class, .. } if class == "BadConfig"
        ));
    }

    #[test]
    fn test_plain_config_is_not_synthesized() {
        let plain = ConfigDeclaration::new("ResourceLike")
            .field("cores", Field::new(FieldType::Int, "cores").with_default(1_i64))
            .declare()
            .unwrap();
        assert!(plain.field(CONNECTIONS_FIELD).is_none());
        assert!(plain.connections_class().is_none());

        let err = ConfigDeclaration::new("Wrong")
            .pipeline_connections(&calibrate_spec())
            .declare()
            .unwrap_err();
        assert!(matches!(err, DeclarationError::UnexpectedConnections { .. }));
    }

    #[test]
    fn test_root_has_no_fields() {
        let root = pipeline_task_config();
        assert_eq!(root.name(), PIPELINE_TASK_CONFIG);
        assert!(root.field_names().is_empty());
        assert!(root.connections_class().is_none());
        assert_eq!(root, pipeline_task_config());
    }

    #[test]
    fn test_siblings_get_distinct_connections_classes() {
        let spec = calibrate_spec();
        let first = declare_with("FirstConfig", &spec);
        let second = declare_with("SecondConfig", &spec);

        assert_ne!(first.connections_config_class(), second.connections_config_class());
        assert_eq!(first.connections_class(), second.connections_class());

        let mut a = first.instantiate();
        a.set_path("connections.input", "flat").unwrap();
        let b = second.instantiate();
        assert_eq!(b.get_path("connections.input").unwrap(), Some(&"raw".into()));
        assert_eq!(scalar_default(first.connections_config_class().unwrap(), "input"), Some("raw".into()));
    }

    #[test]
    fn test_override_does_not_leak_between_instances() {
        let class = declare_with("CalibrateConfig", &calibrate_spec());
        let mut first = class.instantiate();
        let second = class.instantiate();

        first.set_path("connections.input", "flat").unwrap();

        assert_eq!(first.get_path("connections.input").unwrap(), Some(&"flat".into()));
        assert_eq!(second.get_path("connections.input").unwrap(), Some(&"raw".into()));
        assert_eq!(class.instantiate().get_path("connections.output").unwrap(), Some(&"calib".into()));
        assert_eq!(
            scalar_default(class.connections_config_class().unwrap(), "input"),
            Some("raw".into())
        );
    }

    #[test]
    fn test_template_colliding_with_connection_is_rejected() {
        let spec = ConnectionsSpec::builder("Clash")
            .input("band", "raw")
            .template("band", "r")
            .build();
        let err = ConfigDeclaration::new("ClashConfig")
            .base(&pipeline_task_config())
            .pipeline_connections(&spec)
            .declare()
            .unwrap_err();
        assert_eq!(
            err,
            DeclarationError::FieldCollision {
                class: "ClashConfig".to_string(),
                field: "band".to_string()
            }
        );
    }

    #[test]
    fn test_declared_connections_field_is_rejected() {
        let err = ConfigDeclaration::new("Shadow")
            .base(&pipeline_task_config())
            .pipeline_connections(&calibrate_spec())
            .field(CONNECTIONS_FIELD, Field::string("shadow", "x"))
            .declare()
            .unwrap_err();
        assert!(matches!(err, DeclarationError::FieldCollision { field, .. } if field == CONNECTIONS_FIELD));
    }

    #[test]
    fn test_bad_default_surfaces_as_config_error() {
        let err = ConfigDeclaration::new("BadDefault")
            .base(&pipeline_task_config())
            .pipeline_connections(&calibrate_spec())
            .field("addend", Field::new(FieldType::Float, "amount to add").with_default("x"))
            .declare()
            .unwrap_err();
        assert!(matches!(err, DeclarationError::Config(_)));
    }

    #[test]
    fn test_concurrent_declarations_are_independent() {
        let spec = calibrate_spec();
        let spec = &spec;
        let classes: Vec<Arc<ConfigClass>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|i| scope.spawn(move || declare_with(&format!("Config{i}"), spec)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for (i, a) in classes.iter().enumerate() {
            for b in &classes[i + 1..] {
                assert_ne!(a.connections_config_class(), b.connections_config_class());
            }
        }
    }
}
