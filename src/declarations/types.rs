//! Declaration File Types
//!
//! Structures deserialised from a TOML declarations file. Declarations are
//! kept in file order: a config class may only name connections classes and
//! base classes declared above it.

use crate::config::{FieldType, FieldValue};
use crate::connections::ConnectionKind;

use serde::Deserialize;

/// Root of a declarations file.
///
/// # Example Structure
///
/// ```toml
/// [[connections]]
/// name = "CalibrateConnections"
/// templates = [{ name = "camera", default = "hsc" }]
///
/// [[connections.connection]]
/// field = "input"
/// name = "{camera}_raw"
/// kind = "input"
///
/// [[configs]]
/// name = "CalibrateConfig"
/// bases = ["PipelineTaskConfig"]
/// pipeline_connections = "CalibrateConnections"
///
/// [[tasks]]
/// task = "pkg.Calibrate"
/// config = "CalibrateConfig"
/// label = "calibrate"
/// ```
#[derive(Clone, Debug, Deserialize, Default)]
pub struct Declarations {
    /// Connections classes, in declaration order
    #[serde(default)]
    pub connections: Vec<ConnectionsDeclaration>,

    /// Config classes, in declaration order
    #[serde(default)]
    pub configs: Vec<ConfigClassDeclaration>,

    /// Tasks making up the pipeline
    #[serde(default)]
    pub tasks: Vec<TaskDeclaration>,
}

/// A connections class.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ConnectionsDeclaration {
    pub name: String,

    /// Connections class to inherit connections and templates from
    pub extends: Option<String>,

    #[serde(default)]
    pub templates: Vec<TemplateEntry>,

    #[serde(default, rename = "connection")]
    pub connections: Vec<ConnectionEntry>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TemplateEntry {
    pub name: String,
    pub default: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ConnectionEntry {
    /// Config field that names this connection
    pub field: String,

    /// Default dataset name
    pub name: String,

    pub kind: ConnectionKind,

    pub doc: Option<String>,
}

/// A config class.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ConfigClassDeclaration {
    pub name: String,

    /// Base config classes, `PipelineTaskConfig` included
    #[serde(default)]
    pub bases: Vec<String>,

    /// Connections class for a pipeline task config
    pub pipeline_connections: Option<String>,

    #[serde(default, rename = "field")]
    pub fields: Vec<FieldEntry>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct FieldEntry {
    pub name: String,

    #[serde(rename = "type")]
    pub r#type: FieldType,

    pub default: Option<FieldValue>,

    #[serde(default)]
    pub optional: bool,

    #[serde(default)]
    pub doc: String,
}

/// A task of the pipeline, configured with the defaults of its config class.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TaskDeclaration {
    pub task: String,
    pub config: String,

    #[serde(default)]
    pub label: String,
}
