//! Configuration Module
//!
//! Generic configuration classes: typed fields, nested configs, class
//! inheritance and per-instance overrides.

pub mod class;
pub mod error;
pub mod field;
pub mod instance;

pub use class::{ClassRef, ConfigClass, Namespace};
pub use class::{CONNECTIONS_CLASS_ATTR, CONNECTIONS_CONFIG_CLASS_ATTR};
pub use error::ConfigError;
pub use field::{ConfigField, Field, FieldSpec, FieldType, FieldValue};
pub use instance::Config;
