use super::class::ConfigClass;
use super::error::ConfigError;
use super::field::{FieldSpec, FieldValue};

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
enum Slot {
    Scalar(Option<FieldValue>),
    Nested(Config),
}

/// An instance of a `ConfigClass`.
///
/// Every instance owns its values, so overriding a field on one instance never
/// affects the class defaults or any other instance.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    class: Arc<ConfigClass>,
    values: IndexMap<String, Slot>,
}

impl Config {
    pub(crate) fn new(class: Arc<ConfigClass>) -> Self {
        let values = class
            .fields()
            .map(|(name, spec)| {
                let slot = match spec {
                    FieldSpec::Scalar(field) => Slot::Scalar(field.default.clone()),
                    FieldSpec::Nested(field) => Slot::Nested(field.class.instantiate()),
                };
                (name.to_string(), slot)
            })
            .collect();

        Self { class, values }
    }

    pub fn class(&self) -> &Arc<ConfigClass> {
        &self.class
    }

    /// Returns the current value of a scalar field.
    pub fn get(&self, name: &str) -> Result<Option<&FieldValue>, ConfigError> {
        match self.slot(name)? {
            Slot::Scalar(value) => Ok(value.as_ref()),
            Slot::Nested(_) => Err(self.not_scalar(name)),
        }
    }

    /// Returns the current value of a scalar field as a string slice.
    pub fn get_str(&self, name: &str) -> Result<Option<&str>, ConfigError> {
        Ok(self.get(name)?.and_then(FieldValue::as_str))
    }

    /// Overrides a scalar field, checking the value against its declared type.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), ConfigError> {
        let value = value.into();
        let field = self
            .class
            .field(name)
            .ok_or_else(|| self.unknown(name))?
            .as_scalar()
            .ok_or_else(|| self.not_scalar(name))?;

        let found = value.field_type();
        let coerced = field
            .dtype
            .coerce(value)
            .ok_or_else(|| ConfigError::TypeMismatch {
                class: self.class.name().to_string(),
                field: name.to_string(),
                expected: field.dtype,
                found,
            })?;

        tracing::trace!("{}.{} = {}", self.class.name(), name, coerced);
        self.values
            .insert(name.to_string(), Slot::Scalar(Some(coerced)));
        Ok(())
    }

    /// Clears a scalar field so that it holds no value.
    pub fn unset(&mut self, name: &str) -> Result<(), ConfigError> {
        let err = self.not_scalar(name);
        match self.slot_mut(name)? {
            Slot::Scalar(value) => {
                *value = None;
                Ok(())
            }
            Slot::Nested(_) => Err(err),
        }
    }

    pub fn nested(&self, name: &str) -> Result<&Config, ConfigError> {
        match self.slot(name)? {
            Slot::Nested(config) => Ok(config),
            Slot::Scalar(_) => Err(self.not_nested(name)),
        }
    }

    pub fn nested_mut(&mut self, name: &str) -> Result<&mut Config, ConfigError> {
        let err = self.not_nested(name);
        match self.slot_mut(name)? {
            Slot::Nested(config) => Ok(config),
            Slot::Scalar(_) => Err(err),
        }
    }

    /// Reads a scalar through a dot-separated path such as `connections.input`.
    pub fn get_path(&self, path: &str) -> Result<Option<&FieldValue>, ConfigError> {
        let (parents, leaf) = split_path(path)?;
        let mut current = self;
        for part in parents {
            current = current.nested(part)?;
        }
        current.get(leaf)
    }

    /// Overrides a scalar through a dot-separated path such as `connections.input`.
    pub fn set_path(&mut self, path: &str, value: impl Into<FieldValue>) -> Result<(), ConfigError> {
        let (parents, leaf) = split_path(path)?;
        let mut current = self;
        for part in parents {
            current = current.nested_mut(part)?;
        }
        current.set(leaf, value)
    }

    /// Checks that every required scalar, including those of nested configs,
    /// holds a value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, slot) in &self.values {
            match slot {
                Slot::Scalar(None) => {
                    let optional = self
                        .class
                        .field(name)
                        .and_then(FieldSpec::as_scalar)
                        .is_some_and(|field| field.optional);
                    if !optional {
                        return Err(ConfigError::MissingValue {
                            class: self.class.name().to_string(),
                            field: name.clone(),
                        });
                    }
                }
                Slot::Scalar(Some(_)) => {}
                Slot::Nested(config) => config.validate()?,
            }
        }
        Ok(())
    }

    /// Flattens every scalar into `(dotted path, value)` pairs in field order.
    pub fn iter_values(&self) -> Vec<(String, Option<&FieldValue>)> {
        let mut out = Vec::new();
        self.collect_values("", &mut out);
        out
    }

    fn collect_values<'a>(&'a self, prefix: &str, out: &mut Vec<(String, Option<&'a FieldValue>)>) {
        for (name, slot) in &self.values {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}.{name}")
            };
            match slot {
                Slot::Scalar(value) => out.push((path, value.as_ref())),
                Slot::Nested(config) => config.collect_values(&path, out),
            }
        }
    }

    fn slot(&self, name: &str) -> Result<&Slot, ConfigError> {
        self.values.get(name).ok_or_else(|| self.unknown(name))
    }

    fn slot_mut(&mut self, name: &str) -> Result<&mut Slot, ConfigError> {
        let err = self.unknown(name);
        self.values.get_mut(name).ok_or(err)
    }

    fn unknown(&self, name: &str) -> ConfigError {
        ConfigError::UnknownField {
            class: self.class.name().to_string(),
            field: name.to_string(),
        }
    }

    fn not_scalar(&self, name: &str) -> ConfigError {
        ConfigError::NotScalar {
            class: self.class.name().to_string(),
            field: name.to_string(),
        }
    }

    fn not_nested(&self, name: &str) -> ConfigError {
        ConfigError::NotNested {
            class: self.class.name().to_string(),
            field: name.to_string(),
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (path, value) in self.iter_values() {
            match value {
                Some(value) => writeln!(f, "{path} = {value}")?,
                None => writeln!(f, "{path} = None")?,
            }
        }
        Ok(())
    }
}

fn split_path(path: &str) -> Result<(Vec<&str>, &str), ConfigError> {
    let mut parts: Vec<&str> = path.split('.').collect();
    match parts.pop() {
        Some(leaf) if !leaf.is_empty() => Ok((parts, leaf)),
        _ => Err(ConfigError::EmptyPath),
    }
}
