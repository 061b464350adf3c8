use super::class::ConfigClass;

use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Scalar type carried by a `Field`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Int,
    Float,
    Bool,
}

impl FieldType {
    /// Coerces `value` into this type, widening ints for float fields.
    /// Returns `None` when the value cannot be stored in a field of this type.
    pub fn coerce(self, value: FieldValue) -> Option<FieldValue> {
        match (self, value) {
            (FieldType::String, v @ FieldValue::String(_)) => Some(v),
            (FieldType::Int, v @ FieldValue::Int(_)) => Some(v),
            (FieldType::Float, v @ FieldValue::Float(_)) => Some(v),
            (FieldType::Float, FieldValue::Int(i)) => Some(FieldValue::Float(i as f64)),
            (FieldType::Bool, v @ FieldValue::Bool(_)) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::String => "str",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// A scalar value held by a config field.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl FieldValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::String(_) => FieldType::String,
            FieldValue::Int(_) => FieldType::Int,
            FieldValue::Float(_) => FieldType::Float,
            FieldValue::Bool(_) => FieldType::Bool,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::String(s) => serde_json::json!(s),
            FieldValue::Int(i) => serde_json::json!(i),
            FieldValue::Float(x) => serde_json::json!(x),
            FieldValue::Bool(b) => serde_json::json!(b),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{s:?}"),
            FieldValue::Int(i) => write!(f, "{i}"),
            FieldValue::Float(x) => write!(f, "{x}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// A typed scalar field declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub dtype: FieldType,
    pub default: Option<FieldValue>,
    pub optional: bool,
    pub doc: String,
}

impl Field {
    pub fn new(dtype: FieldType, doc: &str) -> Self {
        Self {
            dtype,
            default: None,
            optional: false,
            doc: doc.to_string(),
        }
    }

    /// Shorthand for a `str` field with a default.
    pub fn string(doc: &str, default: &str) -> Self {
        Self::new(FieldType::String, doc).with_default(default)
    }

    pub fn with_default(mut self, default: impl Into<FieldValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// A field holding a nested config of a fixed class.
#[derive(Clone, Debug)]
pub struct ConfigField {
    pub class: Arc<ConfigClass>,
    pub doc: String,
}

impl ConfigField {
    pub fn new(class: &Arc<ConfigClass>, doc: &str) -> Self {
        Self {
            class: Arc::clone(class),
            doc: doc.to_string(),
        }
    }
}

/// Any field a config class can declare.
#[derive(Clone, Debug)]
pub enum FieldSpec {
    Scalar(Field),
    Nested(ConfigField),
}

impl FieldSpec {
    pub fn doc(&self) -> &str {
        match self {
            FieldSpec::Scalar(field) => &field.doc,
            FieldSpec::Nested(field) => &field.doc,
        }
    }

    pub fn as_scalar(&self) -> Option<&Field> {
        match self {
            FieldSpec::Scalar(field) => Some(field),
            FieldSpec::Nested(_) => None,
        }
    }

    pub fn as_nested(&self) -> Option<&ConfigField> {
        match self {
            FieldSpec::Nested(field) => Some(field),
            FieldSpec::Scalar(_) => None,
        }
    }
}

impl From<Field> for FieldSpec {
    fn from(field: Field) -> Self {
        FieldSpec::Scalar(field)
    }
}

impl From<ConfigField> for FieldSpec {
    fn from(field: ConfigField) -> Self {
        FieldSpec::Nested(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_field_widens_int() {
        assert_eq!(
            FieldType::Float.coerce(FieldValue::Int(3)),
            Some(FieldValue::Float(3.0))
        );
        assert_eq!(FieldType::Int.coerce(FieldValue::Float(3.0)), None);
    }

    #[test]
    fn test_string_field_rejects_bool() {
        assert_eq!(FieldType::String.coerce(FieldValue::Bool(true)), None);
        assert_eq!(
            FieldType::String.coerce("raw".into()),
            Some(FieldValue::String("raw".to_string()))
        );
    }

    #[test]
    fn test_field_value_deserialises_untagged() {
        #[derive(Deserialize)]
        struct Holder {
            a: FieldValue,
            b: FieldValue,
            c: FieldValue,
        }

        let holder: Holder = toml::from_str("a = 1\nb = 2.5\nc = \"x\"").unwrap();
        assert_eq!(holder.a, FieldValue::Int(1));
        assert_eq!(holder.b, FieldValue::Float(2.5));
        assert_eq!(holder.c, FieldValue::String("x".to_string()));
    }
}
