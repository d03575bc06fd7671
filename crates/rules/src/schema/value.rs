//! Typed store values and the raw scalars they are normalized from.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::SchemaError;

/// Declared type of every value in one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// 32-bit unsigned integer (`REG_DWORD`).
    #[serde(rename = "dword", alias = "integer32", alias = "REG_DWORD")]
    Integer32,
    /// Plain string (`REG_SZ`).
    #[serde(rename = "string", alias = "sz", alias = "REG_SZ")]
    String,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Integer32 => write!(f, "dword"),
            ValueType::String => write!(f, "string"),
        }
    }
}

/// A value ready to be written to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegValue {
    Integer32(u32),
    String(String),
}

impl RegValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            RegValue::Integer32(_) => ValueType::Integer32,
            RegValue::String(_) => ValueType::String,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            RegValue::Integer32(v) => Some(*v),
            RegValue::String(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RegValue::Integer32(_) => None,
            RegValue::String(s) => Some(s),
        }
    }
}

impl fmt::Display for RegValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegValue::Integer32(v) => write!(f, "{v:#x}"),
            RegValue::String(s) => write!(f, "\"{s}\""),
        }
    }
}

impl From<u32> for RegValue {
    fn from(v: u32) -> Self {
        RegValue::Integer32(v)
    }
}

impl From<&str> for RegValue {
    fn from(v: &str) -> Self {
        RegValue::String(v.to_string())
    }
}

impl From<String> for RegValue {
    fn from(v: String) -> Self {
        RegValue::String(v)
    }
}

/// A scalar as written in YAML, before the entry's declared type is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawScalar {
    Integer(i64),
    Text(String),
}

impl RawScalar {
    /// Convert to the declared type.
    ///
    /// Integers are accepted for `string` entries and rendered in decimal;
    /// text is never accepted for `dword` entries.
    pub fn coerce(&self, name: &str, ty: ValueType) -> Result<RegValue, SchemaError> {
        match (self, ty) {
            (RawScalar::Integer(v), ValueType::Integer32) => u32::try_from(*v)
                .map(RegValue::Integer32)
                .map_err(|_| SchemaError::ValueOutOfRange {
                    name: name.to_string(),
                    value: *v,
                }),
            (RawScalar::Text(_), ValueType::Integer32) => Err(SchemaError::TypeMismatch {
                name: name.to_string(),
            }),
            (RawScalar::Integer(v), ValueType::String) => Ok(RegValue::String(v.to_string())),
            (RawScalar::Text(s), ValueType::String) => Ok(RegValue::String(s.clone())),
        }
    }
}

impl From<&RegValue> for RawScalar {
    fn from(v: &RegValue) -> Self {
        match v {
            RegValue::Integer32(n) => RawScalar::Integer(i64::from(*n)),
            RegValue::String(s) => RawScalar::Text(s.clone()),
        }
    }
}
