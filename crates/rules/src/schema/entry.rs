//! Normalized store write: root, path, typed values, recursive flag.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{RawScalar, RegValue, SchemaError, ValueType};

/// Top-level namespace of the hierarchical store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StoreRoot {
    #[serde(rename = "HKLM", alias = "machine", alias = "HKEY_LOCAL_MACHINE")]
    LocalMachine,
    #[serde(rename = "HKCU", alias = "user", alias = "HKEY_CURRENT_USER")]
    CurrentUser,
}

impl fmt::Display for StoreRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreRoot::LocalMachine => write!(f, "HKLM"),
            StoreRoot::CurrentUser => write!(f, "HKCU"),
        }
    }
}

/// Ordered path segments under a [`StoreRoot`].
///
/// Parsed from and displayed as a backslash-separated string. Forward
/// slashes are legal inside a segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    pub const SEPARATOR: char = '\\';

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Path of a direct child.
    pub fn child(&self, name: &str) -> KeyPath {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        KeyPath(segments)
    }
}

impl FromStr for KeyPath {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_matches(Self::SEPARATOR);
        if trimmed.is_empty() {
            return Err(SchemaError::EmptyPath);
        }
        let segments: Vec<String> = trimmed.split(Self::SEPARATOR).map(str::to_string).collect();
        if segments.iter().any(|seg| seg.trim().is_empty()) {
            return Err(SchemaError::EmptyPathSegment(s.to_string()));
        }
        Ok(KeyPath(segments))
    }
}

impl TryFrom<Vec<String>> for KeyPath {
    type Error = SchemaError;

    fn try_from(segments: Vec<String>) -> Result<Self, Self::Error> {
        if segments.is_empty() {
            return Err(SchemaError::EmptyPath);
        }
        if segments.iter().any(|seg| seg.trim().is_empty()) {
            return Err(SchemaError::EmptyPathSegment(segments.join("\\")));
        }
        Ok(KeyPath(segments))
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("\\"))
    }
}

impl Serialize for KeyPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KeyPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One canonical tweak: every (name, value) pair is written to `root\path`,
/// or to every existing direct child of it when `recursive` is set.
///
/// Invariants (enforced at construction): `values` is non-empty, every value
/// has the same type, `path` has at least one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRuleEntry", into = "RawRuleEntry")]
pub struct RuleEntry {
    root: StoreRoot,
    path: KeyPath,
    values: IndexMap<String, RegValue>,
    value_type: ValueType,
    recursive: bool,
    description: String,
}

impl RuleEntry {
    pub fn new(
        root: StoreRoot,
        path: KeyPath,
        values: IndexMap<String, RegValue>,
        recursive: bool,
        description: impl Into<String>,
    ) -> Result<Self, SchemaError> {
        if path.is_empty() {
            return Err(SchemaError::EmptyPath);
        }
        let mut iter = values.iter();
        let (first_name, first_value) = iter.next().ok_or(SchemaError::EmptyValues)?;
        let value_type = first_value.value_type();
        for (name, value) in values.iter() {
            if name.is_empty() {
                return Err(SchemaError::EmptyValueName);
            }
            if value.value_type() != value_type {
                return Err(SchemaError::MixedValueTypes {
                    first: first_name.clone(),
                    first_type: value_type,
                    other: name.clone(),
                    other_type: value.value_type(),
                });
            }
        }
        Ok(Self {
            root,
            path,
            values,
            value_type,
            recursive,
            description: description.into(),
        })
    }

    /// Single-value shorthand.
    pub fn single(
        root: StoreRoot,
        path: &str,
        name: &str,
        value: impl Into<RegValue>,
        description: impl Into<String>,
    ) -> Result<Self, SchemaError> {
        let mut values = IndexMap::new();
        values.insert(name.to_string(), value.into());
        Self::new(root, path.parse()?, values, false, description)
    }

    pub fn root(&self) -> StoreRoot {
        self.root
    }

    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    pub fn values(&self) -> &IndexMap<String, RegValue> {
        &self.values
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// `HKLM\Some\Path` style location for logs and reports.
    pub fn location(&self) -> String {
        format!("{}\\{}", self.root, self.path)
    }
}

/// A store write exactly as authored in YAML.
///
/// Accepts the single-value shape (`name` + `value`) or the multi-value
/// shape (`values`), never both.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRuleEntry {
    pub root: StoreRoot,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RawScalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<IndexMap<String, RawScalar>>,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "is_false")]
    pub recursive: bool,
    #[serde(default)]
    pub description: String,
}

fn is_false(v: &bool) -> bool {
    !*v
}

impl TryFrom<RawRuleEntry> for RuleEntry {
    type Error = SchemaError;

    fn try_from(raw: RawRuleEntry) -> Result<Self, Self::Error> {
        let raw_values: IndexMap<String, RawScalar> = match (raw.name, raw.value, raw.values) {
            (None, None, Some(values)) => values,
            (Some(name), Some(value), None) => {
                let mut values = IndexMap::new();
                values.insert(name, value);
                values
            }
            (None, None, None) => return Err(SchemaError::EmptyValues),
            (_, _, Some(_)) => return Err(SchemaError::AmbiguousValueShape),
            _ => return Err(SchemaError::IncompleteValue),
        };

        let mut values = IndexMap::with_capacity(raw_values.len());
        for (name, scalar) in &raw_values {
            values.insert(name.clone(), scalar.coerce(name, raw.value_type)?);
        }

        let entry = RuleEntry::new(raw.root, raw.path.parse()?, values, raw.recursive, raw.description)?;
        Ok(entry)
    }
}

impl From<RuleEntry> for RawRuleEntry {
    fn from(entry: RuleEntry) -> Self {
        RawRuleEntry {
            root: entry.root,
            path: entry.path.to_string(),
            name: None,
            value: None,
            values: Some(
                entry
                    .values
                    .iter()
                    .map(|(k, v)| (k.clone(), RawScalar::from(v)))
                    .collect(),
            ),
            value_type: entry.value_type,
            recursive: entry.recursive,
            description: entry.description,
        }
    }
}
