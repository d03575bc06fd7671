//! Normalization errors raised while turning raw YAML steps into rule entries.

/// A raw tweak description that cannot be normalized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("entry must define at least one value")]
    EmptyValues,

    #[error("entry mixes value types ('{first}' is {first_type}, '{other}' is {other_type})")]
    MixedValueTypes {
        first: String,
        first_type: super::ValueType,
        other: String,
        other_type: super::ValueType,
    },

    #[error("entry must use either `name`/`value` or `values`, not both")]
    AmbiguousValueShape,

    #[error("`name` and `value` must be given together")]
    IncompleteValue,

    #[error("value '{name}' = {value} does not fit in a 32-bit unsigned integer")]
    ValueOutOfRange { name: String, value: i64 },

    #[error("value '{name}' must be an integer for type dword")]
    TypeMismatch { name: String },

    #[error("value name must not be empty")]
    EmptyValueName,

    #[error("path must contain at least one segment")]
    EmptyPath,

    #[error("path '{0}' contains an empty segment")]
    EmptyPathSegment(String),

    #[error("command must use either `shell` or `argv`, not both")]
    MixedCommandForm,

    #[error("command must define `shell` or a non-empty `argv`")]
    EmptyCommand,
}
