//! YAML catalog schema types with serde deserialization.
//!
//! Defines the type hierarchy for rule group documents:
//! - `RuleGroup`: one optimization stage batch with an optional hardware predicate
//! - `TweakStep`: either a store write (`RuleEntry`) or an external command (`CommandSpec`)
//! - `RuleEntry`: the normalized store write, built from the raw YAML shapes
//!   (`name`/`value` or `values`) through `TryFrom`

mod command;
mod entry;
mod error;
mod group;
mod metadata;
mod predicate;
mod stage;
mod value;

pub use command::*;
pub use entry::*;
pub use error::*;
pub use group::*;
pub use metadata::*;
pub use predicate::*;
pub use stage::*;
pub use value::*;
