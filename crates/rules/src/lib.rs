//! Declarative tuning rule catalog.
//!
//! This crate provides:
//! - YAML rule group schema that normalizes every tweak shape into one
//!   [`schema::RuleEntry`] / [`schema::CommandSpec`] form
//! - Filesystem catalog loader with per-file error isolation
//! - Catalog validation with structured errors and warnings
//! - Hardware-conditioned catalog assembly ([`catalog::RuleCatalogBuilder`])

pub mod catalog;
pub mod loader;
pub mod schema;
pub mod validation;
