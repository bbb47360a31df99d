// src/merging/mod.rs

pub mod executor;
pub mod field_resolution;

pub use executor::{EntityStore, MergeExecutor, MergeOutcome, MergeRecord};
pub use field_resolution::{resolve_fields, union_field_names, FieldDecision, FieldResolution};
