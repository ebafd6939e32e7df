//! Domain layer types and invariants.

pub mod entities;
pub mod filters;
pub mod types;
