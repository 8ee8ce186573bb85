//! Cross-product expansion engine for combinate templates.
//!
//! This crate expands a [`Template`] into every combination of its field
//! candidates, in shallow or deep-cloned form, and loads templates from JSON
//! documents.

pub mod diagnostics;
pub mod engine;
pub mod errors;
pub mod loader;
pub mod model;

pub use combinate_core::{
    Candidate, Combination, CombinationKind, Error, Field, FieldType, Record, Shape, Template,
    MAX_SUBSET_ITEMS, Value, array_combinate, one, optional, some, subsets,
};
pub use diagnostics::{DiagnosticSink, MemorySink, TracingSink};
pub use engine::{GenerationEngine, generate, generate_mutable, nest};
pub use errors::GenerationError;
pub use loader::{template_from_json, template_from_json_with, template_from_str};
pub use model::{CloneMode, Expansion, ExpansionReport, FieldReport, GenerateOptions};
