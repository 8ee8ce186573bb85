//! Core contracts for combinate.
//!
//! This crate defines the dynamic value model, the combination algebra
//! (`one`, `some`, `optional` and custom producers), subset enumeration,
//! templates and shape validation shared by the engine and the CLI.

pub mod combination;
pub mod error;
pub mod shape;
pub mod subsets;
pub mod template;
pub mod value;

pub use combination::{Candidate, Combination, CombinationKind, one, optional, some};
pub use error::{Error, Result};
pub use shape::{FieldType, Shape};
pub use subsets::{MAX_SUBSET_ITEMS, Subsets, array_combinate, subsets};
pub use template::{Field, Template};
pub use value::{Callback, Record, Shared, Value, deep_clone_record, display_record};
