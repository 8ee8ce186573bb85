use serde::{Deserialize, Serialize};

use combinate_core::Record;

/// How result records relate to the values they were built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloneMode {
    /// Nested arrays and objects are shared between results.
    #[default]
    Shallow,
    /// Every result is deep-cloned before it is returned.
    Deep,
}

/// Options for the generation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Record the base object and candidate lists before expanding.
    pub log: bool,
    /// Shallow or deep-cloned results.
    pub clone_mode: CloneMode,
    /// Warn when the expected result count exceeds this value.
    pub warn_threshold: Option<usize>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            log: false,
            clone_mode: CloneMode::Shallow,
            warn_threshold: Some(10_000),
        }
    }
}

/// Candidate count of one combination field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldReport {
    pub field: String,
    pub candidates: usize,
}

/// Summary of a single expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionReport {
    pub literal_fields: usize,
    pub fields: Vec<FieldReport>,
    pub results: usize,
    pub clone_mode: CloneMode,
    /// Set when deep cloning failed and shallow results were returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clone_fallback: Option<String>,
}

/// Results of an expansion together with its report.
#[derive(Debug, Clone)]
pub struct Expansion {
    pub results: Vec<Record>,
    pub report: ExpansionReport,
}
