use thiserror::Error;

/// Errors emitted while loading templates for the generation engine.
///
/// Expansion itself never fails; only template input can be rejected.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid template: {0}")]
    InvalidTemplate(String),
    #[error("core error: {0}")]
    Core(#[from] combinate_core::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
