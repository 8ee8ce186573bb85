use thiserror::Error;

/// Core error type shared across combinate crates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A template does not fit the declared shape.
    #[error("shape mismatch at '{field}': {message}")]
    ShapeMismatch { field: String, message: String },
    /// A value was asked to deep-clone but has no meaningful copy.
    #[error("cannot deep-clone {kind} value at '{path}'")]
    NotCloneable { path: String, kind: &'static str },
    /// A requested feature is not supported.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl Error {
    pub(crate) fn shape(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Convenience alias for results returned by combinate crates.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_location() {
        for (err, expected) in [
            (
                Error::shape("role", "expected text"),
                "shape mismatch at 'role': expected text",
            ),
            (
                Error::NotCloneable {
                    path: "$.hooks[0]".to_string(),
                    kind: "cycle",
                },
                "cannot deep-clone cycle value at '$.hooks[0]'",
            ),
            (
                Error::Unsupported("callback".to_string()),
                "unsupported: callback",
            ),
        ] {
            assert_eq!(err.to_string(), expected);
        }
    }
}
