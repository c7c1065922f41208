/// Convenience result type used across apphot.
pub type ApphotResult<T> = Result<T, ApphotError>;

/// Top-level error taxonomy used by crate APIs.
#[derive(thiserror::Error, Debug)]
pub enum ApphotError {
    /// Invalid user-provided parameters (e.g. a zero subpixel count).
    #[error("validation error: {0}")]
    Validation(String),

    /// An element type code that does not map to a known converter.
    #[error("unsupported element type: {0}")]
    UnsupportedType(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApphotError {
    /// Build an [`ApphotError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`ApphotError::UnsupportedType`] value.
    pub fn unsupported_type(msg: impl Into<String>) -> Self {
        Self::UnsupportedType(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
