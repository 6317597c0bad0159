use thiserror::Error;

/// Core error type shared across tagddl crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The model document cannot be read or violates structural expectations.
    #[error("invalid model: {0}")]
    InvalidModel(String),
    /// Catch-all error for unexpected failures.
    #[error("other error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::InvalidModel(value.to_string())
    }
}

/// Convenience alias for results returned by tagddl crates.
pub type Result<T> = std::result::Result<T, Error>;
