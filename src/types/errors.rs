//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context.
//!
//! Logical errors reported by a process's own handler are NOT represented
//! here: the dispatch succeeded at the transport level, so they surface as a
//! [`crate::interpret::Disposition`] instead.

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the deployment toolkit.
#[derive(Error, Debug)]
pub enum Error {
    /// Required setting absent or inconsistent. Raised before any network
    /// call; always fatal.
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed structured input (e.g. TAGS not a JSON array of
    /// `{name,value}` pairs). Raised before dispatch; fatal.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid deployment state transition.
    #[error("state transition error: {0}")]
    State(String),

    /// Signing or protocol-level failure during spawn or dispatch.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success response from a messenger or compute unit.
    #[error("gateway error: {0}")]
    Gateway(String),

    /// Network-level HTTP failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// Convenience constructors
impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn gateway(msg: impl Into<String>) -> Self {
        Self::Gateway(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_context() {
        let err = Error::config("PROCESS_NAME is not set");
        assert_eq!(
            err.to_string(),
            "configuration error: PROCESS_NAME is not set"
        );

        let err = Error::validation("TAGS must be a JSON array");
        assert_eq!(err.to_string(), "validation error: TAGS must be a JSON array");
    }
}
