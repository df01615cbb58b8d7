//! Error types for theme lifecycle operations.

use std::path::PathBuf;

/// Result type used across the library.
pub type Result<T> = std::result::Result<T, ThemeError>;

/// Everything an orchestrator operation can fail with. All variants are
/// returned straight to the caller; nothing is retried or swallowed.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    /// Named environment missing from the store, or the store is unreadable.
    #[error("configuration for environment '{env_name}' not found in {}: {reason}", path.display())]
    ConfigNotFound {
        env_name: String,
        path: PathBuf,
        reason: String,
    },

    /// Only some of the configuration environment variables are set.
    #[error("incomplete environment configuration, missing: {}", missing.join(", "))]
    IncompleteEnvironment { missing: Vec<String> },

    #[error("invalid configuration: {0}")]
    InvalidConfigSchema(String),

    #[error("invalid upload arguments: {0}")]
    InvalidArguments(String),

    /// The operation needs the theme to exist remotely, and it does not.
    #[error("theme '{0}' does not exist")]
    ThemeNotFound(String),

    /// The theme id has not been bound yet; `create()` has to run first.
    #[error("theme '{0}' is not initialized, call create() first")]
    ThemeNotInitialized(String),

    #[error("remote error: {0}")]
    RemoteError(String),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for ThemeError {
    fn from(err: reqwest::Error) -> Self {
        ThemeError::RemoteError(err.to_string())
    }
}
