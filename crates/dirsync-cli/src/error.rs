//! Errors surfaced by the `dirsync` binary

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Invalid roots, unreadable settings, cancelled comparisons
    #[error(transparent)]
    Core(#[from] dirsync_core::Error),

    #[error("Failed to encode JSON output: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed sync items, logging setup and other run-level problems
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
