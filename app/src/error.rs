use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Config file not found: {}", .path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("Config file bad format: {}: {reason}", .path.display())]
    ConfigMalformed { path: PathBuf, reason: String },

    #[error("No configuration found for key: {0}")]
    UnknownKey(String),

    #[error("No directories defined for key: {0}")]
    NoDirectories(String),

    #[error("{action} ({name}) not permitted as {reason}.")]
    ActionNotPermitted {
        name: String,
        action: String,
        reason: String,
    },

    // `source` would be taken for the error cause, hence from/to
    #[error("Transfer from {from} to {to} aborted.")]
    UserAborted { from: String, to: String },

    #[error("`{command}` failed: {message}")]
    ExternalToolFailure { command: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Fatal errors end the run; everything else is reported and the run
    /// moves on.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::ExternalToolFailure { .. } | SyncError::Io(_))
    }
}

impl From<SyncError> for utils::error::Error {
    fn from(err: SyncError) -> Self {
        utils::error::Error::with_source(err.to_string(), Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
