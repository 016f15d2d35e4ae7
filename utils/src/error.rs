use std::sync::PoisonError;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Application level error: a human readable message with an optional cause.
#[derive(Debug, Error)]
#[error("{msg}")]
pub struct Error {
    msg: String,
    #[source]
    source: Option<BoxedSource>,
}

impl Error {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            source: None,
        }
    }

    pub fn with_source(msg: impl Into<String>, source: BoxedSource) -> Self {
        Self {
            msg: msg.into(),
            source: Some(source),
        }
    }

    pub fn message(&self) -> &str {
        &self.msg
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(format!("I/O error: {}", err), Box::new(err))
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(format!("Configuration error: {}", err), Box::new(err))
    }
}

impl From<log::SetLoggerError> for Error {
    fn from(err: log::SetLoggerError) -> Self {
        Self::with_source("Failed to install logger", Box::new(err))
    }
}

// The guard is not Send, so only the message survives.
impl<T> From<PoisonError<T>> for Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::new(format!("Configuration lock poisoned: {}", err))
    }
}
