//! Runtime error types

use thiserror::Error;

/// Backend failure with classification
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Network, message)
    }

    pub fn disconnected(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Disconnected, message)
    }
}

/// Backend error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Transport failure while delivering the message
    Network,
    /// No live backend session
    Disconnected,
}

/// Errors surfaced through the command surface
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("Message is empty")]
    EmptyMessage,
    #[error("View runtime has stopped")]
    Stopped,
}
