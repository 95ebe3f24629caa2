//! Unified error handling system
//!
//! Every failure in the IAM services is one of these variants. The HTTP layer
//! flattens them into a single client-facing message.

use thiserror::Error;
use tracing::{debug, error, warn};

pub type IamResult<T> = Result<T, IamError>;

/// Which self-directed action was attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfAction {
    Delete,
    Grant,
    Revoke,
}

impl std::fmt::Display for SelfAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelfAction::Delete => {
                write!(f, "You cannot delete the user you are authenticated as")
            }
            SelfAction::Grant => write!(f, "You cannot grant permissions to yourself"),
            SelfAction::Revoke => write!(f, "You cannot revoke your own permissions"),
        }
    }
}

/// Main error type for the IAM system
#[derive(Error, Debug)]
pub enum IamError {
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("The {resource} does not exist")]
    NotFound { resource: &'static str },

    #[error("{message}")]
    Conflict { message: String },

    #[error("The access token is not valid")]
    InvalidToken,

    #[error("You do not have sufficient permissions to perform this action")]
    Forbidden { permission: String },

    #[error("{0}")]
    SelfAction(SelfAction),

    #[error("The username or password is incorrect")]
    InvalidCredentials,

    #[error("The permission cannot be edited")]
    NotEditable,

    #[error("The permission cannot be deleted")]
    NotDeletable,

    #[error("Persistence error: {message}")]
    Persistence {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl IamError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        IamError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        IamError::Conflict {
            message: message.into(),
        }
    }

    pub fn persistence<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        IamError::Persistence {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        IamError::Internal {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, IamError::NotFound { .. })
    }

    /// Missing token, missing permission or a self-directed action
    pub fn is_forbidden(&self) -> bool {
        matches!(
            self,
            IamError::InvalidToken | IamError::Forbidden { .. } | IamError::SelfAction(_)
        )
    }

    /// Whether the error is caused by caller input rather than the system
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            IamError::Persistence { .. } | IamError::Config { .. } | IamError::Internal { .. }
        )
    }

    /// Message that is safe to hand to a client.
    ///
    /// Internal failures collapse to a generic message so that query text and
    /// driver errors never leave the process.
    pub fn public_message(&self) -> String {
        if self.is_client_error() {
            self.to_string()
        } else {
            "The request could not be completed".to_string()
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            IamError::Persistence { .. } | IamError::Config { .. } | IamError::Internal { .. } => {
                error!(error = %self, source = ?std::error::Error::source(self), "Internal error occurred");
            }
            IamError::InvalidToken | IamError::Forbidden { .. } | IamError::SelfAction(_) => {
                warn!(error = %self, "Request denied");
            }
            _ => {
                debug!(error = %self, "Request rejected");
            }
        }
    }
}

/// Build a `Persistence` error from a driver error with a fixed operation label
#[macro_export]
macro_rules! persistence_error {
    ($operation:expr) => {
        |e| $crate::IamError::persistence(format!("Failed to {}", $operation), e)
    };
}
