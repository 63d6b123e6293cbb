//! Contract error types for settings manager
//!
//! These errors are transport-agnostic and used for inter-module communication.

/// Settings manager errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Key contains characters outside `[A-Za-z0-9_.-]` or has an empty segment
    #[error("Key must contain only letters, numbers, \".\", \"-\" and \"_\". Given key: {key}")]
    InvalidKey {
        /// The rejected key, verbatim
        key: String,
    },
    /// Scope combination is not allowed (group without bag)
    #[error("Invalid scope: {message}")]
    InvalidScope {
        /// Why the scope was rejected
        message: String,
    },
    /// Resource not found
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Resource type (setting)
        resource: String,
        /// Resource identifier
        id: String,
    },
    /// Request validation error
    #[error("Validation error: {message}")]
    Validation {
        /// Validation error message
        message: String,
    },
    /// Durable backend failure, propagated as-is
    #[error("Storage failure: {0}")]
    Store(#[from] anyhow::Error),
}

impl SettingsError {
    pub(crate) fn invalid_key(key: &str) -> Self {
        Self::InvalidKey {
            key: key.to_string(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn group_without_bag() -> Self {
        Self::InvalidScope {
            message: "group requires a bag".to_string(),
        }
    }
}
