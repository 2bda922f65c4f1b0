//! Error types for policy distribution operations

use thiserror::Error;

use crate::state_machine::TransitionError;

/// Errors that can occur while loading configuration or running plugins
#[derive(Debug, Error)]
pub enum DistributionError {
    /// Configuration file could not be read, parsed or validated
    #[error("{0}")]
    Parameters(String),

    /// Plugin configuration envelope could not be resolved
    #[error("{0}")]
    ConfigurationClass(String),

    /// No plugin of the given role is registered under the class name
    #[error("{role} class not found in classpath: \"{class_name}\"")]
    PluginNotFound {
        /// Plugin role, e.g. "policy decoder"
        role: &'static str,
        /// Class name as it appears in the configuration
        class_name: String,
    },

    /// Plugin could not be configured or started
    #[error("plugin initialization failed: {0}")]
    PluginInitialization(String),

    /// Policy decoding error
    #[error("{0}")]
    Decoding(String),

    /// Policy forwarding error
    #[error("{0}")]
    Forwarding(String),

    /// Distribution controller lifecycle error
    #[error("{0}")]
    Controller(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),
}

/// Result type for policy distribution operations
pub type DistributionResult<T> = Result<T, DistributionError>;

impl From<std::io::Error> for DistributionError {
    fn from(err: std::io::Error) -> Self {
        DistributionError::Io(err.to_string())
    }
}

impl From<TransitionError> for DistributionError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::BusinessRuleViolation(message) => DistributionError::Controller(message),
            other => DistributionError::Controller(other.to_string()),
        }
    }
}
