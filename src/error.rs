//! Error types shared across the utility layer

use thiserror::Error;

/// Errors raised by the utility layer
///
/// Every error is synchronous and raised at the offending call site.
/// Model validation failures are not errors; they accumulate as data in
/// [`crate::model::ValidationErrors`].
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("behavior '{0}' not registered")]
    BehaviorNotRegistered(String),

    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),
}

impl CoreError {
    /// Shorthand for an `InvalidArgument` with a formatted message
    pub fn invalid(msg: impl Into<String>) -> Self {
        CoreError::InvalidArgument(msg.into())
    }
}
