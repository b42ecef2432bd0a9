/// Result alias that carries the custom [`FireworksError`] type.
pub type Result<T> = std::result::Result<T, FireworksError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum FireworksError {
    /// A configuration value failed validation when it was loaded. The
    /// simulation itself never produces this; it only runs on validated input.
    #[error("invalid configuration `{field}`: {reason}")]
    InvalidConfig { field: String, reason: String },
    /// Free-form error surfaced by collaborators such as frame sinks.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration files that are not valid JSON for [`crate::FireworksConfig`].
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl FireworksError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
