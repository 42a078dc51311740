use thiserror::Error;

/// Errors surfaced to the player.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoachError {
    /// Fatal at startup, nothing renders after it.
    #[error("{0}")]
    Config(String),

    /// The triggering action is skipped and a warning is shown.
    #[error("{0}")]
    InvalidInput(String),

    /// Anything that went wrong talking to the language-model provider.
    #[error("{message}")]
    ProviderFailure { message: String },
}

impl CoachError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CoachError::InvalidInput(message.into())
    }

    /// Build a provider failure, never with an empty message.
    pub fn provider_failure(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "unknown provider error".to_string()
        } else {
            message
        };
        CoachError::ProviderFailure { message }
    }
}

pub type CoachResult<T> = std::result::Result<T, CoachError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_failure_message_never_empty() {
        let err = CoachError::provider_failure("   ");
        assert_eq!(err.to_string(), "unknown provider error");

        let err = CoachError::provider_failure("401 Unauthorized");
        assert_eq!(err.to_string(), "401 Unauthorized");
    }
}
