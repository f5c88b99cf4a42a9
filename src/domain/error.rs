use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error(
        "Model '{model_id}' can only be invoked through an inference profile, \
         and no matching profile is configured"
    )]
    UnresolvableModel { model_id: String },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Unexpected response from '{model_id}': {payload}")]
    ResponseParse { model_id: String, payload: String },

    #[error(
        "Translation failed for '{model_id}': all invocation strategies exhausted. \
         First error: {source_message}"
    )]
    TranslationExhausted {
        model_id: String,
        source_message: String,
    },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn unresolvable_model(model_id: impl Into<String>) -> Self {
        Self::UnresolvableModel {
            model_id: model_id.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn response_parse(model_id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self::ResponseParse {
            model_id: model_id.into(),
            payload: payload.into(),
        }
    }

    pub fn exhausted(model_id: impl Into<String>, source_message: impl Into<String>) -> Self {
        Self::TranslationExhausted {
            model_id: model_id.into(),
            source_message: source_message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error may be retried through the next fallback strategy.
    /// Unresolvable identifiers and validation failures are terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Provider { .. } | Self::ResponseParse { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolvable_model_names_identifier() {
        let error = DomainError::unresolvable_model("amazon.nova-pro-v1:0");
        assert!(error.to_string().contains("amazon.nova-pro-v1:0"));
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_parse_failure_preserves_payload() {
        let error = DomainError::response_parse("meta.llama3-3-70b-instruct-v1:0", "{\"oops\":1}");
        assert!(error.to_string().contains("{\"oops\":1}"));
        assert!(error.is_retryable());
    }

    #[test]
    fn test_provider_error_is_retryable() {
        let error = DomainError::provider("bedrock", "throttled");
        assert!(error.is_retryable());
        assert_eq!(error.to_string(), "Provider error: bedrock - throttled");
    }

    #[test]
    fn test_exhausted_carries_first_cause() {
        let error = DomainError::exhausted("deepseek.r1-v1:0", "access denied");
        assert!(error.to_string().contains("access denied"));
    }
}
