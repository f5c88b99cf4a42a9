//! Translation service contract and invocation records

use std::fmt::Debug;

use async_trait::async_trait;
use serde::Serialize;

use super::error::DomainError;

/// Default system instruction template. The language placeholders are
/// substituted by the caller before the template reaches the core.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a professional translator. Translate the \
     following text from {sourceLanguage} to {targetLanguage}. Reply with the translation only.";

/// Substitute the language placeholders in a system instruction template.
pub fn render_instruction(template: &str, source_language: &str, target_language: &str) -> String {
    template
        .replace("{sourceLanguage}", source_language)
        .replace("{targetLanguage}", target_language)
}

/// Invocation strategy attempted during one logical translation call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationStrategy {
    /// Dedicated request/parse path for families with a nonstandard call
    /// convention, tried before identifier resolution
    FamilySpecific,
    /// Single-shot invoke-model call with the family's request schema
    InvokeModel,
    /// Turn-based converse call, structurally different from invoke-model
    Converse,
}

/// One attempted invocation: strategy, identifier, and how it ended.
/// Kept only for the duration of a single call, for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct FallbackAttempt {
    pub strategy: InvocationStrategy,
    pub model_id: String,
    /// `None` when the attempt succeeded
    pub error: Option<String>,
}

impl FallbackAttempt {
    pub fn succeeded(strategy: InvocationStrategy, model_id: impl Into<String>) -> Self {
        Self {
            strategy,
            model_id: model_id.into(),
            error: None,
        }
    }

    pub fn failed(
        strategy: InvocationStrategy,
        model_id: impl Into<String>,
        error: &DomainError,
    ) -> Self {
        Self {
            strategy,
            model_id: model_id.into(),
            error: Some(error.to_string()),
        }
    }
}

/// Result of one translation call together with its attempt trace
#[derive(Debug, Clone)]
pub struct TranslationOutcome {
    pub text: String,
    pub attempts: Vec<FallbackAttempt>,
}

/// Trait for translation backends
#[async_trait]
pub trait TranslationService: Send + Sync + Debug {
    /// Translate `input_text` under `system_prompt` using the given model
    /// identifier. Blocks until the backend answers or every fallback
    /// strategy is exhausted.
    async fn translate(
        &self,
        model_id: &str,
        system_prompt: &str,
        input_text: &str,
    ) -> Result<String, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted translation service: echoes input with a marker, failing on
    /// lines that contain the configured trigger.
    #[derive(Debug, Default)]
    pub struct MockTranslationService {
        fail_on: Option<String>,
        calls: AtomicUsize,
    }

    impl MockTranslationService {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_on(mut self, trigger: impl Into<String>) -> Self {
            self.fail_on = Some(trigger.into());
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TranslationService for MockTranslationService {
        async fn translate(
            &self,
            _model_id: &str,
            _system_prompt: &str,
            input_text: &str,
        ) -> Result<String, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(trigger) = &self.fail_on {
                if input_text.contains(trigger) {
                    return Err(DomainError::provider("mock", "simulated failure"));
                }
            }

            Ok(format!("{input_text} [translated]"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_instruction_substitutes_both_placeholders() {
        let rendered = render_instruction(
            "Translate from {sourceLanguage} to {targetLanguage}",
            "English",
            "Chinese",
        );
        assert_eq!(rendered, "Translate from English to Chinese");
    }

    #[test]
    fn test_render_instruction_leaves_plain_templates_alone() {
        assert_eq!(
            render_instruction("Translate faithfully.", "English", "French"),
            "Translate faithfully."
        );
    }
}
