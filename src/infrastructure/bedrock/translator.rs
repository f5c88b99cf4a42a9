//! Cascading translation orchestrator
//!
//! One logical translation call fans out over a fixed ladder of invocation
//! strategies until one produces text:
//!
//! 1. a dedicated pre-resolution pass for families with a nonstandard call
//!    convention (DeepSeek, Mistral), run against the identifier as requested
//! 2. identifier resolution through the registry, terminal on failure
//! 3. `invoke_model` on the resolved identifier with the family's schema
//! 4. `converse` on the resolved identifier
//! 5. one retry against the base model id extracted from a profile ARN
//! 6. alternate inference profiles of the same family, in table order
//!
//! Every attempt is recorded; when the ladder is exhausted the caller gets
//! the FIRST error, which is the one tied to the model actually asked for.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    DomainError, FallbackAttempt, InvocationStrategy, ModelRegistry, TranslationOutcome,
    TranslationService,
};

use super::client::{BedrockRuntime, ConverseParams};
use super::family::{family_keyword, Family, MAX_TOKENS, TEMPERATURE};

/// Orchestrates translation calls over a Bedrock runtime
#[derive(Debug)]
pub struct Translator<C: BedrockRuntime> {
    client: C,
    registry: Arc<ModelRegistry>,
}

/// Bookkeeping for one cascade run
#[derive(Debug, Default)]
struct CascadeTrace {
    attempts: Vec<FallbackAttempt>,
    first_error: Option<String>,
    invoked: HashSet<String>,
}

impl CascadeTrace {
    fn success(&mut self, strategy: InvocationStrategy, model_id: &str) {
        self.attempts
            .push(FallbackAttempt::succeeded(strategy, model_id));
    }

    fn failure(&mut self, strategy: InvocationStrategy, model_id: &str, error: &DomainError) {
        if self.first_error.is_none() {
            self.first_error = Some(error.to_string());
        }
        self.attempts
            .push(FallbackAttempt::failed(strategy, model_id, error));
    }
}

/// Base model id embedded in a profile ARN, with the regional routing prefix
/// stripped
fn base_model_id(id: &str) -> Option<String> {
    if !ModelRegistry::is_inference_profile(id) {
        return None;
    }

    let suffix = id.rsplit('/').next()?;
    let base = suffix
        .strip_prefix("us.")
        .or_else(|| suffix.strip_prefix("eu."))
        .or_else(|| suffix.strip_prefix("apac."))
        .unwrap_or(suffix);

    Some(base.to_string())
}

impl<C: BedrockRuntime> Translator<C> {
    pub fn new(client: C, registry: Arc<ModelRegistry>) -> Self {
        Self { client, registry }
    }

    /// Run the full cascade and return the text together with the attempt
    /// trace.
    pub async fn translate_with_trace(
        &self,
        model_id: &str,
        system_prompt: &str,
        input_text: &str,
    ) -> Result<TranslationOutcome, DomainError> {
        let mut trace = CascadeTrace::default();
        let family = Family::sniff(model_id);

        // Nonstandard families run before resolution, against the identifier
        // as requested; Mistral answers on its base id more reliably than on
        // the profile ARN, so the base id goes first.
        if family.has_dedicated_path() {
            for candidate in self.dedicated_candidates(model_id, family) {
                if let Some(text) = self
                    .attempt_invoke(
                        InvocationStrategy::FamilySpecific,
                        &candidate,
                        system_prompt,
                        input_text,
                        &mut trace,
                    )
                    .await?
                {
                    return Ok(TranslationOutcome {
                        text,
                        attempts: trace.attempts,
                    });
                }
            }
        }

        // Resolution failures are terminal: no network call can fix an
        // identifier Bedrock will reject by construction.
        let resolved = self.registry.resolve(model_id)?;

        if !trace.invoked.contains(&resolved) {
            if let Some(text) = self
                .attempt_invoke(
                    InvocationStrategy::InvokeModel,
                    &resolved,
                    system_prompt,
                    input_text,
                    &mut trace,
                )
                .await?
            {
                return Ok(TranslationOutcome {
                    text,
                    attempts: trace.attempts,
                });
            }
        }

        if let Some(text) = self
            .attempt_converse(&resolved, system_prompt, input_text, &mut trace)
            .await?
        {
            return Ok(TranslationOutcome {
                text,
                attempts: trace.attempts,
            });
        }

        // Some profiles reject a call the bare model would accept; give the
        // embedded base id one pass of its own.
        if let Some(base) = base_model_id(&resolved) {
            if base != model_id && !trace.invoked.contains(&base) {
                if let Some(text) = self
                    .attempt_invoke(
                        InvocationStrategy::InvokeModel,
                        &base,
                        system_prompt,
                        input_text,
                        &mut trace,
                    )
                    .await?
                {
                    return Ok(TranslationOutcome {
                        text,
                        attempts: trace.attempts,
                    });
                }

                if let Some(text) = self
                    .attempt_converse(&base, system_prompt, input_text, &mut trace)
                    .await?
                {
                    return Ok(TranslationOutcome {
                        text,
                        attempts: trace.attempts,
                    });
                }
            }
        }

        // Alternate profiles of the same family, in registry table order
        if let Some(keyword) = family_keyword(model_id) {
            let alternates: Vec<String> = self
                .registry
                .profile_arns()
                .filter(|arn| arn.contains(keyword) && Family::sniff(arn) == family)
                .filter(|arn| *arn != resolved && *arn != model_id)
                .map(str::to_string)
                .collect();

            for arn in alternates {
                if trace.invoked.contains(&arn) {
                    continue;
                }

                if let Some(text) = self
                    .attempt_invoke(
                        InvocationStrategy::InvokeModel,
                        &arn,
                        system_prompt,
                        input_text,
                        &mut trace,
                    )
                    .await?
                {
                    return Ok(TranslationOutcome {
                        text,
                        attempts: trace.attempts,
                    });
                }

                if let Some(text) = self
                    .attempt_converse(&arn, system_prompt, input_text, &mut trace)
                    .await?
                {
                    return Ok(TranslationOutcome {
                        text,
                        attempts: trace.attempts,
                    });
                }
            }
        }

        let cause = trace
            .first_error
            .unwrap_or_else(|| "no invocation strategy available".to_string());

        tracing::error!(
            model_id,
            attempts = trace.attempts.len(),
            "translation exhausted every fallback strategy"
        );

        Err(DomainError::exhausted(model_id, cause))
    }

    fn dedicated_candidates(&self, model_id: &str, family: Family) -> Vec<String> {
        match (family, base_model_id(model_id)) {
            (Family::Mistral, Some(base)) => vec![base, model_id.to_string()],
            _ => vec![model_id.to_string()],
        }
    }

    /// One invoke-model attempt. `Ok(Some(text))` on success, `Ok(None)` on a
    /// retryable failure, `Err` when the error is terminal.
    async fn attempt_invoke(
        &self,
        strategy: InvocationStrategy,
        model_id: &str,
        system_prompt: &str,
        input_text: &str,
        trace: &mut CascadeTrace,
    ) -> Result<Option<String>, DomainError> {
        trace.invoked.insert(model_id.to_string());

        match self.invoke_once(model_id, system_prompt, input_text).await {
            Ok(text) => {
                trace.success(strategy, model_id);
                Ok(Some(text))
            }
            Err(error) if error.is_retryable() => {
                tracing::warn!(model_id, %error, "invoke-model attempt failed, falling back");
                trace.failure(strategy, model_id, &error);
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    async fn attempt_converse(
        &self,
        model_id: &str,
        system_prompt: &str,
        input_text: &str,
        trace: &mut CascadeTrace,
    ) -> Result<Option<String>, DomainError> {
        let prompt = format!("{system_prompt}\n\n{input_text}");
        let params = ConverseParams {
            temperature: TEMPERATURE as f32,
            max_tokens: MAX_TOKENS as i32,
        };

        match self.client.converse(model_id, &prompt, params).await {
            Ok(text) => {
                trace.success(InvocationStrategy::Converse, model_id);
                Ok(Some(text))
            }
            Err(error) if error.is_retryable() => {
                tracing::warn!(model_id, %error, "converse attempt failed, falling back");
                trace.failure(InvocationStrategy::Converse, model_id, &error);
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    async fn invoke_once(
        &self,
        model_id: &str,
        system_prompt: &str,
        input_text: &str,
    ) -> Result<String, DomainError> {
        let family = Family::sniff(model_id);
        let body = serde_json::to_vec(&family.build_request(system_prompt, input_text))
            .map_err(|e| DomainError::internal(format!("request serialization: {e}")))?;

        let bytes = self.client.invoke_model(model_id, body).await?;
        family.parse_response(model_id, &bytes)
    }
}

#[async_trait]
impl<C: BedrockRuntime> TranslationService for Translator<C> {
    async fn translate(
        &self,
        model_id: &str,
        system_prompt: &str,
        input_text: &str,
    ) -> Result<String, DomainError> {
        let outcome = self
            .translate_with_trace(model_id, system_prompt, input_text)
            .await?;

        tracing::debug!(
            model_id,
            attempts = outcome.attempts.len(),
            "translation succeeded"
        );

        Ok(outcome.text)
    }
}
