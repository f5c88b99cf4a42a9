//! AWS Bedrock runtime client abstraction
//!
//! Wraps the two invocation APIs the orchestrator cascades over: the
//! synchronous `invoke_model` call (raw JSON body, family-specific schema)
//! and the structured `converse` call. Behind a trait for dependency
//! injection in tests.

use async_trait::async_trait;

use crate::domain::DomainError;

/// Inference parameters for the converse API
#[derive(Debug, Clone, Copy)]
pub struct ConverseParams {
    pub temperature: f32,
    pub max_tokens: i32,
}

/// Bedrock runtime trait for dependency injection
#[async_trait]
pub trait BedrockRuntime: Send + Sync + std::fmt::Debug {
    /// Invoke a model with a provider-specific JSON body; returns the raw
    /// response body for the family adapter to parse.
    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, DomainError>;

    /// Send one user turn through the converse API and return the assistant
    /// text. The converse response shape is fixed by the service, so text
    /// extraction lives here rather than in a family adapter.
    async fn converse(
        &self,
        model_id: &str,
        prompt: &str,
        params: ConverseParams,
    ) -> Result<String, DomainError>;
}

/// Real AWS Bedrock client implementation
#[derive(Debug, Clone)]
pub struct BedrockClient {
    client: aws_sdk_bedrockruntime::Client,
}

impl BedrockClient {
    pub async fn new(config: &aws_config::SdkConfig) -> Self {
        let client = aws_sdk_bedrockruntime::Client::new(config);
        Self { client }
    }

    pub fn from_client(client: aws_sdk_bedrockruntime::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BedrockRuntime for BedrockClient {
    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, DomainError> {
        let blob = aws_sdk_bedrockruntime::primitives::Blob::new(body);

        let response = self
            .client
            .invoke_model()
            .model_id(model_id)
            .body(blob)
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| DomainError::provider("bedrock", format!("invoke_model: {e}")))?;

        Ok(response.body.into_inner())
    }

    async fn converse(
        &self,
        model_id: &str,
        prompt: &str,
        params: ConverseParams,
    ) -> Result<String, DomainError> {
        use aws_sdk_bedrockruntime::types::{
            ContentBlock, ConversationRole, InferenceConfiguration, Message,
        };

        let message = Message::builder()
            .role(ConversationRole::User)
            .content(ContentBlock::Text(prompt.to_string()))
            .build()
            .map_err(|e| DomainError::internal(format!("converse message: {e}")))?;

        let inference = InferenceConfiguration::builder()
            .temperature(params.temperature)
            .max_tokens(params.max_tokens)
            .build();

        let response = self
            .client
            .converse()
            .model_id(model_id)
            .messages(message)
            .inference_config(inference)
            .send()
            .await
            .map_err(|e| DomainError::provider("bedrock", format!("converse: {e}")))?;

        let text = response
            .output()
            .and_then(|output| output.as_message().ok())
            .and_then(|message| {
                message
                    .content()
                    .iter()
                    .find_map(|block| block.as_text().ok().cloned())
            });

        text.map(|t| t.trim().to_string()).ok_or_else(|| {
            DomainError::response_parse(model_id, "converse output carried no text content")
        })
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    /// One observed client call, for asserting cascade order and payloads
    #[derive(Debug, Clone)]
    pub struct RecordedCall {
        pub api: &'static str,
        pub model_id: String,
        pub body: Option<serde_json::Value>,
    }

    /// Scripted Bedrock runtime. Responses are queued per model id and
    /// consumed in order; unscripted calls fail with a provider error.
    #[derive(Debug, Default)]
    pub struct MockBedrockRuntime {
        invoke_queues: Mutex<HashMap<String, VecDeque<Result<Vec<u8>, String>>>>,
        converse_queues: Mutex<HashMap<String, VecDeque<Result<String, String>>>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl MockBedrockRuntime {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_invoke_response(self, model_id: &str, response: serde_json::Value) -> Self {
            self.invoke_queues
                .lock()
                .unwrap()
                .entry(model_id.to_string())
                .or_default()
                .push_back(Ok(serde_json::to_vec(&response).unwrap()));
            self
        }

        pub fn with_invoke_error(self, model_id: &str, error: &str) -> Self {
            self.invoke_queues
                .lock()
                .unwrap()
                .entry(model_id.to_string())
                .or_default()
                .push_back(Err(error.to_string()));
            self
        }

        pub fn with_converse_response(self, model_id: &str, text: &str) -> Self {
            self.converse_queues
                .lock()
                .unwrap()
                .entry(model_id.to_string())
                .or_default()
                .push_back(Ok(text.to_string()));
            self
        }

        pub fn with_converse_error(self, model_id: &str, error: &str) -> Self {
            self.converse_queues
                .lock()
                .unwrap()
                .entry(model_id.to_string())
                .or_default()
                .push_back(Err(error.to_string()));
            self
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl BedrockRuntime for MockBedrockRuntime {
        async fn invoke_model(
            &self,
            model_id: &str,
            body: Vec<u8>,
        ) -> Result<Vec<u8>, DomainError> {
            self.calls.lock().unwrap().push(RecordedCall {
                api: "invoke_model",
                model_id: model_id.to_string(),
                body: serde_json::from_slice(&body).ok(),
            });

            match self
                .invoke_queues
                .lock()
                .unwrap()
                .get_mut(model_id)
                .and_then(VecDeque::pop_front)
            {
                Some(Ok(bytes)) => Ok(bytes),
                Some(Err(message)) => Err(DomainError::provider("bedrock", message)),
                None => Err(DomainError::provider(
                    "bedrock",
                    format!("no mock invoke response for {model_id}"),
                )),
            }
        }

        async fn converse(
            &self,
            model_id: &str,
            prompt: &str,
            _params: ConverseParams,
        ) -> Result<String, DomainError> {
            self.calls.lock().unwrap().push(RecordedCall {
                api: "converse",
                model_id: model_id.to_string(),
                body: Some(serde_json::Value::String(prompt.to_string())),
            });

            match self
                .converse_queues
                .lock()
                .unwrap()
                .get_mut(model_id)
                .and_then(VecDeque::pop_front)
            {
                Some(Ok(text)) => Ok(text),
                Some(Err(message)) => Err(DomainError::provider("bedrock", message)),
                None => Err(DomainError::provider(
                    "bedrock",
                    format!("no mock converse response for {model_id}"),
                )),
            }
        }
    }
}
