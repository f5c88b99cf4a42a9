//! Model family classification and per-family request/response adapters
//!
//! Every Bedrock model family speaks its own request schema and response
//! envelope. A `Family` is sniffed from the identifier once, then carries the
//! pure transforms for that schema: `build_request` produces the JSON body,
//! `parse_response` extracts the generated text. Parsing never panics; a
//! malformed payload becomes a `ResponseParse` error that preserves the raw
//! payload for diagnostics.

use serde_json::{json, Value};

use crate::domain::DomainError;

/// Generation cap shared by every family that has the knob
pub const MAX_TOKENS: u32 = 2000;
/// Sampling temperature shared across families
pub const TEMPERATURE: f64 = 0.5;
/// Nucleus sampling parameter, where supported
pub const TOP_P: f64 = 0.9;

/// Keywords used to match alternate inference profiles of the same family
const FAMILY_KEYWORDS: &[&str] = &[
    "claude-3-5",
    "claude-3-7",
    "claude-opus-4",
    "claude-sonnet-4",
    "nova",
    "deepseek",
    "mistral",
    "pixtral",
];

/// Closed set of model families with distinct wire schemas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// DeepSeek reasoning models: tagged chat-template prompt
    DeepSeek,
    /// Mistral / Pixtral: bracketed instruction prompt
    Mistral,
    /// Claude 3 and later: anthropic messages schema
    Claude3,
    /// Claude 2 and earlier: Human/Assistant completion prompt
    ClaudeLegacy,
    Nova,
    Titan,
    Llama,
    Generic,
}

impl Family {
    /// Classify an identifier by case-insensitive substring, in fixed
    /// priority order. Deterministic: equal identifiers always map to the
    /// same family.
    pub fn sniff(model_id: &str) -> Self {
        let id = model_id.to_ascii_lowercase();

        if id.contains("deepseek") {
            Self::DeepSeek
        } else if id.contains("mistral") || id.contains("pixtral") {
            Self::Mistral
        } else if id.contains("claude") {
            if id.contains("claude-instant") || id.contains("claude-v2") || id.contains("claude-2")
            {
                Self::ClaudeLegacy
            } else {
                Self::Claude3
            }
        } else if id.contains("nova") {
            Self::Nova
        } else if id.contains("titan") {
            Self::Titan
        } else if id.contains("llama") || id.contains("meta") {
            Self::Llama
        } else {
            Self::Generic
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::DeepSeek => "deepseek",
            Self::Mistral => "mistral",
            Self::Claude3 => "claude",
            Self::ClaudeLegacy => "claude-legacy",
            Self::Nova => "nova",
            Self::Titan => "titan",
            Self::Llama => "llama",
            Self::Generic => "generic",
        }
    }

    /// Families with a nonstandard call convention that gets its own
    /// dedicated pass before the generic invocation path
    pub fn has_dedicated_path(&self) -> bool {
        matches!(self, Self::DeepSeek | Self::Mistral)
    }

    /// Build the provider-specific JSON request body
    pub fn build_request(&self, system_prompt: &str, input_text: &str) -> Value {
        match self {
            Self::DeepSeek => json!({
                "prompt": format!(
                    "<|system|>\n{system_prompt}\n<|user|>\n{input_text}\n<|assistant|>"
                ),
                "max_tokens": MAX_TOKENS,
                "temperature": TEMPERATURE,
                "top_p": TOP_P,
                // keeps the model from continuing past its own turn
                "stop": ["<|user|>"],
            }),
            Self::Mistral => json!({
                "prompt": format!("<s>[INST] {system_prompt}\n\n{input_text} [/INST]"),
                "max_tokens": MAX_TOKENS,
                "temperature": TEMPERATURE,
                "top_p": TOP_P,
            }),
            Self::Claude3 => json!({
                "anthropic_version": "bedrock-2023-05-31",
                "max_tokens": MAX_TOKENS,
                "messages": [
                    {
                        "role": "user",
                        "content": format!("{system_prompt}\n\n{input_text}"),
                    }
                ],
                "temperature": TEMPERATURE,
            }),
            Self::ClaudeLegacy => json!({
                "prompt": format!("\n\nHuman: {system_prompt}\n\n{input_text}\n\nAssistant:"),
                "max_tokens_to_sample": MAX_TOKENS,
                "temperature": TEMPERATURE,
            }),
            Self::Nova => json!({
                "inputText": format!("{system_prompt}\n\n{input_text}"),
                "textGenerationConfig": {
                    "maxTokenCount": MAX_TOKENS,
                    "temperature": TEMPERATURE,
                    "topP": TOP_P,
                    "stopSequences": [],
                },
            }),
            Self::Titan => json!({
                "inputText": format!("{system_prompt}\n\n{input_text}"),
                "textGenerationConfig": {
                    "maxTokenCount": MAX_TOKENS,
                    "temperature": TEMPERATURE,
                    "topP": TOP_P,
                },
            }),
            Self::Llama => json!({
                "prompt": format!("<s>[INST] {system_prompt}\n\n{input_text} [/INST]"),
                "max_gen_len": MAX_TOKENS,
                "temperature": TEMPERATURE,
                "top_p": TOP_P,
            }),
            Self::Generic => json!({
                "prompt": format!("{system_prompt}\n\nOriginal: {input_text}\nTranslation:"),
                "max_tokens": MAX_TOKENS,
                "temperature": TEMPERATURE,
            }),
        }
    }

    /// Extract the generated text from this family's response envelope.
    /// Missing or malformed fields yield `ResponseParse` with the raw
    /// payload preserved; this function never panics.
    pub fn parse_response(&self, model_id: &str, bytes: &[u8]) -> Result<String, DomainError> {
        let payload = String::from_utf8_lossy(bytes).into_owned();
        let body: Value = serde_json::from_slice(bytes)
            .map_err(|_| DomainError::response_parse(model_id, payload.clone()))?;

        let text = match self {
            Self::Claude3 => body
                .get("content")
                .and_then(Value::as_array)
                .and_then(|blocks| {
                    blocks
                        .iter()
                        .find_map(|block| block.get("text").and_then(Value::as_str))
                }),
            Self::ClaudeLegacy => body.get("completion").and_then(Value::as_str),
            Self::Nova | Self::Titan => body
                .get("results")
                .and_then(Value::as_array)
                .and_then(|results| results.first())
                .and_then(|r| r.get("outputText"))
                .and_then(Value::as_str),
            Self::Llama | Self::DeepSeek => body.get("generation").and_then(Value::as_str),
            Self::Mistral => body
                .get("outputs")
                .and_then(Value::as_array)
                .and_then(|outputs| outputs.first())
                .and_then(|o| o.get("text"))
                .and_then(Value::as_str),
            Self::Generic => body
                .get("completion")
                .and_then(Value::as_str)
                .or_else(|| body.get("generated_text").and_then(Value::as_str)),
        };

        match text {
            Some(text) => Ok(text.trim().to_string()),
            // The generic family has no known envelope to insist on; echo
            // the whole payload rather than fail the call.
            None if matches!(self, Self::Generic) => Ok(payload),
            None => Err(DomainError::response_parse(model_id, payload)),
        }
    }
}

/// The family keyword shared between an identifier and its alternate
/// inference profiles, if the identifier belongs to a keyword family.
pub fn family_keyword(model_id: &str) -> Option<&'static str> {
    let id = model_id.to_ascii_lowercase();
    FAMILY_KEYWORDS.iter().copied().find(|kw| id.contains(kw))
}
