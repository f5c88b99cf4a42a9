//! Single-text translation endpoint

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{render_instruction, DEFAULT_SYSTEM_PROMPT};

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
    pub model_id: String,
    /// Optional instruction template; language placeholders are substituted
    /// before the model sees it
    #[serde(default)]
    pub system_prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub translated_text: String,
    pub model_id: String,
    pub model_name: String,
}

/// POST /v1/translate
pub async fn translate(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    if request.text.trim().is_empty() {
        return Err(ApiError::bad_request("Text to translate must not be empty").with_param("text"));
    }
    if request.model_id.trim().is_empty() {
        return Err(ApiError::bad_request("A model must be selected").with_param("model_id"));
    }

    let template = request
        .system_prompt
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(DEFAULT_SYSTEM_PROMPT);
    let system_prompt = render_instruction(
        template,
        &request.source_language,
        &request.target_language,
    );

    debug!(
        model_id = %request.model_id,
        source = %request.source_language,
        target = %request.target_language,
        "translating text"
    );

    let translated_text = state
        .translator
        .translate(&request.model_id, &system_prompt, &request.text)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(TranslateResponse {
        model_name: state.registry.display_name(&request.model_id),
        model_id: request.model_id,
        translated_text,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::state::test_support::{state_with, test_state};
    use crate::domain::translation::mock::MockTranslationService;

    fn request(text: &str, model_id: &str) -> TranslateRequest {
        TranslateRequest {
            text: text.to_string(),
            source_language: "English".to_string(),
            target_language: "French".to_string(),
            model_id: model_id.to_string(),
            system_prompt: None,
        }
    }

    #[tokio::test]
    async fn test_translate_returns_text_and_display_name() {
        let state = test_state().await;

        let response = translate(
            State(state),
            Json(request("Hello", "anthropic.claude-3-sonnet-20240229-v1:0")),
        )
        .await
        .unwrap();

        assert_eq!(response.0.translated_text, "Hello [translated]");
        assert_eq!(response.0.model_name, "Claude 3 Sonnet");
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected() {
        let state = test_state().await;

        let err = translate(State(state), Json(request("   ", "model")))
            .await
            .unwrap_err();

        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.param, Some("text".to_string()));
    }

    #[tokio::test]
    async fn test_backend_failure_surfaces_as_upstream_error() {
        let state = state_with(MockTranslationService::new().failing_on("boom")).await;

        let err = translate(State(state), Json(request("boom", "model")))
            .await
            .unwrap_err();

        assert_eq!(err.status, axum::http::StatusCode::BAD_GATEWAY);
    }
}
