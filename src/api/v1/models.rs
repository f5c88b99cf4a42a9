//! Model catalog endpoints

use axum::extract::State;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::types::Json;
use crate::domain::{ModelDescriptor, ModelGroup};

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelDescriptor>,
}

#[derive(Debug, Serialize)]
pub struct ModelGroupsResponse {
    pub groups: Vec<ModelGroup>,
}

/// GET /v1/models
pub async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.registry.list_models(),
    })
}

/// GET /v1/models/groups
pub async fn list_model_groups(State(state): State<AppState>) -> Json<ModelGroupsResponse> {
    Json(ModelGroupsResponse {
        groups: state.registry.list_groups(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::state::test_support::test_state;

    #[tokio::test]
    async fn test_list_models_returns_full_catalog() {
        let state = test_state().await;

        let response = list_models(State(state)).await;
        assert_eq!(response.0.models.len(), 27);
        assert!(response.0.models.iter().all(|m| !m.display_name.is_empty()));
    }

    #[tokio::test]
    async fn test_groups_are_ordered_for_display() {
        let state = test_state().await;

        let response = list_model_groups(State(state)).await;
        assert_eq!(response.0.groups[0].name, "Claude 3");
        assert!(response.0.groups.iter().all(|g| !g.models.is_empty()));
    }
}
