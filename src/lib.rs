//! Bedrock Translate
//!
//! Translation service backed by AWS Bedrock models, with:
//! - A registry of foundation models and inference profiles
//! - Cascading invocation fallbacks across model families and call APIs
//! - Line-oriented batch translation with progress reporting
//! - Quality ratings with seven-day statistics

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::AppState;
use domain::{ModelRegistry, TranslationService};
use infrastructure::bedrock::{BedrockClient, Translator};
use infrastructure::{BatchProgress, BatchTranslator, RatingsStore};
use tracing::info;

/// Create the application state with all services initialized
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let registry = Arc::new(ModelRegistry::builtin(
        &config.aws.region,
        &config.aws.account_id,
    ));
    info!(
        region = %config.aws.region,
        models = registry.list_models().len(),
        "Model registry initialized"
    );

    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.aws.region.clone()))
        .load()
        .await;
    let client = BedrockClient::new(&sdk_config).await;

    let translator: Arc<dyn TranslationService> =
        Arc::new(Translator::new(client, Arc::clone(&registry)));

    let progress = Arc::new(BatchProgress::new());
    let batch = Arc::new(BatchTranslator::new(
        Arc::clone(&translator),
        Arc::clone(&progress),
        Duration::from_millis(config.batch.pacing_ms),
    ));

    let ratings = Arc::new(
        RatingsStore::connect(&config.ratings.database_url, Arc::clone(&registry)).await?,
    );

    Ok(AppState::new(registry, translator, batch, progress, ratings))
}
