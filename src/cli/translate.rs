//! Translate command - one-shot translation from the terminal

use clap::Args;

use crate::config::AppConfig;
use crate::domain::{render_instruction, DEFAULT_SYSTEM_PROMPT};
use crate::infrastructure::logging;

#[derive(Args)]
pub struct TranslateArgs {
    /// Text to translate
    pub text: String,

    /// Source language name, e.g. "English"
    #[arg(short, long, default_value = "English")]
    pub source: String,

    /// Target language name, e.g. "Chinese"
    #[arg(short, long)]
    pub target: String,

    /// Model identifier or inference profile ARN
    #[arg(short, long, default_value = "anthropic.claude-3-sonnet-20240229-v1:0")]
    pub model: String,

    /// Custom instruction template with {sourceLanguage} and
    /// {targetLanguage} placeholders
    #[arg(long)]
    pub system_prompt: Option<String>,
}

/// Translate one text and print the result to stdout
pub async fn run(args: TranslateArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&logging::LoggingConfig {
        level: "warn".to_string(),
        format: config.logging.format.clone(),
    });

    let state = crate::create_app_state_with_config(&config).await?;

    let template = args.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT);
    let system_prompt = render_instruction(template, &args.source, &args.target);

    let translated = state
        .translator
        .translate(&args.model, &system_prompt, &args.text)
        .await?;

    println!("{}", translated);
    Ok(())
}
