//! AWS Bedrock integration: runtime client, family adapters, orchestrator

pub mod client;
pub mod family;
pub mod translator;

pub use client::{BedrockClient, BedrockRuntime, ConverseParams};
pub use family::Family;
pub use translator::Translator;
