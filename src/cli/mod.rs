//! CLI module
//!
//! Subcommands:
//! - `serve`: run the HTTP API (default deployment mode)
//! - `translate`: translate a single text from the command line

pub mod serve;
pub mod translate;

use clap::{Parser, Subcommand};

/// Bedrock Translate - translation service backed by AWS Bedrock models
#[derive(Parser)]
#[command(name = "bedrock-translate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Translate one text and print the result
    Translate(translate::TranslateArgs),
}
