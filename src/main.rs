use clap::Parser;

use bedrock_translate::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Translate(args) => cli::translate::run(args).await,
    }
}
