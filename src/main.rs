use clap::Parser;
use federated_search::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or_else(|| Command::Serve(Default::default())) {
        Command::Serve(args) => cli::serve::run(args).await,
        Command::Config => cli::config::run(),
    }
}
