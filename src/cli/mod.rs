//! Command line interface
//!
//! - `serve`: run the HTTP API
//! - `config`: print the effective configuration

pub mod config;
pub mod serve;

use clap::{Parser, Subcommand};

/// Federated search across document, email, chat, code and browser sources
#[derive(Parser)]
#[command(name = "federated-search")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server (default)
    Serve(serve::ServeArgs),

    /// Print the effective configuration as JSON
    Config,
}
