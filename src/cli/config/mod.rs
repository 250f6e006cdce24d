//! Config command - prints the configuration the server would run with

use anyhow::Context;

use crate::config::AppConfig;

pub fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let rendered = serde_json::to_string_pretty(&config)?;
    println!("{}", rendered);

    Ok(())
}
