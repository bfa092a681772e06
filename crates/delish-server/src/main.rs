//! Delish server entry point.

mod config;
mod telemetry;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use delish_db::repository::SurrealStoreRepository;
use delish_web::Server;

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "delish", version, about = "Store directory web server")]
struct Cli {
    /// Path to the TOML config file. Defaults to `delish.toml`.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    if cli.json_logs {
        config.telemetry.json_logs = true;
    }
    telemetry::init_logging(&config.telemetry);

    let db = delish_db::connect(&config.database)
        .await
        .context("opening the store database")?;

    let stores = SurrealStoreRepository::new(db);
    Server::new(stores, config.server)
        .context("building the HTTP server")?
        .run()
        .await
        .context("serving HTTP")?;

    Ok(())
}
