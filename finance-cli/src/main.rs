mod app;
mod cli;
mod config;
mod runtime;
mod test_data;

use anyhow::{Context, Result};
use clap::Parser;
use finance_client::{stores::EntryStore, ApiClient, HttpEntryStore};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Commands};
use crate::config::FinanceConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env.finance
    dotenvy::from_filename(".env.finance").ok();

    // Logs go to stderr so command output stays on stdout
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Commands::ConfigPath = cli.command {
        return print_config_path();
    }

    let config = FinanceConfig::load()?;
    debug!(?config, "config loaded");
    let settings = config.form_settings();
    let mut stdout = std::io::stdout();

    if cli.dev {
        info!("running against in-memory dev data");
        let backend = test_data::seeded_backend();
        let store = EntryStore::new(backend.clone(), backend);
        runtime::run(cli.command, &store, &settings, &mut stdout).await
    } else {
        let api = ApiClient::new(&config.api_url)
            .with_context(|| format!("Invalid api_url {:?}", config.api_url))?;
        let store = HttpEntryStore::http(api);
        runtime::run(cli.command, &store, &settings, &mut stdout).await
    }
}

fn print_config_path() -> Result<()> {
    let path = FinanceConfig::config_path()?;
    if !path.exists() {
        FinanceConfig::default().save_to(&path)?;
        eprintln!("Created default config");
    }
    println!("{}", path.display());
    Ok(())
}
