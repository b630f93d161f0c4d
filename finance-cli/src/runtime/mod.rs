use anyhow::Result;
use finance_client::stores::{CategoryStore, EntryRecords, EntryStore};
use std::io::Write;

use crate::app::FormSettings;
use crate::cli::Commands;

mod categories;
mod entries;

/// Runs one store-backed command, printing its outcome to `out`.
pub async fn run<C: CategoryStore, R: EntryRecords>(
    command: Commands,
    store: &EntryStore<C, R>,
    settings: &FormSettings,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Commands::Entries(command) => entries::run(command, store, settings, out).await,
        Commands::Categories(command) => categories::run(command, store.categories(), out).await,
        Commands::ConfigPath => anyhow::bail!("config-path does not use a backend"),
    }
}
