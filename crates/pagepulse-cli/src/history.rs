//! `history` subcommands over the file-backed history store.

use anyhow::Context;
use clap::Subcommand;
use pagepulse_core::AppConfig;
use pagepulse_store::{FileStore, HistoryFilter, HistorySort, HistoryStore};

use crate::render;

/// Sub-commands available under `history`.
#[derive(Debug, Subcommand)]
pub enum HistoryCommands {
    /// List stored analyses
    List {
        /// Score band to show: all, good, average or poor
        #[arg(long, default_value = "all")]
        filter: HistoryFilter,
        /// Ordering: date, score or url
        #[arg(long, default_value = "date")]
        sort: HistorySort,
    },
    /// Print every distinct analyzed URL, most recent first
    Urls,
    /// Delete all stored analyses
    Clear,
}

pub(crate) fn run_history(config: &AppConfig, command: HistoryCommands) -> anyhow::Result<()> {
    let history = HistoryStore::new(FileStore::new(&config.storage_path));
    match command {
        HistoryCommands::List { filter, sort } => run_history_list(&history, filter, sort),
        HistoryCommands::Urls => run_history_urls(&history),
        HistoryCommands::Clear => run_history_clear(&history),
    }
}

fn run_history_list(
    history: &HistoryStore,
    filter: HistoryFilter,
    sort: HistorySort,
) -> anyhow::Result<()> {
    let entries = history
        .query(filter, sort)
        .context("failed to read history")?;

    if entries.is_empty() {
        println!("no history entries; run `pagepulse analyze` first");
        return Ok(());
    }

    render::print_history(&entries);
    println!();
    render::print_summary(&history.stats().context("failed to read history")?);
    Ok(())
}

fn run_history_urls(history: &HistoryStore) -> anyhow::Result<()> {
    for url in history.unique_urls().context("failed to read history")? {
        println!("{url}");
    }
    Ok(())
}

fn run_history_clear(history: &HistoryStore) -> anyhow::Result<()> {
    let count = history.entries().context("failed to read history")?.len();
    history.clear().context("failed to clear history")?;
    println!("cleared {count} history entries");
    Ok(())
}
