//! `analyze` command: validate targets, run the batch, print results.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use pagepulse_core::{AppConfig, TargetList, UrlList, ValidationError};
use pagepulse_pagespeed::{client::DEFAULT_TIMEOUT_SECS, BatchAnalyzer, PageSpeedClient};
use pagepulse_store::{FileStore, HistoryStore};

use crate::render;

/// Reads URLs from `--url` flags and an optional file into one list.
///
/// Repeated URLs are skipped with a warning; anything empty or malformed is
/// an error, reported before any request is made.
pub(crate) fn collect_urls(urls: &[String], file: Option<&Path>) -> anyhow::Result<UrlList> {
    let mut list = UrlList::new();

    let mut from_file = Vec::new();
    if let Some(path) = file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read URL file {}", path.display()))?;
        from_file.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string),
        );
    }

    for url in urls.iter().chain(from_file.iter()) {
        match list.push(url) {
            Ok(()) => {}
            Err(ValidationError::DuplicateUrl(url)) => {
                tracing::warn!(url = %url, "duplicate URL skipped");
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(list)
}

pub(crate) async fn run_analyze(
    config: &AppConfig,
    urls: &[String],
    file: Option<&Path>,
    api_key: Option<&str>,
    record_history: bool,
) -> anyhow::Result<()> {
    let list = collect_urls(urls, file)?;
    let targets = list
        .into_targets(api_key.unwrap_or_default())
        .map_err(|err| match err {
            ValidationError::MissingCredential => anyhow::anyhow!(
                "{err} (pass --api-key or set PAGEPULSE_PAGESPEED_API_KEY)"
            ),
            other => other.into(),
        })?;

    let history = HistoryStore::new(FileStore::new(&config.storage_path));
    analyze_targets(config, &targets, record_history.then_some(&history)).await
}

/// Runs a batch over `targets`, printing each completion and a final summary.
pub(crate) async fn analyze_targets(
    config: &AppConfig,
    targets: &TargetList,
    history: Option<&HistoryStore>,
) -> anyhow::Result<()> {
    let client = PageSpeedClient::new(
        config.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        &config.user_agent,
    )
    .context("failed to build PageSpeed client")?
    .with_strategy(config.pagespeed_strategy);

    println!(
        "Analyzing {} URL(s) ({} strategy)...",
        targets.len(),
        config.pagespeed_strategy
    );

    let mut analyzer = BatchAnalyzer::new(&client)
        .stagger(Duration::from_millis(config.stagger_ms))
        .on_update(|board, result| {
            if result.completed() {
                println!("{}", render::format_progress_line(result, &board.stats()));
            }
        });
    if let Some(history) = history {
        analyzer = analyzer.history(history);
    }

    let board = analyzer.run(targets).await;

    println!();
    render::print_results(board.results());
    println!();
    render::print_summary(&board.stats());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn collects_flags_then_file_entries() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# my sites\nhttps://b.test\n\n  https://c.test  \nhttps://a.test").unwrap();

        let list = collect_urls(&["https://a.test".to_string()], Some(file.path())).unwrap();
        assert_eq!(
            list.urls(),
            ["https://a.test", "https://b.test", "https://c.test"]
        );
    }

    #[test]
    fn malformed_url_is_rejected_up_front() {
        let err = collect_urls(&["www.example.com".to_string()], None).unwrap_err();
        assert!(err.to_string().contains("www.example.com"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = collect_urls(&[], Some(Path::new("/nonexistent/urls.txt"))).unwrap_err();
        assert!(err.to_string().contains("failed to read URL file"));
    }
}
