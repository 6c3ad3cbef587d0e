use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Context;
use pagepulse_core::{load_profile, AppConfig, DiscoveryProfile, TargetLabel, UrlList};
use pagepulse_places::{client::DEFAULT_TIMEOUT_SECS, CandidateSite, Discovery, DiscoveryLimits, PlacesClient};
use pagepulse_store::{FileStore, HistoryStore};

use crate::{analyze, render};

#[derive(Debug)]
pub(crate) struct DiscoverOptions {
    pub max_results: Option<usize>,
    pub api_key: Option<String>,
    pub analyze: bool,
    pub pagespeed_key: Option<String>,
    pub profile: Option<PathBuf>,
    pub include_known: bool,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub(crate) fn resolve_profile(
    config: &AppConfig,
    flag: Option<PathBuf>,
) -> anyhow::Result<DiscoveryProfile> {
    match flag.or_else(|| config.profile_path.clone()) {
        Some(path) => load_profile(&path)
            .with_context(|| format!("failed to load discovery profile {}", path.display())),
        None => Ok(DiscoveryProfile::default()),
    }
}

/// Turns candidates into a labelled target list for the batch analyzer.
pub(crate) fn candidate_targets(candidates: &[CandidateSite]) -> anyhow::Result<UrlList> {
    let mut list = UrlList::new();
    for candidate in candidates {
        list.push_labeled(
            &candidate.website,
            TargetLabel {
                business_name: Some(candidate.name.clone()),
                location: Some(candidate.location.clone()),
            },
        )?;
    }
    Ok(list)
}

pub(crate) async fn run_discover(config: &AppConfig, options: DiscoverOptions) -> anyhow::Result<()> {
    let api_key = non_blank(options.api_key).ok_or_else(|| {
        anyhow::anyhow!("a Places API key is required (pass --api-key or set PAGEPULSE_PLACES_API_KEY)")
    })?;
    // Checked before the crawl so a long discovery is not wasted.
    let pagespeed_key = if options.analyze {
        Some(non_blank(options.pagespeed_key).ok_or_else(|| {
            anyhow::anyhow!(
                "--analyze needs a PageSpeed API key (pass --pagespeed-key or set PAGEPULSE_PAGESPEED_API_KEY)"
            )
        })?)
    } else {
        None
    };

    let max_results = options.max_results.unwrap_or(config.discovery_max_results);
    if max_results == 0 {
        anyhow::bail!("--max-results must be greater than zero");
    }

    let profile = resolve_profile(config, options.profile)?;
    let history = HistoryStore::new(FileStore::new(&config.storage_path));
    let exclude: HashSet<String> = if options.include_known {
        HashSet::new()
    } else {
        history
            .unique_urls()
            .context("failed to read history")?
            .into_iter()
            .collect()
    };

    let client = PlacesClient::new(
        config.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        &config.user_agent,
    )
    .context("failed to build Places client")?;

    println!(
        "Discovering up to {max_results} businesses around {} ({} known URLs excluded)...",
        profile.label,
        exclude.len()
    );

    let candidates = Discovery::new(&client, profile)
        .limits(DiscoveryLimits::default().with_max_results(max_results))
        .on_progress(|progress| println!("{}", render::format_discovery_progress(progress)))
        .run(&api_key, &exclude)
        .await
        .context("discovery aborted")?;

    println!();
    render::print_candidates(&candidates);

    let Some(pagespeed_key) = pagespeed_key else {
        return Ok(());
    };
    if candidates.is_empty() {
        println!("nothing to analyze");
        return Ok(());
    }

    println!();
    let targets = candidate_targets(&candidates)?.into_targets(pagespeed_key)?;
    analyze::analyze_targets(config, &targets, Some(&history)).await
}
