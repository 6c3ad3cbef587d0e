//! Plain-text output for results, discovery candidates, and history.

use pagepulse_core::{display_url, AnalysisResult, AnalysisState, AnalysisStats, HistoryEntry};
use pagepulse_places::{CandidateSite, DiscoveryProgress};

const MISSING: &str = "\u{2014}";

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() > max_chars {
        format!("{}...", value.chars().take(max_chars).collect::<String>())
    } else {
        value.to_string()
    }
}

pub(crate) fn format_score(result: &AnalysisResult) -> String {
    match result.state {
        AnalysisState::Pending => "pending".to_string(),
        AnalysisState::InProgress => "running".to_string(),
        AnalysisState::Failed => "error".to_string(),
        AnalysisState::Scored(score) => {
            let band = result.band().map_or(MISSING, |b| b.label());
            format!("{score} ({band})")
        }
    }
}

pub(crate) fn format_progress_line(result: &AnalysisResult, stats: &AnalysisStats) -> String {
    let name = result
        .business_name
        .as_deref()
        .map(|n| format!("  {n}"))
        .unwrap_or_default();
    format!(
        "[{}/{}] {}  {}{}",
        stats.completed,
        stats.total,
        display_url(&result.url),
        format_score(result),
        name
    )
}

pub(crate) fn format_discovery_progress(progress: &DiscoveryProgress) -> String {
    format!(
        "  [{}/{}] searching {}",
        progress.current, progress.total, progress.label
    )
}

pub(crate) fn format_average(stats: &AnalysisStats) -> String {
    stats
        .display_average()
        .map_or_else(|| MISSING.to_string(), |avg| avg.to_string())
}

pub(crate) fn print_results(results: &[AnalysisResult]) {
    println!("{:<42}{:<18}BUSINESS", "URL", "SCORE");
    for result in results {
        println!(
            "{:<42}{:<18}{}",
            truncate(display_url(&result.url), 38),
            format_score(result),
            result.business_name.as_deref().unwrap_or(MISSING)
        );
    }
}

pub(crate) fn print_summary(stats: &AnalysisStats) {
    println!(
        "Analyzed {}/{}  average {}  good {}  average-band {}  poor {}",
        stats.completed,
        stats.total,
        format_average(stats),
        stats.good,
        stats.average,
        stats.poor
    );
}

pub(crate) fn print_candidates(candidates: &[CandidateSite]) {
    if candidates.is_empty() {
        println!("no new businesses with websites found");
        return;
    }

    println!("{:<9}{:<32}{:<38}RATING", "DIST", "NAME", "WEBSITE");
    for candidate in candidates {
        let rating = candidate
            .rating
            .map_or_else(|| MISSING.to_string(), |r| format!("{r:.1}"));
        println!(
            "{:<9}{:<32}{:<38}{}",
            format!("{:.1}km", candidate.distance_km),
            truncate(&candidate.name, 28),
            truncate(display_url(&candidate.website), 34),
            rating
        );
    }
    println!("{} candidate(s)", candidates.len());
}

pub(crate) fn print_history(entries: &[HistoryEntry]) {
    println!("{:<18}{:<18}{:<42}BUSINESS", "ANALYZED", "SCORE", "URL");
    for entry in entries {
        let analyzed = entry
            .analyzed_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M");
        println!(
            "{:<18}{:<18}{:<42}{}",
            analyzed.to_string(),
            format_score(&entry.result),
            truncate(display_url(&entry.result.url), 38),
            entry.result.business_name.as_deref().unwrap_or(MISSING)
        );
    }
}
