mod analyze;
mod discover;
mod history;
mod render;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pagepulse_core::{AppConfig, ConfigError};
use tracing_subscriber::EnvFilter;

use crate::history::HistoryCommands;

#[derive(Debug, Parser)]
#[command(name = "pagepulse")]
#[command(about = "Batch PageSpeed audits with nearby-business discovery")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Score a list of URLs with PageSpeed Insights
    Analyze {
        /// URL to analyze (repeatable)
        #[arg(long = "url", value_name = "URL")]
        urls: Vec<String>,
        /// File with one URL per line; blank lines and `#` comments are ignored
        #[arg(long)]
        file: Option<PathBuf>,
        /// PageSpeed Insights API key
        #[arg(long, env = "PAGEPULSE_PAGESPEED_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        /// Do not record successful results to history
        #[arg(long)]
        no_history: bool,
    },
    /// Find nearby businesses with websites not yet in history
    Discover {
        /// Stop after this many candidates (defaults to PAGEPULSE_DISCOVERY_MAX_RESULTS)
        #[arg(long)]
        max_results: Option<usize>,
        /// Google Places API key
        #[arg(long, env = "PAGEPULSE_PLACES_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        /// Analyze the discovered websites right away
        #[arg(long)]
        analyze: bool,
        /// PageSpeed Insights API key, required with --analyze
        #[arg(long, env = "PAGEPULSE_PAGESPEED_API_KEY", hide_env_values = true)]
        pagespeed_key: Option<String>,
        /// YAML discovery profile (origin and categories)
        #[arg(long)]
        profile: Option<PathBuf>,
        /// Also return websites already present in history
        #[arg(long)]
        include_known: bool,
    },
    /// Inspect or clear analysis history
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

/// Dispatches `cli`. Configuration is loaded only once there is a command to
/// run, so help and bare invocations work with a malformed environment.
async fn run<F>(cli: Cli, load_config: F) -> anyhow::Result<()>
where
    F: FnOnce() -> Result<AppConfig, ConfigError>,
{
    let Some(command) = cli.command else {
        println!("pagepulse: nothing to do; see `pagepulse --help`");
        return Ok(());
    };

    let config = load_config().context("invalid configuration")?;
    init_tracing(&config.log_level);
    tracing::debug!(?config, "configuration loaded");
    let config = &config;

    match command {
        Commands::Analyze {
            urls,
            file,
            api_key,
            no_history,
        } => {
            analyze::run_analyze(
                config,
                &urls,
                file.as_deref(),
                api_key.as_deref(),
                !no_history,
            )
            .await
        }
        Commands::Discover {
            max_results,
            api_key,
            analyze,
            pagespeed_key,
            profile,
            include_known,
        } => {
            discover::run_discover(
                config,
                discover::DiscoverOptions {
                    max_results,
                    api_key,
                    analyze,
                    pagespeed_key,
                    profile,
                    include_known,
                },
            )
            .await
        }
        Commands::History { command } => history::run_history(config, command),
    }
}

#[tokio::main]
async fn main() {
    // `.env` must be loaded before clap reads env-backed flags.
    pagepulse_core::load_env_file();
    let cli = Cli::parse();
    if let Err(err) = run(cli, pagepulse_core::load_app_config_from_env).await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
fn test_config(storage_path: PathBuf) -> AppConfig {
    AppConfig {
        env: pagepulse_core::Environment::Test,
        log_level: "warn".to_string(),
        storage_path,
        profile_path: None,
        request_timeout_secs: Some(5),
        user_agent: "pagepulse-test".to_string(),
        stagger_ms: 0,
        pagespeed_strategy: pagepulse_core::Strategy::Mobile,
        discovery_max_results: 50,
    }
}
