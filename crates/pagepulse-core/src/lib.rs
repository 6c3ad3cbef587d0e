pub mod analysis;
pub mod app_config;
pub mod config;
pub mod geo;
pub mod history;
pub mod profile;
pub mod targets;
pub mod urls;

pub use analysis::{AnalysisResult, AnalysisState, AnalysisStats, ScoreBand};
pub use app_config::{AppConfig, Environment, Strategy};
pub use config::{load_app_config, load_app_config_from_env, load_env_file};
pub use geo::{haversine_km, Coordinates};
pub use history::HistoryEntry;
pub use profile::{load_profile, DiscoveryProfile};
pub use targets::{TargetLabel, TargetList, UrlList, ValidationError};
pub use urls::{display_url, is_valid_target_url, normalize_website_url};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read discovery profile {path}: {source}")]
    ProfileFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse discovery profile: {0}")]
    ProfileFileParse(#[from] serde_yaml::Error),

    #[error("discovery profile validation failed: {0}")]
    Validation(String),
}
