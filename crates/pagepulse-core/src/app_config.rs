use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Device profile the scoring API emulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    #[default]
    Mobile,
    Desktop,
}

impl Strategy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Desktop => "desktop",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mobile" => Ok(Self::Mobile),
            "desktop" => Ok(Self::Desktop),
            other => Err(format!("unknown strategy '{other}', expected mobile or desktop")),
        }
    }
}

/// Runtime settings read from the environment.
///
/// API credentials are deliberately absent: they are supplied per command and
/// never stored alongside configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub storage_path: PathBuf,
    /// Optional YAML discovery profile; the built-in default is used when unset.
    pub profile_path: Option<PathBuf>,
    /// Overrides both HTTP clients' default timeouts when set.
    pub request_timeout_secs: Option<u64>,
    pub user_agent: String,
    pub stagger_ms: u64,
    pub pagespeed_strategy: Strategy,
    pub discovery_max_results: usize,
}
