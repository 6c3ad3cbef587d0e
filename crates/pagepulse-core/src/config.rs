use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment, Strategy};
use crate::ConfigError;

pub const DEFAULT_STORAGE_PATH: &str = "./.pagepulse/storage.json";
pub const DEFAULT_USER_AGENT: &str = "pagepulse/0.1 (site-performance)";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if a value is present but malformed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    load_env_file();
    load_app_config_from_env()
}

/// Loads `.env` into the process environment if present. Existing variables
/// win over file entries.
pub fn load_env_file() {
    dotenvy::dotenv().ok();
}

/// Load application configuration from variables already in the process,
/// without touching `.env`.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if a value is present but malformed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Every variable is optional; missing ones fall back to defaults and only
/// malformed values are rejected.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        match raw.trim().parse::<usize>() {
            Ok(0) => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be greater than zero".to_string(),
            }),
            Ok(value) => Ok(value),
            Err(e) => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        }
    };

    let env = parse_environment(&or_default("PAGEPULSE_ENV", "development"));
    let log_level = or_default("PAGEPULSE_LOG_LEVEL", "info");
    let storage_path = PathBuf::from(or_default("PAGEPULSE_STORAGE_PATH", DEFAULT_STORAGE_PATH));
    let profile_path = optional("PAGEPULSE_PROFILE_PATH").map(PathBuf::from);

    let request_timeout_secs = match optional("PAGEPULSE_REQUEST_TIMEOUT_SECS") {
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(0) => {
                return Err(ConfigError::InvalidEnvVar {
                    var: "PAGEPULSE_REQUEST_TIMEOUT_SECS".to_string(),
                    reason: "must be greater than zero".to_string(),
                })
            }
            Ok(secs) => Some(secs),
            Err(e) => {
                return Err(ConfigError::InvalidEnvVar {
                    var: "PAGEPULSE_REQUEST_TIMEOUT_SECS".to_string(),
                    reason: e.to_string(),
                })
            }
        },
        None => None,
    };

    let user_agent = or_default("PAGEPULSE_USER_AGENT", DEFAULT_USER_AGENT);
    let stagger_ms = parse_u64("PAGEPULSE_STAGGER_MS", "1000")?;

    let pagespeed_strategy = Strategy::from_str(&or_default("PAGEPULSE_PAGESPEED_STRATEGY", "mobile"))
        .map_err(|reason| ConfigError::InvalidEnvVar {
            var: "PAGEPULSE_PAGESPEED_STRATEGY".to_string(),
            reason,
        })?;

    let discovery_max_results = parse_positive_usize("PAGEPULSE_DISCOVERY_MAX_RESULTS", "50")?;

    Ok(AppConfig {
        env,
        log_level,
        storage_path,
        profile_path,
        request_timeout_secs,
        user_agent,
        stagger_ms,
        pagespeed_strategy,
        discovery_max_results,
    })
}

/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
