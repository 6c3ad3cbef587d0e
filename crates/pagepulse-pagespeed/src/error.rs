use thiserror::Error;

/// Errors building or calling the PageSpeed client.
///
/// Scoring itself never fails outward: [`crate::ScoreGateway::analyze`]
/// folds these into a failed [`crate::ScoreOutcome`].
#[derive(Debug, Error)]
pub enum PageSpeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
