use thiserror::Error;

/// Errors returned by the Places API client.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure, or a non-2xx HTTP status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Failure that aborts a whole discovery run.
///
/// Only the very first search request of a run can produce one of these;
/// later failures skip the affected category instead.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(
        "places search for '{category}' was rejected with status {status} ({})",
        .message.as_deref().unwrap_or("no details")
    )]
    Rejected {
        category: String,
        status: String,
        message: Option<String>,
    },

    #[error("places search for '{category}' failed")]
    Gateway {
        category: String,
        #[source]
        source: PlacesError,
    },
}
