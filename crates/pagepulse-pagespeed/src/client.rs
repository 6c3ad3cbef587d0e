//! HTTP client for the PageSpeed Insights v5 API.

use std::time::Duration;

use async_trait::async_trait;
use pagepulse_core::Strategy;
use reqwest::{Client, Url};

use crate::error::PageSpeedError;
use crate::types::{PageSpeedResponse, ScoreOutcome};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/pagespeedonline/v5/";
const RUN_PAGESPEED_PATH: &str = "runPagespeed";

/// Lighthouse runs routinely take tens of seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Scores a single URL. Failures are reported inside the outcome.
#[async_trait]
pub trait ScoreGateway: Send + Sync {
    async fn analyze(&self, url: &str, credential: &str) -> ScoreOutcome;
}

/// Converts a Lighthouse fraction to an integer score in `0..=100`.
///
/// Returns `None` for non-finite input.
#[must_use]
pub fn scale_score(fraction: f64) -> Option<u8> {
    if !fraction.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let score = (fraction * 100.0).round().clamp(0.0, 100.0) as u8;
    Some(score)
}

pub struct PageSpeedClient {
    client: Client,
    base_url: Url,
    strategy: Strategy,
}

impl PageSpeedClient {
    /// Creates a client pointed at the production PageSpeed API.
    ///
    /// # Errors
    ///
    /// Returns [`PageSpeedError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, PageSpeedError> {
        Self::with_base_url(timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PageSpeedError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PageSpeedError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, PageSpeedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .and_then(|base| base.join(RUN_PAGESPEED_PATH))
            .map_err(|e| PageSpeedError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            strategy: Strategy::default(),
        })
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    fn build_url(&self, target: &str, credential: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("url", target)
            .append_pair("key", credential)
            .append_pair("category", "performance")
            .append_pair("strategy", self.strategy.as_str());
        url
    }

    /// Fetches and decodes a report regardless of HTTP status; error
    /// responses carry their explanation in the JSON body.
    async fn fetch_report(
        &self,
        target: &str,
        credential: &str,
    ) -> Result<PageSpeedResponse, PageSpeedError> {
        let response = self
            .client
            .get(self.build_url(target, credential))
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        serde_json::from_str(&body).map_err(|e| PageSpeedError::Deserialize {
            context: format!("runPagespeed(url={target})"),
            source: e,
        })
    }
}

#[async_trait]
impl ScoreGateway for PageSpeedClient {
    async fn analyze(&self, url: &str, credential: &str) -> ScoreOutcome {
        let report = match self.fetch_report(url, credential).await {
            Ok(report) => report,
            Err(err) => {
                tracing::error!(url, error = %err, "pagespeed request failed");
                return ScoreOutcome::failed(url);
            }
        };

        match report.performance_score().and_then(scale_score) {
            Some(score) => {
                tracing::info!(url, score, "pagespeed analysis complete");
                ScoreOutcome::scored(url, score)
            }
            None => {
                tracing::warn!(
                    url,
                    reason = report.error_message().unwrap_or("no lighthouseResult"),
                    "pagespeed analysis returned no performance score"
                );
                ScoreOutcome::failed(url)
            }
        }
    }
}
