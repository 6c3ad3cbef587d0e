//! HTTP client for the Google Places web service.
//!
//! The API key is passed per call and only ever appears in the request query
//! string. Transport errors are stripped of their URL before being returned
//! so the key cannot leak into logs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::PlacesError;
use crate::gateway::{NearbyQuery, PlacesGateway};
use crate::types::{NearbySearchResponse, PlaceDetailsResponse};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place/";
const NEARBY_SEARCH_PATH: &str = "nearbysearch/json";
const DETAILS_PATH: &str = "details/json";

/// Fields requested from the details endpoint.
pub const DETAILS_FIELDS: &str = "place_id,name,website,formatted_address,rating,types";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the Places nearby-search and details endpoints.
///
/// Use [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests.
pub struct PlacesClient {
    client: Client,
    base_url: Url,
}

impl PlacesClient {
    /// Creates a client pointed at the production Places API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, PlacesError> {
        Self::with_base_url(timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so endpoint paths join underneath it.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| PlacesError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    fn build_url(
        &self,
        path: &str,
        credential: &str,
        params: &[(&str, &str)],
    ) -> Result<Url, PlacesError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| PlacesError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", credential);
        }
        Ok(url)
    }

    /// Sends a GET request, asserts a 2xx status, and decodes the body.
    ///
    /// `context` names the call in deserialization errors in place of the URL,
    /// which carries the key.
    async fn request_json<T: DeserializeOwned>(
        &self,
        url: Url,
        context: String,
    ) -> Result<T, PlacesError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let response = response
            .error_for_status()
            .map_err(reqwest::Error::without_url)?;
        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize { context, source: e })
    }
}

#[async_trait]
impl PlacesGateway for PlacesClient {
    async fn search_nearby(
        &self,
        query: &NearbyQuery<'_>,
        credential: &str,
    ) -> Result<NearbySearchResponse, PlacesError> {
        let location = query.origin.to_query_value();
        let radius = query.radius_m.to_string();
        let mut params = vec![
            ("location", location.as_str()),
            ("radius", radius.as_str()),
            ("type", query.category),
        ];
        if let Some(token) = query.page_token {
            params.push(("pagetoken", token));
        }

        let url = self.build_url(NEARBY_SEARCH_PATH, credential, &params)?;
        let page: NearbySearchResponse = self
            .request_json(
                url,
                format!(
                    "nearbysearch(type={}, radius={})",
                    query.category, query.radius_m
                ),
            )
            .await?;

        tracing::debug!(
            category = query.category,
            radius_m = query.radius_m,
            status = %page.status,
            results = page.results.len(),
            has_next_page = page.next_page_token.is_some(),
            "nearby search page received"
        );
        Ok(page)
    }

    async fn fetch_details(
        &self,
        place_id: &str,
        credential: &str,
    ) -> Result<PlaceDetailsResponse, PlacesError> {
        let url = self.build_url(
            DETAILS_PATH,
            credential,
            &[("place_id", place_id), ("fields", DETAILS_FIELDS)],
        )?;
        self.request_json(url, format!("details(place_id={place_id})"))
            .await
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
