//! Wire types for the nearby-search and place-details endpoints.
//!
//! Only the fields discovery reads are modelled; everything else in the
//! upstream payload is ignored.

use pagepulse_core::Coordinates;
use serde::{Deserialize, Serialize};

/// Top-level `status` string of a Places response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PlaceStatus {
    Ok,
    ZeroResults,
    /// Anything else: `REQUEST_DENIED`, `OVER_QUERY_LIMIT`, `INVALID_REQUEST`, ...
    Other(String),
}

impl PlaceStatus {
    /// `OK` and `ZERO_RESULTS` are both successful responses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Ok | Self::ZeroResults)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ok => "OK",
            Self::ZeroResults => "ZERO_RESULTS",
            Self::Other(status) => status,
        }
    }
}

impl From<String> for PlaceStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "OK" => Self::Ok,
            "ZERO_RESULTS" => Self::ZeroResults,
            _ => Self::Other(value),
        }
    }
}

impl From<PlaceStatus> for String {
    fn from(value: PlaceStatus) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for PlaceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One page of `nearbysearch/json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbySearchResponse {
    #[serde(default)]
    pub results: Vec<NearbyPlace>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    pub status: PlaceStatus,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyPlace {
    pub place_id: String,
    #[serde(default)]
    pub name: String,
    pub geometry: PlaceGeometry,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub vicinity: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceGeometry {
    pub location: Coordinates,
}

/// Response of `details/json`. `result` is absent on non-OK statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceDetailsResponse {
    #[serde(default)]
    pub result: Option<PlaceDetails>,
    pub status: PlaceStatus,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub types: Vec<String>,
}
