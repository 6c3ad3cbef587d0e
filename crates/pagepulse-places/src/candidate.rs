use serde::Serialize;

/// A business with a usable website, found by discovery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSite {
    pub place_id: String,
    pub name: String,
    /// Normalized absolute URL.
    pub website: String,
    /// Formatted address.
    pub location: String,
    /// Distance from the search origin, rounded to 0.1 km.
    pub distance_km: f64,
    pub rating: Option<f64>,
    pub categories: Vec<String>,
}
