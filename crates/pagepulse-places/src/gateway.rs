use async_trait::async_trait;
use pagepulse_core::Coordinates;

use crate::error::PlacesError;
use crate::types::{NearbySearchResponse, PlaceDetailsResponse};

/// Parameters of one nearby-search page request.
#[derive(Debug, Clone, Copy)]
pub struct NearbyQuery<'a> {
    pub origin: Coordinates,
    pub radius_m: u32,
    pub category: &'a str,
    pub page_token: Option<&'a str>,
}

/// The two Places calls discovery depends on.
///
/// Implementations report upstream statuses in the response rather than as
/// errors; `Err` is reserved for transport and decoding failures.
#[async_trait]
pub trait PlacesGateway: Send + Sync {
    async fn search_nearby(
        &self,
        query: &NearbyQuery<'_>,
        credential: &str,
    ) -> Result<NearbySearchResponse, PlacesError>;

    async fn fetch_details(
        &self,
        place_id: &str,
        credential: &str,
    ) -> Result<PlaceDetailsResponse, PlacesError>;
}
