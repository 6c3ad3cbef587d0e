//! Google Places nearby-search client and the discovery crawl built on it.

pub mod candidate;
pub mod client;
pub mod discovery;
pub mod error;
pub mod gateway;
pub mod pacing;
pub mod types;

pub use candidate::CandidateSite;
pub use client::PlacesClient;
pub use discovery::{CategoryOutcome, Discovery, DiscoveryLimits, DiscoveryProgress};
pub use error::{DiscoveryError, PlacesError};
pub use gateway::{NearbyQuery, PlacesGateway};
pub use pacing::PacingPolicy;
pub use types::{
    NearbyPlace, NearbySearchResponse, PlaceDetails, PlaceDetailsResponse, PlaceGeometry,
    PlaceStatus,
};
