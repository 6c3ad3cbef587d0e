//! Discovery profile: the origin point and the priority-ordered place
//! categories the crawl walks through.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;
use crate::ConfigError;

/// Douai, France.
pub const DEFAULT_ORIGIN: Coordinates = Coordinates::new(50.3669, 3.0803);

/// Place categories searched by default, most valuable first.
pub const DEFAULT_CATEGORIES: [&str; 25] = [
    "restaurant",
    "store",
    "bakery",
    "pharmacy",
    "gas_station",
    "car_repair",
    "beauty_salon",
    "gym",
    "bank",
    "real_estate_agency",
    "insurance_agency",
    "lawyer",
    "dentist",
    "veterinary_care",
    "florist",
    "book_store",
    "clothing_store",
    "electronics_store",
    "furniture_store",
    "jewelry_store",
    "shoe_store",
    "supermarket",
    "convenience_store",
    "hardware_store",
    "pet_store",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryProfile {
    pub label: String,
    pub origin: Coordinates,
    pub categories: Vec<String>,
}

impl Default for DiscoveryProfile {
    fn default() -> Self {
        Self {
            label: "Douai".to_string(),
            origin: DEFAULT_ORIGIN,
            categories: DEFAULT_CATEGORIES.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Load and validate a discovery profile from a YAML file.
///
/// # Errors
///
/// Returns [`ConfigError::ProfileFileIo`] if the file cannot be read,
/// [`ConfigError::ProfileFileParse`] if it is not valid YAML for a profile,
/// and [`ConfigError::Validation`] if the contents are unusable.
pub fn load_profile(path: &Path) -> Result<DiscoveryProfile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ProfileFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let profile: DiscoveryProfile = serde_yaml::from_str(&content)?;
    validate_profile(&profile)?;

    Ok(profile)
}

fn validate_profile(profile: &DiscoveryProfile) -> Result<(), ConfigError> {
    if !profile.origin.is_valid() {
        return Err(ConfigError::Validation(format!(
            "origin ({}, {}) is outside valid latitude/longitude ranges",
            profile.origin.lat, profile.origin.lng
        )));
    }

    if profile.categories.is_empty() {
        return Err(ConfigError::Validation(
            "at least one category is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for category in &profile.categories {
        if category.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category names must be non-empty".to_string(),
            ));
        }
        if !seen.insert(category.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category: '{category}'"
            )));
        }
    }

    Ok(())
}
