//! Progressive, rate-limited crawl over the Places nearby search.
//!
//! The crawl widens the search radius tier by tier and, within each tier,
//! walks the profile's categories in priority order, paging through results
//! until the result cap is reached. Every place id is looked up at most once
//! per run, and only places whose website normalizes to a URL outside the
//! caller's exclusion set are kept.

use std::collections::HashSet;

use pagepulse_core::{haversine_km, normalize_website_url, DiscoveryProfile};

use crate::candidate::CandidateSite;
use crate::error::DiscoveryError;
use crate::gateway::{NearbyQuery, PlacesGateway};
use crate::pacing::{pause, PacingPolicy};
use crate::types::{NearbyPlace, PlaceStatus};

/// Radius and volume bounds of a discovery run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryLimits {
    pub min_radius_km: u32,
    pub max_radius_km: u32,
    pub radius_step_km: u32,
    pub max_pages_per_category: u32,
    pub max_results: usize,
}

impl Default for DiscoveryLimits {
    fn default() -> Self {
        Self {
            min_radius_km: 5,
            max_radius_km: 30,
            radius_step_km: 5,
            max_pages_per_category: 3,
            max_results: 50,
        }
    }
}

impl DiscoveryLimits {
    #[must_use]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

/// Progress snapshot emitted each time a category is picked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryProgress {
    pub current: usize,
    pub total: usize,
    /// `"<category> (<radius>km)"`
    pub label: String,
}

/// How a single category attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryOutcome {
    Completed,
    /// Abandoned after a failed or rejected page; discovery moves on.
    Skipped(String),
}

type ProgressCallback<'a> = Box<dyn FnMut(&DiscoveryProgress) + 'a>;

/// A configured discovery run. Consumed by [`Discovery::run`].
pub struct Discovery<'a> {
    gateway: &'a dyn PlacesGateway,
    profile: DiscoveryProfile,
    limits: DiscoveryLimits,
    pacing: PacingPolicy,
    on_progress: Option<ProgressCallback<'a>>,
}

/// Mutable bookkeeping for one run.
struct RunState {
    candidates: Vec<CandidateSite>,
    seen_places: HashSet<String>,
    emitted: HashSet<String>,
    excluded: HashSet<String>,
    searches: usize,
    max_results: usize,
}

impl RunState {
    fn is_full(&self) -> bool {
        self.candidates.len() >= self.max_results
    }
}

impl<'a> Discovery<'a> {
    /// Creates a run with default limits and pacing.
    #[must_use]
    pub fn new(gateway: &'a dyn PlacesGateway, profile: DiscoveryProfile) -> Self {
        Self {
            gateway,
            profile,
            limits: DiscoveryLimits::default(),
            pacing: PacingPolicy::default(),
            on_progress: None,
        }
    }

    #[must_use]
    pub fn limits(mut self, limits: DiscoveryLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn pacing(mut self, pacing: PacingPolicy) -> Self {
        self.pacing = pacing;
        self
    }

    /// Registers a callback invoked before each category is searched.
    #[must_use]
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&DiscoveryProgress) + 'a,
    {
        self.on_progress = Some(Box::new(callback));
        self
    }

    /// Runs the crawl and returns candidates sorted by ascending distance.
    ///
    /// URLs in `exclude` are compared after normalization, so
    /// `https://example.com` also excludes `example.com/`.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] only when the very first search request of
    /// the run fails or is rejected (typically an invalid key). Any later
    /// failure skips the affected category or place and the run continues.
    pub async fn run(
        mut self,
        credential: &str,
        exclude: &HashSet<String>,
    ) -> Result<Vec<CandidateSite>, DiscoveryError> {
        let mut state = RunState {
            candidates: Vec::new(),
            seen_places: HashSet::new(),
            emitted: HashSet::new(),
            excluded: exclude
                .iter()
                .filter_map(|url| normalize_website_url(url))
                .collect(),
            searches: 0,
            max_results: self.limits.max_results,
        };

        let categories = std::mem::take(&mut self.profile.categories);
        let step = self.limits.radius_step_km.max(1);
        let mut radius_km = self.limits.min_radius_km;

        while radius_km <= self.limits.max_radius_km && !state.is_full() {
            tracing::info!(radius_km, found = state.candidates.len(), "searching radius tier");

            for (index, category) in categories.iter().enumerate() {
                if state.is_full() {
                    break;
                }

                if let Some(callback) = self.on_progress.as_mut() {
                    callback(&DiscoveryProgress {
                        current: state.candidates.len(),
                        total: self.limits.max_results,
                        label: format!("{category} ({radius_km}km)"),
                    });
                }

                let outcome = self
                    .search_category(&mut state, category, index, radius_km, credential)
                    .await?;
                match outcome {
                    CategoryOutcome::Completed => {
                        tracing::debug!(
                            category = %category,
                            radius_km,
                            found = state.candidates.len(),
                            "category done"
                        );
                    }
                    CategoryOutcome::Skipped(reason) => {
                        tracing::warn!(category = %category, radius_km, reason = %reason, "category skipped");
                    }
                }
            }

            radius_km = radius_km.saturating_add(step);
        }

        let mut candidates = state.candidates;
        candidates.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

        tracing::info!(
            found = candidates.len(),
            searches = state.searches,
            lookups = state.seen_places.len(),
            "discovery finished"
        );
        Ok(candidates)
    }

    async fn search_category(
        &self,
        state: &mut RunState,
        category: &str,
        category_index: usize,
        radius_km: u32,
        credential: &str,
    ) -> Result<CategoryOutcome, DiscoveryError> {
        let mut page_token: Option<String> = None;
        let mut pages = 0u32;

        loop {
            if pages > 0 {
                pause(self.pacing.inter_page).await;
            } else if category_index > 0 {
                pause(self.pacing.inter_category).await;
            }

            let query = NearbyQuery {
                origin: self.profile.origin,
                radius_m: radius_km.saturating_mul(1000),
                category,
                page_token: page_token.as_deref(),
            };

            let is_first_search = state.searches == 0;
            state.searches += 1;

            let page = match self.gateway.search_nearby(&query, credential).await {
                Ok(page) => page,
                Err(source) if is_first_search => {
                    return Err(DiscoveryError::Gateway {
                        category: category.to_string(),
                        source,
                    });
                }
                Err(err) => return Ok(CategoryOutcome::Skipped(err.to_string())),
            };

            if !page.status.is_success() {
                if is_first_search {
                    return Err(DiscoveryError::Rejected {
                        category: category.to_string(),
                        status: page.status.to_string(),
                        message: page.error_message,
                    });
                }
                return Ok(CategoryOutcome::Skipped(format!(
                    "search returned status {}",
                    page.status
                )));
            }

            for place in &page.results {
                if state.is_full() {
                    break;
                }
                if !state.seen_places.insert(place.place_id.clone()) {
                    continue;
                }
                self.resolve_place(state, place, credential).await;
            }

            pages += 1;
            page_token = page.next_page_token;

            match page_token {
                Some(_) if pages < self.limits.max_pages_per_category && !state.is_full() => {
                    pause(self.pacing.post_page_token).await;
                }
                _ => return Ok(CategoryOutcome::Completed),
            }
        }
    }

    /// Looks up a newly seen place and records it if it has a usable website.
    async fn resolve_place(&self, state: &mut RunState, place: &NearbyPlace, credential: &str) {
        let distance_km = round_tenth(haversine_km(self.profile.origin, place.geometry.location));

        pause(self.pacing.pre_details).await;
        let response = match self.gateway.fetch_details(&place.place_id, credential).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(place_id = %place.place_id, error = %err, "details lookup failed");
                return;
            }
        };

        if response.status != PlaceStatus::Ok {
            tracing::debug!(place_id = %place.place_id, status = %response.status, "details not available");
            return;
        }
        let Some(details) = response.result else {
            return;
        };
        let Some(website) = details.website.as_deref().and_then(normalize_website_url) else {
            return;
        };
        if state.excluded.contains(&website) || !state.emitted.insert(website.clone()) {
            return;
        }

        let name = if details.name.is_empty() {
            place.name.clone()
        } else {
            details.name
        };
        tracing::info!(name = %name, website = %website, distance_km, "candidate found");

        state.candidates.push(CandidateSite {
            place_id: place.place_id.clone(),
            name,
            website,
            location: details
                .formatted_address
                .or_else(|| place.vicinity.clone())
                .unwrap_or_default(),
            distance_km,
            rating: details.rating.or(place.rating),
            categories: if details.types.is_empty() {
                place.types.clone()
            } else {
                details.types
            },
        });
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
