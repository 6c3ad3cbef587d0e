//! Discovery orchestration against a scripted in-memory gateway.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use pagepulse_core::{Coordinates, DiscoveryProfile};
use pagepulse_places::{
    Discovery, DiscoveryError, DiscoveryLimits, DiscoveryProgress, NearbyQuery,
    NearbySearchResponse, PacingPolicy, PlaceDetailsResponse, PlacesError, PlacesGateway,
};
use serde_json::{json, Value};

const ORIGIN: Coordinates = Coordinates::new(50.3669, 3.0803);

type PageKey = (String, u32, Option<String>);

enum Scripted<T> {
    Respond(T),
    Fail,
}

#[derive(Default)]
struct ScriptedGateway {
    pages: HashMap<PageKey, Scripted<NearbySearchResponse>>,
    details: HashMap<String, Scripted<PlaceDetailsResponse>>,
    searches: Mutex<Vec<PageKey>>,
    lookups: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    fn page(mut self, category: &str, radius_km: u32, token: Option<&str>, page: Value) -> Self {
        self.pages.insert(
            (category.to_string(), radius_km * 1000, token.map(str::to_string)),
            Scripted::Respond(serde_json::from_value(page).unwrap()),
        );
        self
    }

    fn failing_page(mut self, category: &str, radius_km: u32) -> Self {
        self.pages.insert(
            (category.to_string(), radius_km * 1000, None),
            Scripted::Fail,
        );
        self
    }

    fn website(mut self, place_id: &str, name: &str, website: &str) -> Self {
        self.details.insert(
            place_id.to_string(),
            Scripted::Respond(
                serde_json::from_value(json!({
                    "status": "OK",
                    "result": {
                        "place_id": place_id,
                        "name": name,
                        "website": website,
                        "formatted_address": format!("{name}, Douai, France"),
                        "rating": 4.0,
                        "types": ["point_of_interest"]
                    }
                }))
                .unwrap(),
            ),
        );
        self
    }

    fn no_website(mut self, place_id: &str) -> Self {
        self.details.insert(
            place_id.to_string(),
            Scripted::Respond(
                serde_json::from_value(json!({
                    "status": "OK",
                    "result": { "place_id": place_id, "name": "No Site" }
                }))
                .unwrap(),
            ),
        );
        self
    }

    fn failing_details(mut self, place_id: &str) -> Self {
        self.details.insert(place_id.to_string(), Scripted::Fail);
        self
    }

    fn searches(&self) -> Vec<PageKey> {
        self.searches.lock().unwrap().clone()
    }

    fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

fn scripted_failure() -> PlacesError {
    PlacesError::Deserialize {
        context: "scripted".to_string(),
        source: serde_json::from_str::<Value>("{").unwrap_err(),
    }
}

#[async_trait]
impl PlacesGateway for ScriptedGateway {
    async fn search_nearby(
        &self,
        query: &NearbyQuery<'_>,
        _credential: &str,
    ) -> Result<NearbySearchResponse, PlacesError> {
        let key = (
            query.category.to_string(),
            query.radius_m,
            query.page_token.map(str::to_string),
        );
        self.searches.lock().unwrap().push(key.clone());
        match self.pages.get(&key) {
            Some(Scripted::Respond(page)) => Ok(page.clone()),
            Some(Scripted::Fail) => Err(scripted_failure()),
            None => Ok(serde_json::from_value(json!({ "status": "ZERO_RESULTS" })).unwrap()),
        }
    }

    async fn fetch_details(
        &self,
        place_id: &str,
        _credential: &str,
    ) -> Result<PlaceDetailsResponse, PlacesError> {
        self.lookups.lock().unwrap().push(place_id.to_string());
        match self.details.get(place_id) {
            Some(Scripted::Respond(details)) => Ok(details.clone()),
            Some(Scripted::Fail) => Err(scripted_failure()),
            None => Ok(serde_json::from_value(json!({ "status": "NOT_FOUND" })).unwrap()),
        }
    }
}

fn place(id: &str, lat: f64, lng: f64) -> Value {
    json!({
        "place_id": id,
        "name": id,
        "geometry": { "location": { "lat": lat, "lng": lng } },
        "types": ["establishment"]
    })
}

fn ok_page(places: Vec<Value>, next_page_token: Option<&str>) -> Value {
    json!({
        "status": "OK",
        "results": places,
        "next_page_token": next_page_token
    })
}

fn profile(categories: &[&str]) -> DiscoveryProfile {
    DiscoveryProfile {
        label: "test".to_string(),
        origin: ORIGIN,
        categories: categories.iter().map(ToString::to_string).collect(),
    }
}

fn single_tier() -> DiscoveryLimits {
    DiscoveryLimits {
        min_radius_km: 5,
        max_radius_km: 5,
        ..DiscoveryLimits::default()
    }
}

fn two_tiers() -> DiscoveryLimits {
    DiscoveryLimits {
        min_radius_km: 5,
        max_radius_km: 10,
        ..DiscoveryLimits::default()
    }
}

async fn discover(
    gateway: &ScriptedGateway,
    categories: &[&str],
    limits: DiscoveryLimits,
    exclude: &HashSet<String>,
) -> Result<Vec<pagepulse_places::CandidateSite>, DiscoveryError> {
    Discovery::new(gateway, profile(categories))
        .limits(limits)
        .pacing(PacingPolicy::none())
        .run("test-key", exclude)
        .await
}

#[tokio::test]
async fn collects_sorted_candidates_with_normalized_websites() {
    let gateway = ScriptedGateway::default()
        .page(
            "bakery",
            5,
            None,
            ok_page(
                vec![
                    place("far", 50.3669, 3.1803),
                    place("near", 50.3669, 3.0803),
                    place("nosite", 50.37, 3.08),
                ],
                None,
            ),
        )
        .website("far", "Far Bakery", "example-far.fr")
        .website("near", "Near Bakery", "https://near.test")
        .no_website("nosite");

    let found = discover(&gateway, &["bakery"], single_tier(), &HashSet::new())
        .await
        .unwrap();

    assert_eq!(found.len(), 2);
    assert_eq!(found[0].name, "Near Bakery");
    assert_eq!(found[0].website, "https://near.test/");
    assert!(found[0].distance_km.abs() < 1e-9);
    assert_eq!(found[1].website, "https://example-far.fr/");
    assert!((found[1].distance_km - 7.1).abs() < 1e-9, "{}", found[1].distance_km);
    assert_eq!(found[1].location, "Far Bakery, Douai, France");
    assert_eq!(found[1].rating, Some(4.0));
    assert_eq!(found[1].categories, vec!["point_of_interest"]);
    assert_eq!(gateway.lookups().len(), 3);
}

#[tokio::test]
async fn seen_places_are_looked_up_once() {
    let shared = || ok_page(vec![place("shared", 50.37, 3.08)], None);
    let gateway = ScriptedGateway::default()
        .page("bakery", 5, None, shared())
        .page("florist", 5, None, shared())
        .page("bakery", 10, None, shared())
        .page("florist", 10, None, shared())
        .website("shared", "Shared", "https://shared.test");

    let found = discover(&gateway, &["bakery", "florist"], two_tiers(), &HashSet::new())
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(gateway.lookups(), vec!["shared"]);
    assert_eq!(gateway.searches().len(), 4);
}

#[tokio::test]
async fn excluded_urls_are_skipped_after_normalization() {
    let gateway = ScriptedGateway::default()
        .page(
            "bakery",
            5,
            None,
            ok_page(
                vec![place("old", 50.37, 3.08), place("new", 50.37, 3.09)],
                None,
            ),
        )
        .website("old", "Old", "already-seen.test")
        .website("new", "New", "https://fresh.test/");

    let exclude: HashSet<String> = ["https://already-seen.test".to_string()].into();
    let found = discover(&gateway, &["bakery"], single_tier(), &exclude)
        .await
        .unwrap();

    let websites: Vec<&str> = found.iter().map(|c| c.website.as_str()).collect();
    assert_eq!(websites, vec!["https://fresh.test/"]);
}

#[tokio::test]
async fn shared_websites_are_emitted_once() {
    let gateway = ScriptedGateway::default()
        .page(
            "bakery",
            5,
            None,
            ok_page(
                vec![place("branch-a", 50.37, 3.08), place("branch-b", 50.38, 3.08)],
                None,
            ),
        )
        .website("branch-a", "Chain A", "https://chain.test")
        .website("branch-b", "Chain B", "chain.test");

    let found = discover(&gateway, &["bakery"], single_tier(), &HashSet::new())
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].place_id, "branch-a");
}

#[tokio::test]
async fn stops_at_result_cap() {
    let places: Vec<Value> = (0..5)
        .map(|i| place(&format!("p{i}"), 50.37, 3.08 + f64::from(i) * 0.01))
        .collect();
    let mut gateway = ScriptedGateway::default().page("bakery", 5, None, ok_page(places, None));
    for i in 0..5 {
        gateway = gateway.website(&format!("p{i}"), "Shop", &format!("https://shop{i}.test"));
    }

    let found = discover(
        &gateway,
        &["bakery", "florist"],
        DiscoveryLimits::default().with_max_results(2),
        &HashSet::new(),
    )
    .await
    .unwrap();

    assert_eq!(found.len(), 2);
    assert_eq!(gateway.lookups(), vec!["p0", "p1"]);
    assert_eq!(gateway.searches().len(), 1, "no search after the cap is reached");
}

#[tokio::test]
async fn pages_at_most_three_times_per_category() {
    let gateway = ScriptedGateway::default()
        .page("bakery", 5, None, ok_page(vec![], Some("t1")))
        .page("bakery", 5, Some("t1"), ok_page(vec![], Some("t2")))
        .page("bakery", 5, Some("t2"), ok_page(vec![], Some("t3")))
        .page("bakery", 5, Some("t3"), ok_page(vec![], None));

    discover(&gateway, &["bakery"], single_tier(), &HashSet::new())
        .await
        .unwrap();

    let tokens: Vec<Option<String>> = gateway.searches().into_iter().map(|(_, _, t)| t).collect();
    assert_eq!(
        tokens,
        vec![None, Some("t1".to_string()), Some("t2".to_string())]
    );
}

#[tokio::test]
async fn widens_radius_tier_by_tier() {
    let gateway = ScriptedGateway::default();

    discover(&gateway, &["bakery"], DiscoveryLimits::default(), &HashSet::new())
        .await
        .unwrap();

    let radii: Vec<u32> = gateway.searches().into_iter().map(|(_, r, _)| r).collect();
    assert_eq!(radii, vec![5000, 10000, 15000, 20000, 25000, 30000]);
}

#[tokio::test]
async fn first_search_rejection_is_fatal() {
    let gateway = ScriptedGateway::default().page(
        "bakery",
        5,
        None,
        json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid.",
            "results": []
        }),
    );

    let err = discover(&gateway, &["bakery", "florist"], single_tier(), &HashSet::new())
        .await
        .unwrap_err();

    match err {
        DiscoveryError::Rejected {
            category,
            status,
            message,
        } => {
            assert_eq!(category, "bakery");
            assert_eq!(status, "REQUEST_DENIED");
            assert_eq!(message.as_deref(), Some("The provided API key is invalid."));
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
    assert_eq!(gateway.searches().len(), 1);
}

#[tokio::test]
async fn first_search_transport_failure_is_fatal() {
    let gateway = ScriptedGateway::default().failing_page("bakery", 5);

    let err = discover(&gateway, &["bakery"], single_tier(), &HashSet::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DiscoveryError::Gateway { ref category, .. } if category == "bakery"));
}

#[tokio::test]
async fn later_failures_skip_only_their_category() {
    let gateway = ScriptedGateway::default()
        .page("bakery", 5, None, ok_page(vec![place("a", 50.37, 3.08)], None))
        .failing_page("florist", 5)
        .page(
            "pharmacy",
            5,
            None,
            json!({ "status": "OVER_QUERY_LIMIT", "results": [] }),
        )
        .page("gym", 5, None, ok_page(vec![place("b", 50.37, 3.09)], None))
        .website("a", "A", "https://a.test")
        .website("b", "B", "https://b.test");

    let found = discover(
        &gateway,
        &["bakery", "florist", "pharmacy", "gym"],
        single_tier(),
        &HashSet::new(),
    )
    .await
    .unwrap();

    assert_eq!(found.len(), 2);
    assert_eq!(gateway.searches().len(), 4);
}

#[tokio::test]
async fn details_failure_skips_only_that_place() {
    let gateway = ScriptedGateway::default()
        .page(
            "bakery",
            5,
            None,
            ok_page(vec![place("broken", 50.37, 3.08), place("fine", 50.37, 3.09)], None),
        )
        .failing_details("broken")
        .website("fine", "Fine", "https://fine.test");

    let found = discover(&gateway, &["bakery"], single_tier(), &HashSet::new())
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].place_id, "fine");
}

#[tokio::test]
async fn reports_progress_per_category_and_tier() {
    let gateway = ScriptedGateway::default()
        .page("bakery", 5, None, ok_page(vec![place("a", 50.37, 3.08)], None))
        .website("a", "A", "https://a.test");

    let mut events: Vec<DiscoveryProgress> = Vec::new();
    Discovery::new(&gateway, profile(&["bakery", "florist"]))
        .limits(two_tiers())
        .pacing(PacingPolicy::none())
        .on_progress(|p| events.push(p.clone()))
        .run("test-key", &HashSet::new())
        .await
        .unwrap();

    let seen: Vec<(usize, usize, &str)> = events
        .iter()
        .map(|p| (p.current, p.total, p.label.as_str()))
        .collect();
    assert_eq!(
        seen,
        vec![
            (0, 50, "bakery (5km)"),
            (1, 50, "florist (5km)"),
            (1, 50, "bakery (10km)"),
            (1, 50, "florist (10km)"),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn default_pacing_spaces_out_requests() {
    let gateway = ScriptedGateway::default()
        .page(
            "bakery",
            5,
            None,
            ok_page(vec![place("a", 50.37, 3.08)], Some("t1")),
        )
        .page("bakery", 5, Some("t1"), ok_page(vec![], None))
        .website("a", "A", "https://a.test");

    let started = tokio::time::Instant::now();
    Discovery::new(&gateway, profile(&["bakery", "florist"]))
        .limits(single_tier())
        .run("test-key", &HashSet::new())
        .await
        .unwrap();
    let elapsed = started.elapsed();

    // details 100ms + token activation 2s + second page 2s + next category 2s
    assert!(elapsed >= Duration::from_millis(6100), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(6200), "{elapsed:?}");
}
