use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::api::{CatalogClient, Fetch, FetchError};
use crate::pagination::{PageError, PageOutcome, PageState, Paginator};
use crate::render::{RecordingRenderer, RenderEvent};
use crate::session::{LoadMore, Session};
use crate::store::RecordStore;

const BASE: &str = "http://api.test/records";

#[derive(Clone, Default)]
struct FakeApi {
    inner: Arc<FakeInner>,
}

#[derive(Default)]
struct FakeInner {
    responses: Mutex<HashMap<String, Value>>,
    failures: Mutex<HashMap<String, u16>>,
    requests: Mutex<Vec<String>>,
}

impl FakeApi {
    fn insert(&self, url: &str, value: Value) {
        self.inner
            .responses
            .lock()
            .unwrap()
            .insert(url.to_string(), value);
    }

    fn fail(&self, url: &str, status: u16) {
        self.inner
            .failures
            .lock()
            .unwrap()
            .insert(url.to_string(), status);
    }

    fn clear_failure(&self, url: &str) {
        self.inner.failures.lock().unwrap().remove(url);
    }

    fn request_count(&self) -> usize {
        self.inner.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Fetch for FakeApi {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        self.inner.requests.lock().unwrap().push(url.to_string());
        if let Some(status) = self.inner.failures.lock().unwrap().get(url) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
                reason: "simulated failure".to_string(),
            });
        }
        self.inner
            .responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
                reason: "Not Found".to_string(),
            })
    }
}

fn detail_json(id: u32, name: &str, categories: &[String]) -> Value {
    let types: Vec<Value> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| json!({"slot": i + 1, "type": {"name": c, "url": ""}}))
        .collect();
    json!({"id": id, "name": name, "types": types})
}

fn detail_url(name: &str) -> String {
    format!("{BASE}/{name}")
}

fn sample_records(n: u32) -> Vec<(u32, String, Vec<String>)> {
    (1..=n)
        .map(|i| {
            let category = if i % 2 == 0 { "water" } else { "fire" };
            (i, format!("critter{:03}", i), vec![category.to_string()])
        })
        .collect()
}

/// Seeds listing pages at exactly the offsets and clamped limits the
/// paginator will request, plus one detail response per record.
fn seed_catalog(api: &FakeApi, records: &[(u32, String, Vec<String>)], page_size: u32, cap: u32) {
    for (id, name, categories) in records {
        api.insert(&detail_url(name), detail_json(*id, name, categories));
    }
    let mut offset = 0u32;
    while offset < cap {
        let limit = page_size.min(cap - offset);
        let results: Vec<Value> = records
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|(_, name, _)| json!({"name": name, "url": detail_url(name)}))
            .collect();
        api.insert(
            &format!("{BASE}?limit={limit}&offset={offset}"),
            json!({"results": results}),
        );
        offset += limit;
    }
}

fn catalog_client(api: &FakeApi) -> CatalogClient<FakeApi> {
    CatalogClient::new(BASE, api.clone())
}

fn session(api: &FakeApi, page_size: u32, cap: u32) -> Session<FakeApi, RecordingRenderer> {
    Session::new(
        catalog_client(api),
        Paginator::new(page_size, cap),
        RecordingRenderer::default(),
    )
}

#[tokio::test]
async fn pages_append_in_increasing_offset_blocks_up_to_the_cap() {
    let api = FakeApi::default();
    seed_catalog(&api, &sample_records(40), 20, 40);
    let client = catalog_client(&api);
    let mut paginator = Paginator::new(20, 40);
    let mut store = RecordStore::new();

    let first = paginator.load_next_page(&client, &mut store).await.unwrap();
    assert_eq!(first, PageOutcome::Appended(20));
    assert_eq!(store.len(), 20);
    assert_eq!(paginator.state(), PageState::Idle { offset: 20 });

    let second = paginator.load_next_page(&client, &mut store).await.unwrap();
    assert_eq!(second, PageOutcome::Appended(20));
    assert_eq!(store.len(), 40);
    assert!(paginator.is_exhausted());

    let ids: Vec<u32> = store.records().iter().map(|r| r.id).collect();
    let expected: Vec<u32> = (1..=40).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn exhausted_controller_rejects_further_loads_without_refetching() {
    let api = FakeApi::default();
    seed_catalog(&api, &sample_records(40), 20, 40);
    let client = catalog_client(&api);
    let mut paginator = Paginator::new(20, 40);
    let mut store = RecordStore::new();

    paginator.load_next_page(&client, &mut store).await.unwrap();
    paginator.load_next_page(&client, &mut store).await.unwrap();
    assert!(paginator.is_exhausted());

    let before = api.request_count();
    let third = paginator.load_next_page(&client, &mut store).await.unwrap();
    assert_eq!(third, PageOutcome::AlreadyExhausted);
    assert_eq!(store.len(), 40);
    assert_eq!(api.request_count(), before);
}

#[tokio::test]
async fn failing_detail_fetch_rolls_back_the_whole_page() {
    let api = FakeApi::default();
    let records = sample_records(40);
    seed_catalog(&api, &records, 20, 40);
    api.fail(&detail_url("critter005"), 500);

    let client = catalog_client(&api);
    let mut paginator = Paginator::new(20, 40);
    let mut store = RecordStore::new();

    let err = paginator
        .load_next_page(&client, &mut store)
        .await
        .unwrap_err();
    assert!(matches!(err, PageError::Detail { .. }));
    assert!(store.is_empty());
    assert_eq!(paginator.state(), PageState::Idle { offset: 0 });

    // The failure is retryable: once the upstream recovers, the same page
    // loads from the unchanged offset.
    api.clear_failure(&detail_url("critter005"));
    let outcome = paginator.load_next_page(&client, &mut store).await.unwrap();
    assert_eq!(outcome, PageOutcome::Appended(20));
    assert_eq!(paginator.state(), PageState::Idle { offset: 20 });
}

#[tokio::test]
async fn failing_listing_fetch_leaves_the_offset_unchanged() {
    let api = FakeApi::default();
    api.fail(&format!("{BASE}?limit=20&offset=0"), 503);

    let client = catalog_client(&api);
    let mut paginator = Paginator::new(20, 40);
    let mut store = RecordStore::new();

    let err = paginator
        .load_next_page(&client, &mut store)
        .await
        .unwrap_err();
    assert!(matches!(err, PageError::Listing(_)));
    assert!(store.is_empty());
    assert_eq!(paginator.state(), PageState::Idle { offset: 0 });
}

#[tokio::test]
async fn the_last_page_is_clamped_to_the_cap() {
    let api = FakeApi::default();
    seed_catalog(&api, &sample_records(30), 20, 30);
    let client = catalog_client(&api);
    let mut paginator = Paginator::new(20, 30);
    let mut store = RecordStore::new();

    paginator.load_next_page(&client, &mut store).await.unwrap();
    assert_eq!(store.len(), 20);

    let second = paginator.load_next_page(&client, &mut store).await.unwrap();
    assert_eq!(second, PageOutcome::Appended(10));
    assert_eq!(store.len(), 30);
    assert!(paginator.is_exhausted());
    assert_eq!(paginator.offset(), 30);
}

#[tokio::test]
async fn a_short_listing_exhausts_the_controller_early() {
    let api = FakeApi::default();
    // Cap says 40, but the upstream only has 15 records.
    seed_catalog(&api, &sample_records(15), 20, 20);
    let client = catalog_client(&api);
    let mut paginator = Paginator::new(20, 40);
    let mut store = RecordStore::new();

    let outcome = paginator.load_next_page(&client, &mut store).await.unwrap();
    assert_eq!(outcome, PageOutcome::Appended(15));
    assert_eq!(store.len(), 15);
    assert!(paginator.is_exhausted());
    // The offset reflects how far the controller actually got, not the cap.
    assert_eq!(paginator.offset(), 15);
}

#[tokio::test]
async fn search_filters_the_entire_accumulated_store_without_pagination() {
    let api = FakeApi::default();
    seed_catalog(&api, &sample_records(40), 20, 40);
    let mut session = session(&api, 20, 40);

    session.initial_load().await;
    session.load_more().await;
    assert_eq!(session.store().len(), 40);

    let before = api.request_count();
    session.search("critter00").await;
    assert_eq!(api.request_count(), before);

    match session.renderer().events.last().unwrap() {
        RenderEvent::List(records) => {
            // critter001 through critter009 from both loaded pages.
            assert_eq!(records.len(), 9);
            assert!(records.iter().all(|r| r.name.starts_with("critter00")));
        }
        other => panic!("expected a filtered list, got {:?}", other),
    }

    let affordances = session.affordances();
    assert_eq!(affordances.load_more, LoadMore::Hidden);
    assert!(affordances.show_reset);
}

#[tokio::test]
async fn category_filter_is_reconciled_against_the_whole_store() {
    let api = FakeApi::default();
    seed_catalog(&api, &sample_records(40), 20, 40);
    let mut session = session(&api, 20, 40);

    session.initial_load().await;
    session.set_category(Some("water".to_string()));

    match session.renderer().events.last().unwrap() {
        RenderEvent::List(records) => {
            assert_eq!(records.len(), 10);
            assert!(records.iter().all(|r| r.id % 2 == 0));
        }
        other => panic!("expected a filtered list, got {:?}", other),
    }
}

#[tokio::test]
async fn search_on_an_empty_store_does_a_direct_lookup() {
    let api = FakeApi::default();
    api.insert(
        &detail_url("pikachu"),
        detail_json(25, "pikachu", &["electric".to_string()]),
    );
    let mut session = session(&api, 20, 40);

    // Mixed case from the user; the lookup URL is lower-cased.
    session.search("Pikachu").await;

    match session.renderer().events.last().unwrap() {
        RenderEvent::Detail(record) => {
            assert_eq!(record.id, 25);
            assert_eq!(record.categories, vec!["electric".to_string()]);
        }
        other => panic!("expected a detail view, got {:?}", other),
    }
    assert!(session.criteria().is_active());
}

#[tokio::test]
async fn search_for_an_unknown_identifier_renders_not_found() {
    let api = FakeApi::default();
    let mut session = session(&api, 20, 40);

    session.search("missingno").await;

    match session.renderer().events.last().unwrap() {
        RenderEvent::Empty(message) => assert!(message.contains("missingno")),
        other => panic!("expected a not-found state, got {:?}", other),
    }
}

#[tokio::test]
async fn load_more_is_rejected_while_a_filter_is_active() {
    let api = FakeApi::default();
    seed_catalog(&api, &sample_records(40), 20, 40);
    let mut session = session(&api, 20, 40);

    session.initial_load().await;
    session.search("critter001").await;

    let before = api.request_count();
    session.load_more().await;

    assert_eq!(session.store().len(), 20);
    assert_eq!(api.request_count(), before);
    assert!(matches!(
        session.renderer().events.last().unwrap(),
        RenderEvent::Error(_)
    ));
}

#[tokio::test]
async fn a_failed_page_load_keeps_accumulated_data_and_offers_retry() {
    let api = FakeApi::default();
    seed_catalog(&api, &sample_records(40), 20, 40);
    let mut session = session(&api, 20, 40);

    session.initial_load().await;
    assert_eq!(session.store().len(), 20);

    api.fail(&format!("{BASE}?limit=20&offset=20"), 500);
    session.load_more().await;

    assert_eq!(session.store().len(), 20);
    assert_eq!(session.paginator().offset(), 20);
    assert_eq!(session.affordances().load_more, LoadMore::Retry);

    api.clear_failure(&format!("{BASE}?limit=20&offset=20"));
    session.load_more().await;
    assert_eq!(session.store().len(), 40);
    assert_eq!(session.affordances().load_more, LoadMore::Hidden);
}

#[tokio::test]
async fn reset_restores_browsing_and_reloads_from_the_warm_cache() {
    let api = FakeApi::default();
    seed_catalog(&api, &sample_records(40), 20, 40);
    let mut session = session(&api, 20, 40);

    session.initial_load().await;
    session.search("critter01").await;
    assert!(session.criteria().is_active());

    let before = api.request_count();
    session.reset().await;

    // The first page is served entirely from the memoized cache.
    assert_eq!(api.request_count(), before);
    assert_eq!(session.store().len(), 20);
    assert_eq!(session.paginator().state(), PageState::Idle { offset: 20 });
    assert!(!session.criteria().is_active());

    let affordances = session.affordances();
    assert_eq!(affordances.load_more, LoadMore::Ready);
    assert!(!affordances.show_reset);
}

#[tokio::test]
async fn detail_view_is_available_on_demand() {
    let api = FakeApi::default();
    api.insert(
        &detail_url("42"),
        detail_json(42, "wigglytuff", &["fairy".to_string()]),
    );
    let mut session = session(&api, 20, 40);

    session.show_detail("42").await;

    match session.renderer().events.last().unwrap() {
        RenderEvent::Detail(record) => assert_eq!(record.name, "wigglytuff"),
        other => panic!("expected a detail view, got {:?}", other),
    }
}
