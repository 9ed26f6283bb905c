//! Detail fetcher against a mocked VVIC API.

mod common;

use std::sync::Arc;

use common::{MemoryQueue, MemoryStaging};
use serde_json::json;
use vvic_client::VvicClient;
use vvic_core::DETAIL_QUEUE;
use vvic_sync::{run_worker, DetailFetcher, DetailHandler, FetchOutcome, WorkerOptions};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DETAIL_PATH: &str = "/api/item/detail/v1";

fn client(server: &MockServer) -> VvicClient {
    VvicClient::with_endpoint(
        "app-1",
        "secret-1",
        "en",
        5,
        &format!("{}{DETAIL_PATH}", server.uri()),
    )
    .unwrap()
}

#[tokio::test]
async fn found_items_are_staged_by_their_own_item_vid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DETAIL_PATH))
        .and(query_param("item_vid", "v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "data": { "item_list": [
                { "item_vid": "v1", "weight_type": 1 },
                { "item_vid": 42, "weight_type": 2 },
                { "weight_type": 3 }
            ]}
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let staging = Arc::new(MemoryStaging::default());
    let fetcher = DetailFetcher::new(client(&server), staging.clone(), dir.path().join("f.log"));

    let outcome = fetcher.fetch("v1").await.unwrap();

    assert_eq!(outcome, FetchOutcome::Staged(2));
    assert_eq!(staging.len(), 2);
    assert_eq!(staging.get("42").unwrap()["weight_type"], 2);
    assert!(!fetcher.failure_log().exists());
}

#[tokio::test]
async fn restaging_overwrites_the_previous_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DETAIL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "data": { "item_list": [{ "item_vid": "v1", "weight_type": 5 }] }
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let staging = Arc::new(MemoryStaging::with(&[json!({ "item_vid": "v1", "weight_type": 1 })]));
    let fetcher = DetailFetcher::new(client(&server), staging.clone(), dir.path().join("f.log"));

    fetcher.fetch("v1").await.unwrap();

    assert_eq!(staging.len(), 1);
    assert_eq!(staging.get("v1").unwrap()["weight_type"], 5);
}

#[tokio::test]
async fn rejected_requests_go_to_the_failure_log() {
    let server = MockServer::start().await;
    let body = r#"{"status":4003,"message":"sign error"}"#;
    Mock::given(method("GET"))
        .and(path(DETAIL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("failed.log");
    let staging = Arc::new(MemoryStaging::default());
    let fetcher = DetailFetcher::new(client(&server), staging.clone(), &log);

    assert_eq!(fetcher.fetch("v9").await.unwrap(), FetchOutcome::Rejected);
    assert_eq!(fetcher.fetch("v10").await.unwrap(), FetchOutcome::Rejected);

    assert_eq!(staging.len(), 0);
    let contents = std::fs::read_to_string(&log).unwrap();
    assert_eq!(contents, format!("v9\n{body}\nv10\n{body}\n"));
}

#[tokio::test]
async fn detail_worker_requeues_on_http_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DETAIL_PATH))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let staging = Arc::new(MemoryStaging::default());
    let fetcher = DetailFetcher::new(client(&server), staging, dir.path().join("f.log"));
    let mut handler = DetailHandler::new(fetcher);

    let queue = MemoryQueue::default();
    queue.push_raw(DETAIL_QUEUE, r#"{"item_vid":"v1"}"#);

    let stats = run_worker(
        &queue,
        DETAIL_QUEUE,
        &mut handler,
        WorkerOptions {
            drain: true,
            ..WorkerOptions::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(stats.failed, 1);
    assert_eq!(queue.state.lock().unwrap().rejected.len(), 1);
}
