//! Caching strategy behaviour against a scripted network.

use std::sync::Arc;

use candgig_test_utils::MockNetwork;
use candgig_worker::{
    CacheKey, CacheStore, InMemoryCacheStore, Request, Response, ResponseSource, StatusCode,
    Strategy, StrategyContext,
};

const STATIC: &str = "candgig-static-v1";
const DYNAMIC: &str = "candgig-dynamic-v1";

fn context(network: MockNetwork) -> StrategyContext<InMemoryCacheStore, MockNetwork> {
    StrategyContext::new(
        Arc::new(InMemoryCacheStore::new()),
        Arc::new(network),
        STATIC,
        DYNAMIC,
    )
}

fn get(url: &str) -> Request {
    Request::parse_get(url).unwrap()
}

fn key(url: &str) -> CacheKey {
    get(url).cache_key().unwrap()
}

// ============================================================================
// CACHE FIRST
// ============================================================================

#[tokio::test]
async fn test_cache_first_fetches_once() {
    let url = "https://b.test/main.css";
    let ctx = context(MockNetwork::new().with_body(url, "body{}"));

    let first = ctx.execute(Strategy::CacheFirst, get(url)).await;
    let second = ctx.execute(Strategy::CacheFirst, get(url)).await;

    assert_eq!(first.source, ResponseSource::Network);
    assert_eq!(second.source, ResponseSource::Cache);
    assert_eq!(second.response.text(), "body{}");
    assert_eq!(ctx.network().calls(url), 1);
    assert_eq!(ctx.store().entry_count(STATIC).await.unwrap(), 1);
}

#[tokio::test]
async fn test_cache_first_serves_from_any_partition() {
    let url = "https://cdn.test/lib.js";
    let ctx = context(MockNetwork::new());
    ctx.store()
        .put(DYNAMIC, key(url), Response::ok("lib"))
        .await
        .unwrap();

    let handled = ctx.execute(Strategy::CacheFirst, get(url)).await;

    assert_eq!(handled.source, ResponseSource::Cache);
    assert_eq!(ctx.network().total_calls(), 0);
}

#[tokio::test]
async fn test_cache_first_does_not_store_errors() {
    let url = "https://b.test/missing.png";
    let ctx = context(MockNetwork::new());

    let handled = ctx.execute(Strategy::CacheFirst, get(url)).await;

    assert_eq!(handled.response.status, StatusCode::NOT_FOUND);
    assert!(ctx.store().lookup_any(&key(url)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_cache_first_offline_miss() {
    let url = "https://b.test/logo.png";
    let network = MockNetwork::new();
    network.set_offline(true);
    let ctx = context(network);

    let handled = ctx.execute(Strategy::CacheFirst, get(url)).await;

    assert_eq!(handled.source, ResponseSource::Offline);
    assert_eq!(handled.response, Response::offline());
}

// ============================================================================
// NETWORK FIRST
// ============================================================================

#[tokio::test]
async fn test_network_first_overwrites_cache() {
    let url = "https://b.test/api/posts";
    let ctx = context(MockNetwork::new().with_body(url, "fresh"));
    ctx.store()
        .put(DYNAMIC, key(url), Response::ok("stale"))
        .await
        .unwrap();

    let handled = ctx.execute(Strategy::NetworkFirst, get(url)).await;

    assert_eq!(handled.source, ResponseSource::Network);
    assert_eq!(handled.response.text(), "fresh");
    let stored = ctx.store().lookup(DYNAMIC, &key(url)).await.unwrap().unwrap();
    assert_eq!(stored.text(), "fresh");
}

#[tokio::test]
async fn test_network_first_falls_back_when_offline() {
    let url = "https://b.test/api/posts";
    let ctx = context(MockNetwork::new().with_body(url, "v1"));

    ctx.execute(Strategy::NetworkFirst, get(url)).await;
    ctx.network().set_offline(true);
    let handled = ctx.execute(Strategy::NetworkFirst, get(url)).await;

    assert_eq!(handled.source, ResponseSource::Cache);
    assert_eq!(handled.response.text(), "v1");
}

#[tokio::test]
async fn test_network_first_falls_back_on_error_status() {
    let url = "https://b.test/ajax/comments";
    let ctx = context(MockNetwork::new().with_body(url, "cached"));
    ctx.execute(Strategy::NetworkFirst, get(url)).await;

    ctx.network()
        .respond(url, Response::new(StatusCode::BAD_GATEWAY, "bad gateway"));
    let handled = ctx.execute(Strategy::NetworkFirst, get(url)).await;

    assert_eq!(handled.source, ResponseSource::Cache);
    assert_eq!(handled.response.text(), "cached");
}

#[tokio::test]
async fn test_network_first_offline_miss() {
    let url = "https://b.test/api/never";
    let network = MockNetwork::new();
    network.fail(url);
    let ctx = context(network);

    let handled = ctx.execute(Strategy::NetworkFirst, get(url)).await;

    assert_eq!(handled.source, ResponseSource::Offline);
    assert_eq!(handled.response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(handled.response.text(), "Offline");
}

// ============================================================================
// STALE WHILE REVALIDATE
// ============================================================================

#[tokio::test]
async fn test_swr_serves_stale_then_fresh() {
    let url = "https://b.test/2024/05/post.html";
    let ctx = context(MockNetwork::new().with_body(url, "new"));
    ctx.store()
        .put(DYNAMIC, key(url), Response::ok("old"))
        .await
        .unwrap();

    let first = ctx.execute(Strategy::StaleWhileRevalidate, get(url)).await;
    assert_eq!(first.source, ResponseSource::Cache);
    assert_eq!(first.response.text(), "old");

    first
        .revalidation
        .expect("cached hit starts a revalidation")
        .settled()
        .await;

    let second = ctx.execute(Strategy::StaleWhileRevalidate, get(url)).await;
    assert_eq!(second.source, ResponseSource::Cache);
    assert_eq!(second.response.text(), "new");
}

#[tokio::test]
async fn test_swr_miss_waits_for_network() {
    let url = "https://b.test/p/about.html";
    let ctx = context(MockNetwork::new().with_body(url, "about"));

    let handled = ctx.execute(Strategy::StaleWhileRevalidate, get(url)).await;

    assert_eq!(handled.source, ResponseSource::Network);
    assert!(handled.revalidation.is_none());
    assert_eq!(handled.response.text(), "about");
    assert!(ctx.store().lookup(DYNAMIC, &key(url)).await.unwrap().is_some());
}

#[tokio::test]
async fn test_swr_ignores_static_partition() {
    let url = "https://b.test/";
    let ctx = context(MockNetwork::new().with_body(url, "home"));
    ctx.store()
        .put(STATIC, key(url), Response::ok("precached"))
        .await
        .unwrap();

    let handled = ctx.execute(Strategy::StaleWhileRevalidate, get(url)).await;

    assert_eq!(handled.source, ResponseSource::Network);
    assert_eq!(handled.response.text(), "home");
}

#[tokio::test]
async fn test_swr_failed_refresh_keeps_stale_copy() {
    let url = "https://b.test/feed.xml";
    let network = MockNetwork::new();
    network.set_offline(true);
    let ctx = context(network);
    ctx.store()
        .put(DYNAMIC, key(url), Response::ok("kept"))
        .await
        .unwrap();

    let first = ctx.execute(Strategy::StaleWhileRevalidate, get(url)).await;
    if let Some(revalidation) = first.revalidation {
        revalidation.settled().await;
    }
    let second = ctx.execute(Strategy::StaleWhileRevalidate, get(url)).await;

    assert_eq!(first.response.text(), "kept");
    assert_eq!(second.response.text(), "kept");
}

#[tokio::test]
async fn test_swr_offline_miss() {
    let url = "https://b.test/search";
    let network = MockNetwork::new();
    network.set_offline(true);
    let ctx = context(network);

    let handled = ctx.execute(Strategy::StaleWhileRevalidate, get(url)).await;

    assert_eq!(handled.response, Response::offline());
}
