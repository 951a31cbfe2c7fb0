//! CandGig Test Utilities
//!
//! Shared test infrastructure for the CandGig workspace:
//! - Scriptable mock network, host and post feed
//! - Proptest generators for menu input
//! - Fixtures for common scenarios

pub use candgig_core::{CandgigError, CandgigResult, NetworkError, ThemeConfig, WorkerConfig};
pub use candgig_menu::{FeedQuery, MenuEntry, PostFeed, PostSummary, RawLink};
pub use candgig_worker::{
    ClientHost, InMemoryCacheStore, Network, Notification, Request, Response, StatusCode,
};

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

fn locked<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

// ============================================================================
// MOCK NETWORK
// ============================================================================

/// Scriptable [`Network`].
///
/// Responses are keyed by full URL. Unscripted URLs answer 404. URLs marked
/// as failing (or every URL, once offline) produce a transport error.
#[derive(Debug, Default)]
pub struct MockNetwork {
    responses: Mutex<HashMap<String, Response>>,
    failing: Mutex<HashSet<String>>,
    offline: Mutex<bool>,
    calls: Mutex<HashMap<String, usize>>,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a 200 response with `body` for `url`.
    pub fn with_body(self, url: &str, body: &str) -> Self {
        self.respond(url, Response::ok(body.as_bytes().to_vec()));
        self
    }

    pub fn with_response(self, url: &str, response: Response) -> Self {
        self.respond(url, response);
        self
    }

    /// Replace the scripted response for `url`.
    pub fn respond(&self, url: &str, response: Response) {
        locked(&self.responses).insert(url.to_string(), response);
    }

    pub fn set_body(&self, url: &str, body: &str) {
        self.respond(url, Response::ok(body.as_bytes().to_vec()));
    }

    /// Make fetches of `url` fail with a transport error.
    pub fn fail(&self, url: &str) {
        locked(&self.failing).insert(url.to_string());
    }

    pub fn set_offline(&self, offline: bool) {
        *locked(&self.offline) = offline;
    }

    /// Number of fetches issued for `url`.
    pub fn calls(&self, url: &str) -> usize {
        locked(&self.calls).get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        locked(&self.calls).values().sum()
    }
}

#[async_trait]
impl Network for MockNetwork {
    async fn fetch(&self, request: &Request) -> CandgigResult<Response> {
        let url = request.url.to_string();
        *locked(&self.calls).entry(url.clone()).or_insert(0) += 1;

        if *locked(&self.offline) || locked(&self.failing).contains(&url) {
            return Err(NetworkError::Unreachable {
                url,
                reason: "mock network failure".to_string(),
            }
            .into());
        }

        Ok(locked(&self.responses)
            .get(&url)
            .cloned()
            .unwrap_or_else(|| Response::new(StatusCode::NOT_FOUND, b"Not Found".to_vec())))
    }
}

// ============================================================================
// MOCK HOST
// ============================================================================

/// [`ClientHost`] that records every call.
#[derive(Debug, Default)]
pub struct RecordingHost {
    open_clients: Mutex<HashSet<String>>,
    claims: Mutex<usize>,
    shown: Mutex<Vec<Notification>>,
    closed: Mutex<Vec<Notification>>,
    focused: Mutex<Vec<String>>,
    opened: Mutex<Vec<String>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend a client page is open at `url`.
    pub fn with_open_client(self, url: &str) -> Self {
        locked(&self.open_clients).insert(url.to_string());
        self
    }

    pub fn claims(&self) -> usize {
        *locked(&self.claims)
    }

    pub fn shown(&self) -> Vec<Notification> {
        locked(&self.shown).clone()
    }

    pub fn closed(&self) -> Vec<Notification> {
        locked(&self.closed).clone()
    }

    pub fn focused(&self) -> Vec<String> {
        locked(&self.focused).clone()
    }

    pub fn opened(&self) -> Vec<String> {
        locked(&self.opened).clone()
    }
}

#[async_trait]
impl ClientHost for RecordingHost {
    async fn claim_clients(&self) -> CandgigResult<usize> {
        *locked(&self.claims) += 1;
        Ok(locked(&self.open_clients).len())
    }

    async fn show_notification(&self, notification: &Notification) -> CandgigResult<()> {
        locked(&self.shown).push(notification.clone());
        Ok(())
    }

    async fn close_notification(&self, notification: &Notification) -> CandgigResult<()> {
        locked(&self.closed).push(notification.clone());
        Ok(())
    }

    async fn focus_client(&self, url: &str) -> CandgigResult<bool> {
        if locked(&self.open_clients).contains(url) {
            locked(&self.focused).push(url.to_string());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn open_window(&self, url: &str) -> CandgigResult<()> {
        locked(&self.opened).push(url.to_string());
        locked(&self.open_clients).insert(url.to_string());
        Ok(())
    }
}

// ============================================================================
// MOCK POST FEED
// ============================================================================

/// [`PostFeed`] serving canned posts per label.
#[derive(Debug, Default)]
pub struct MockPostFeed {
    posts: HashMap<String, Vec<PostSummary>>,
    failing: HashSet<String>,
    queries: Mutex<Vec<FeedQuery>>,
}

impl MockPostFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(mut self, label: &str, posts: Vec<PostSummary>) -> Self {
        self.posts.insert(label.to_string(), posts);
        self
    }

    /// Make queries for `label` fail.
    pub fn with_failure(mut self, label: &str) -> Self {
        self.failing.insert(label.to_string());
        self
    }

    pub fn queries(&self) -> Vec<FeedQuery> {
        locked(&self.queries).clone()
    }
}

#[async_trait]
impl PostFeed for MockPostFeed {
    async fn recent_posts(&self, query: &FeedQuery) -> CandgigResult<Vec<PostSummary>> {
        locked(&self.queries).push(query.clone());
        let label = query.label.clone().unwrap_or_default();

        if self.failing.contains(&label) {
            return Err(candgig_core::FeedError::RequestFailed {
                label,
                status: 500,
                message: "mock feed failure".to_string(),
            }
            .into());
        }

        let mut posts = self.posts.get(&label).cloned().unwrap_or_default();
        posts.truncate(query.count as usize);
        Ok(posts)
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating menu input.

    use super::*;
    use candgig_menu::Depth;
    use proptest::prelude::*;

    /// Generate a label body with no leading marker or surrounding spaces.
    pub fn arb_label() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9 ]{0,14}[A-Za-z0-9]".prop_map(|s| s.to_string())
    }

    /// Generate a site-relative href.
    pub fn arb_href() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("/".to_string()),
            "[a-z]{1,10}".prop_map(|p| format!("/p/{}.html", p)),
            "[a-z]{1,10}".prop_map(|p| format!("/search/label/{}", p)),
        ]
    }

    /// Generate an authored link with 0..=4 leading `_` markers.
    pub fn arb_raw_link() -> impl Strategy<Value = RawLink> {
        (0usize..=4, arb_label(), arb_href())
            .prop_map(|(markers, label, href)| RawLink::new(format!("{}{}", "_".repeat(markers), label), href))
    }

    /// Generate a parsed entry; marker counts above two clamp to nested.
    pub fn arb_menu_entry() -> impl Strategy<Value = MenuEntry> {
        (0usize..=4, arb_label(), arb_href()).prop_map(|(markers, label, href)| MenuEntry {
            raw_label: format!("{}{}", "_".repeat(markers), label),
            marker_count: markers,
            depth: Depth::from_marker_count(markers),
            label,
            href,
        })
    }

    /// Generate a flat menu of up to `max_len` entries.
    pub fn arb_flat_menu(max_len: usize) -> impl Strategy<Value = Vec<MenuEntry>> {
        prop::collection::vec(arb_menu_entry(), 0..=max_len)
    }

    /// Generate a menu with no orphans: it starts at the top level and each
    /// entry is at most one level deeper than the one before it.
    pub fn arb_well_formed_menu(max_len: usize) -> impl Strategy<Value = Vec<MenuEntry>> {
        prop::collection::vec((0usize..=4, arb_label(), arb_href()), 1..=max_len).prop_map(
            |rows| {
                let mut previous: Option<usize> = None;
                rows.into_iter()
                    .map(|(markers, label, href)| {
                        let limit = previous.map_or(0, |level| level + 1);
                        let markers = if Depth::from_marker_count(markers).level() > limit {
                            limit
                        } else {
                            markers
                        };
                        let depth = Depth::from_marker_count(markers);
                        previous = Some(depth.level());
                        MenuEntry {
                            raw_label: format!("{}{}", "_".repeat(markers), label),
                            marker_count: markers,
                            depth,
                            label,
                            href,
                        }
                    })
                    .collect()
            },
        )
    }

    /// Generate authored links, some of them malformed.
    pub fn arb_raw_menu(max_len: usize) -> impl Strategy<Value = Vec<RawLink>> {
        let link = prop_oneof![
            8 => arb_raw_link(),
            1 => Just(RawLink::new("__", "/")),
            1 => arb_label().prop_map(|label| RawLink { label, href: None }),
        ];
        prop::collection::vec(link, 0..=max_len)
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built fixtures for common testing scenarios.

    use super::*;
    use chrono::{DateTime, FixedOffset};

    pub const ORIGIN: &str = "https://candgig.test";

    /// The authored main menu used throughout the docs.
    pub fn sample_menu() -> Vec<RawLink> {
        vec![
            RawLink::new("Home", "/"),
            RawLink::new("_About", "/p/about.html"),
            RawLink::new("Docs", "/p/docs.html"),
            RawLink::new("_Guide", "/p/guide.html"),
            RawLink::new("__Advanced", "/p/advanced.html"),
            RawLink::new("Tech", "Technology/mega-menu"),
        ]
    }

    /// Worker configuration with a tiny manifest rooted at [`ORIGIN`].
    pub fn worker_config() -> WorkerConfig {
        WorkerConfig::default()
            .with_origin(ORIGIN)
            .with_version("v1")
            .with_static_manifest(vec!["/".to_string(), "/offline.html".to_string()])
            .with_dynamic_manifest(vec!["https://cdn.test/lib.css".to_string()])
    }

    /// Every URL [`worker_config`] precaches.
    pub fn manifest_urls() -> Vec<String> {
        vec![
            format!("{}/", ORIGIN),
            format!("{}/offline.html", ORIGIN),
            "https://cdn.test/lib.css".to_string(),
        ]
    }

    /// A network that serves every manifest URL.
    pub fn manifest_network() -> MockNetwork {
        manifest_urls()
            .iter()
            .fold(MockNetwork::new(), |network, url| network.with_body(url, url))
    }

    pub fn post(title: &str, label: &str) -> PostSummary {
        PostSummary {
            title: title.to_string(),
            link: format!("{}/{}.html", ORIGIN, title.to_lowercase().replace(' ', "-")),
            image: None,
            label: Some(label.to_string()),
            author: Some("CandGig".to_string()),
            published: DateTime::<FixedOffset>::parse_from_rfc3339("2024-05-01T10:00:00+07:00").ok(),
        }
    }
}
