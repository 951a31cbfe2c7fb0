//! Request classification.
//!
//! An ordered, total classifier: the first matching rule decides, and every
//! request ends up either passed through or assigned exactly one strategy.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::http::{Method, Request};

static STATIC_ASSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.(css|js|woff2?|ttf|eot)$").expect("static asset pattern"));

static IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.(jpg|jpeg|png|gif|webp|svg|ico)$").expect("image pattern"));

const API_MARKERS: &[&str] = &["/api/", "/ajax/"];

/// Caching strategy applied to an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Serve from any partition, fall back to network, store in static.
    CacheFirst,
    /// Try network, store in dynamic, fall back to any partition.
    NetworkFirst,
    /// Serve from dynamic immediately, refresh it in the background.
    StaleWhileRevalidate,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::CacheFirst => "cache-first",
            Strategy::NetworkFirst => "network-first",
            Strategy::StaleWhileRevalidate => "stale-while-revalidate",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a request is left to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassthroughReason {
    NonGet,
    NonHttp,
    /// The worker is not activated yet.
    Inactive,
}

/// Outcome of classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Passthrough(PassthroughReason),
    Handle(Strategy),
}

/// Classify a request. Rules, first match wins:
///
/// 1. non-GET: passthrough
/// 2. non-HTTP(S) scheme: passthrough
/// 3. style sheet, script or font path: cache-first
/// 4. path containing `/api/` or `/ajax/`: network-first
/// 5. image path: cache-first
/// 6. anything else: stale-while-revalidate
pub fn classify(request: &Request) -> Route {
    if request.method != Method::GET {
        return Route::Passthrough(PassthroughReason::NonGet);
    }
    if !matches!(request.url.scheme(), "http" | "https") {
        return Route::Passthrough(PassthroughReason::NonHttp);
    }

    let path = request.url.path();
    if STATIC_ASSET.is_match(path) {
        Route::Handle(Strategy::CacheFirst)
    } else if API_MARKERS.iter().any(|marker| path.contains(marker)) {
        Route::Handle(Strategy::NetworkFirst)
    } else if IMAGE.is_match(path) {
        Route::Handle(Strategy::CacheFirst)
    } else {
        Route::Handle(Strategy::StaleWhileRevalidate)
    }
}
