//! Request and response model seen by the worker.
//!
//! Responses are fully buffered so they can be cloned into a partition and
//! returned to the page at the same time.

use candgig_core::{CandgigResult, NetworkError};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use url::Url;

pub use reqwest::{Method, StatusCode};

/// An outgoing request intercepted from a page.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Parse an absolute URL into a GET request.
    pub fn parse_get(url: &str) -> CandgigResult<Self> {
        let parsed = Url::parse(url).map_err(|e| NetworkError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::get(parsed))
    }

    /// Identity of this request inside a partition. Only GET requests are
    /// cacheable.
    pub fn cache_key(&self) -> Option<CacheKey> {
        if self.method != Method::GET {
            return None;
        }
        Some(CacheKey::get(&self.url))
    }
}

/// Partition entry key: method plus URL without fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub method: Method,
    pub url: String,
}

impl CacheKey {
    pub fn get(url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self {
            method: Method::GET,
            url: url.into(),
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// A buffered HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// A 200 response with the given body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Synthetic response returned when neither network nor cache can serve.
    pub fn offline() -> Self {
        let mut response = Self::new(StatusCode::SERVICE_UNAVAILABLE, "Offline");
        response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        response
    }

    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.insert(name, HeaderValue::from_static(value));
        self
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_drops_fragment() {
        let a = Request::parse_get("https://b.example.com/post.html#comments").unwrap();
        let b = Request::parse_get("https://b.example.com/post.html").unwrap();
        assert_eq!(a.cache_key(), b.cache_key());
        assert_eq!(
            a.cache_key().unwrap().to_string(),
            "GET https://b.example.com/post.html"
        );
    }

    #[test]
    fn test_cache_key_keeps_query() {
        let a = Request::parse_get("https://b.example.com/ajax/c?id=1").unwrap();
        let b = Request::parse_get("https://b.example.com/ajax/c?id=2").unwrap();
        assert_ne!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_non_get_has_no_cache_key() {
        let url = Url::parse("https://b.example.com/api/vote").unwrap();
        assert!(Request::new(Method::POST, url).cache_key().is_none());
    }

    #[test]
    fn test_offline_response() {
        let response = Response::offline();
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.text(), "Offline");
        assert!(!response.is_success());
        assert_eq!(response.headers.get(CONTENT_TYPE).unwrap(), "text/plain");
    }

    #[test]
    fn test_parse_get_rejects_relative() {
        assert!(Request::parse_get("/assets/css/main.css").is_err());
    }
}
