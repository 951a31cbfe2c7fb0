//! Configuration types
//!
//! Both configs load from `CANDGIG_*` environment variables layered over
//! defaults that mirror the published theme.

use crate::{CandgigResult, ConfigError};
use serde::{Deserialize, Serialize};
use url::Url;

// ============================================================================
// THEME CONFIGURATION
// ============================================================================

/// Settings consumed by the menu builder and the post feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Number of posts requested for a category listing or mega menu.
    pub post_per_page: u32,
    /// Leading character encoding nesting depth in menu labels.
    pub marker: char,
    /// Path segment that turns a menu link into a mega menu.
    pub mega_menu_token: String,
    /// Path prefix of category listing pages.
    pub label_path: String,
    /// Blog origin serving the JSON post feed.
    pub feed_base_url: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            post_per_page: 8,
            marker: '_',
            mega_menu_token: "mega-menu".to_string(),
            label_path: "/search/label/".to_string(),
            feed_base_url: "https://candgig.blogspot.com".to_string(),
        }
    }
}

impl ThemeConfig {
    /// Create a theme config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of posts per page.
    pub fn with_post_per_page(mut self, count: u32) -> Self {
        self.post_per_page = count;
        self
    }

    /// Set the depth marker character.
    pub fn with_marker(mut self, marker: char) -> Self {
        self.marker = marker;
        self
    }

    /// Set the mega menu token.
    pub fn with_mega_menu_token(mut self, token: impl Into<String>) -> Self {
        self.mega_menu_token = token.into();
        self
    }

    /// Set the feed base URL.
    pub fn with_feed_base_url(mut self, url: impl Into<String>) -> Self {
        self.feed_base_url = url.into();
        self
    }

    /// Create ThemeConfig from environment variables.
    ///
    /// Environment variables:
    /// - `CANDGIG_POST_PER_PAGE`: posts per listing (default: 8)
    /// - `CANDGIG_MENU_MARKER`: depth marker character (default: `_`)
    /// - `CANDGIG_MEGA_MENU_TOKEN`: mega menu path token (default: `mega-menu`)
    /// - `CANDGIG_LABEL_PATH`: category listing path (default: `/search/label/`)
    /// - `CANDGIG_FEED_BASE_URL`: blog origin for the JSON feed
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let post_per_page = lookup("CANDGIG_POST_PER_PAGE")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.post_per_page);

        let marker = lookup("CANDGIG_MENU_MARKER")
            .and_then(|s| s.trim().chars().next())
            .unwrap_or(defaults.marker);

        Self {
            post_per_page,
            marker,
            mega_menu_token: lookup("CANDGIG_MEGA_MENU_TOKEN")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.mega_menu_token),
            label_path: lookup("CANDGIG_LABEL_PATH")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.label_path),
            feed_base_url: lookup("CANDGIG_FEED_BASE_URL")
                .map(|s| s.trim().trim_end_matches('/').to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.feed_base_url),
        }
    }

    /// Check that every field holds a usable value.
    pub fn validate(&self) -> CandgigResult<()> {
        if self.post_per_page == 0 {
            return Err(invalid("post_per_page", "0", "must be positive"));
        }
        if self.marker.is_alphanumeric() || self.marker.is_whitespace() {
            return Err(invalid(
                "marker",
                &self.marker.to_string(),
                "must be a symbol character",
            ));
        }
        if self.mega_menu_token.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "mega_menu_token".to_string(),
            }
            .into());
        }
        if self.mega_menu_token.contains('/') {
            return Err(invalid(
                "mega_menu_token",
                &self.mega_menu_token,
                "must be a single path segment",
            ));
        }
        if !self.label_path.starts_with('/') || !self.label_path.ends_with('/') {
            return Err(invalid(
                "label_path",
                &self.label_path,
                "must start and end with '/'",
            ));
        }
        parse_http_url("feed_base_url", &self.feed_base_url)?;
        Ok(())
    }
}

// ============================================================================
// WORKER CONFIGURATION
// ============================================================================

/// Critical theme assets pre-cached into the static partition.
pub const DEFAULT_STATIC_MANIFEST: &[&str] = &[
    "/",
    "/assets/css/main.css",
    "/assets/css/responsive.css",
    "/assets/css/critical.css",
    "/assets/js/main-optimized.js",
    "/assets/js/performance.js",
    "/assets/js/lazy-loading.js",
    "/assets/js/utils.js",
    "https://fonts.googleapis.com/css2?family=Noto+Sans:wght@400;600;700&display=swap",
    "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.0.0/css/all.min.css",
];

/// CDN copies of the theme assets pre-cached into the dynamic partition.
pub const DEFAULT_DYNAMIC_MANIFEST: &[&str] = &[
    "https://cdn.jsdelivr.net/gh/vietgoldlight-oss/candgig-blogger-template@main/assets/css/main.css",
    "https://cdn.jsdelivr.net/gh/vietgoldlight-oss/candgig-blogger-template@main/assets/css/responsive.css",
    "https://cdn.jsdelivr.net/gh/vietgoldlight-oss/candgig-blogger-template@main/assets/js/main-optimized.js",
    "https://cdn.jsdelivr.net/gh/vietgoldlight-oss/candgig-blogger-template@main/assets/js/performance.js",
    "https://cdn.jsdelivr.net/gh/vietgoldlight-oss/candgig-blogger-template@main/assets/js/lazy-loading.js",
];

/// Settings baked into a cache worker build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Prefix shared by every partition this worker owns.
    pub namespace: String,
    /// Version tag of the current partitions.
    pub version: String,
    /// Origin the worker is registered on; relative URLs resolve against it.
    pub origin: String,
    /// URLs stored in the static partition at install time.
    pub static_manifest: Vec<String>,
    /// URLs stored in the dynamic partition at install time.
    pub dynamic_manifest: Vec<String>,
    /// Activate right after install instead of waiting for old clients.
    pub skip_waiting_on_install: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            namespace: "candgig".to_string(),
            version: "v3.0.0".to_string(),
            origin: "https://candgig.blogspot.com".to_string(),
            static_manifest: DEFAULT_STATIC_MANIFEST.iter().map(|s| s.to_string()).collect(),
            dynamic_manifest: DEFAULT_DYNAMIC_MANIFEST.iter().map(|s| s.to_string()).collect(),
            skip_waiting_on_install: true,
        }
    }
}

impl WorkerConfig {
    /// Create a worker config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the partition namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the partition version tag.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the worker origin.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Replace the static manifest.
    pub fn with_static_manifest<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.static_manifest = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the dynamic manifest.
    pub fn with_dynamic_manifest<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dynamic_manifest = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable skip-waiting after install.
    pub fn with_skip_waiting_on_install(mut self, enabled: bool) -> Self {
        self.skip_waiting_on_install = enabled;
        self
    }

    /// Create WorkerConfig from environment variables.
    ///
    /// Environment variables:
    /// - `CANDGIG_CACHE_NAMESPACE`: partition prefix (default: `candgig`)
    /// - `CANDGIG_CACHE_VERSION`: partition version tag (default: `v3.0.0`)
    /// - `CANDGIG_ORIGIN`: worker origin
    /// - `CANDGIG_STATIC_MANIFEST`: comma-separated static URLs
    /// - `CANDGIG_DYNAMIC_MANIFEST`: comma-separated dynamic URLs
    /// - `CANDGIG_SKIP_WAITING_ON_INSTALL`: "true" or "false" (default: true)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let non_empty = |key: &str| lookup(key).map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        let manifest = |key: &str| {
            lookup(key).map(|s| {
                s.split(',')
                    .map(|u| u.trim().to_string())
                    .filter(|u| !u.is_empty())
                    .collect::<Vec<_>>()
            })
        };

        let skip_waiting_on_install = lookup("CANDGIG_SKIP_WAITING_ON_INSTALL")
            .map(|s| s.to_lowercase() != "false")
            .unwrap_or(defaults.skip_waiting_on_install);

        Self {
            namespace: non_empty("CANDGIG_CACHE_NAMESPACE").unwrap_or(defaults.namespace),
            version: non_empty("CANDGIG_CACHE_VERSION").unwrap_or(defaults.version),
            origin: non_empty("CANDGIG_ORIGIN")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.origin),
            static_manifest: manifest("CANDGIG_STATIC_MANIFEST").unwrap_or(defaults.static_manifest),
            dynamic_manifest: manifest("CANDGIG_DYNAMIC_MANIFEST")
                .unwrap_or(defaults.dynamic_manifest),
            skip_waiting_on_install,
        }
    }

    /// Parsed worker origin.
    pub fn origin_url(&self) -> CandgigResult<Url> {
        parse_http_url("origin", &self.origin)
    }

    /// Check that every field holds a usable value.
    pub fn validate(&self) -> CandgigResult<()> {
        if self.namespace.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "namespace".to_string(),
            }
            .into());
        }
        if self.version.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "version".to_string(),
            }
            .into());
        }
        let origin = self.origin_url()?;
        for (field, manifest) in [
            ("static_manifest", &self.static_manifest),
            ("dynamic_manifest", &self.dynamic_manifest),
        ] {
            for entry in manifest {
                origin
                    .join(entry)
                    .map_err(|e| invalid(field, entry, &e.to_string()))?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn invalid(field: &str, value: &str, reason: &str) -> crate::CandgigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

fn parse_http_url(field: &str, value: &str) -> CandgigResult<Url> {
    let url = Url::parse(value).map_err(|e| invalid(field, value, &e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(
            field,
            value,
            &format!("unsupported scheme '{}'", other),
        )),
    }
}
