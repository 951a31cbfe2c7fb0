//! Mega menu detection and href rewriting.
//!
//! A link authored as `{label}/{token}` (for example `Technology/mega-menu`)
//! expands into a preview grid of the latest posts in that category. Its
//! href is rewritten to the category listing page.

use candgig_core::ThemeConfig;
use serde::{Deserialize, Serialize};
use url::Url;

/// Mega menu marker attached to a [`crate::MenuLink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MegaMenu {
    /// Category label whose posts populate the panel.
    pub label: String,
    /// Number of posts to request.
    pub count: u32,
    /// Href as authored, before rewriting.
    pub source_href: String,
}

/// Side-table row describing one rewritten category-hub link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MegaMenuSlot {
    pub label: String,
    pub original_href: String,
    pub href: String,
    pub count: u32,
}

/// Extract the category label if `href` carries the mega menu token.
///
/// The first path segment names the category; the token must appear in a
/// later segment. Query strings and fragments are ignored.
pub fn detect_mega_menu(href: &str, token: &str) -> Option<String> {
    // `News:2024/mega-menu` parses as a URL with scheme `news`.
    let path = match Url::parse(href) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url.path().to_string(),
        _ => href
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let (first, rest) = segments.split_first()?;
    if *first == token || !rest.contains(&token) {
        return None;
    }

    let label = urlencoding::decode(first)
        .map(|l| l.into_owned())
        .unwrap_or_else(|_| first.to_string());
    Some(label)
}

/// Canonical category listing URL for `label`.
pub fn category_href(label: &str, config: &ThemeConfig) -> String {
    format!(
        "{}{}?&max-results={}",
        config.label_path,
        urlencoding::encode(label),
        config.post_per_page
    )
}

/// Detect a mega menu link and compute its rewritten href.
pub fn rewrite(href: &str, config: &ThemeConfig) -> Option<(MegaMenu, String)> {
    let label = detect_mega_menu(href, &config.mega_menu_token)?;
    let rewritten = category_href(&label, config);
    Some((
        MegaMenu {
            label,
            count: config.post_per_page,
            source_href: href.to_string(),
        },
        rewritten,
    ))
}
