//! Post feed collaborator.
//!
//! Mega menus and post widgets ask a feed for the latest posts in a
//! category. [`BloggerFeed`] talks to the blog's JSON feed endpoint; any
//! failure is rendered as an empty panel rather than surfaced.

use async_trait::async_trait;
use candgig_core::{CandgigResult, FeedError};
use chrono::{DateTime, FixedOffset};
use futures_util::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::mega::MegaMenuSlot;
use crate::tree::MenuTree;

// ============================================================================
// TYPES
// ============================================================================

/// Summary of one post, enough to render a preview card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub title: String,
    pub link: String,
    pub image: Option<String>,
    pub label: Option<String>,
    pub author: Option<String>,
    pub published: Option<DateTime<FixedOffset>>,
}

/// Parameters of a feed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    /// Category label; `None` lists posts across all labels.
    pub label: Option<String>,
    /// Maximum number of posts to return.
    pub count: u32,
    /// 1-based offset into the feed, for randomised widgets.
    pub start_index: Option<u32>,
}

impl FeedQuery {
    pub fn label(label: impl Into<String>, count: u32) -> Self {
        Self {
            label: Some(label.into()),
            count,
            start_index: None,
        }
    }

    pub fn with_start_index(mut self, start_index: u32) -> Self {
        self.start_index = Some(start_index);
        self
    }
}

/// Source of post summaries.
#[async_trait]
pub trait PostFeed: Send + Sync {
    /// Return at most `query.count` posts, newest first.
    async fn recent_posts(&self, query: &FeedQuery) -> CandgigResult<Vec<PostSummary>>;
}

// ============================================================================
// BLOGGER JSON FEED
// ============================================================================

/// [`PostFeed`] backed by the Blogger JSON feed (`alt=json`).
pub struct BloggerFeed {
    client: Client,
    base_url: String,
}

impl BloggerFeed {
    /// Create a feed client for the blog at `base_url`
    /// (e.g. "https://candgig.blogspot.com").
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, query: &FeedQuery) -> String {
        match &query.label {
            Some(label) => format!(
                "{}/feeds/posts/default/-/{}",
                self.base_url,
                urlencoding::encode(label)
            ),
            None => format!("{}/feeds/posts/default", self.base_url),
        }
    }
}

#[async_trait]
impl PostFeed for BloggerFeed {
    async fn recent_posts(&self, query: &FeedQuery) -> CandgigResult<Vec<PostSummary>> {
        let label = query.label.clone().unwrap_or_default();

        let mut params = vec![
            ("alt", "json".to_string()),
            ("max-results", query.count.to_string()),
        ];
        if let Some(start) = query.start_index {
            params.push(("start-index", start.to_string()));
        }

        let response = self
            .client
            .get(self.endpoint(query))
            .query(&params)
            .send()
            .await
            .map_err(|e| FeedError::RequestFailed {
                label: label.clone(),
                status: 0,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FeedError::RequestFailed {
                label,
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let body: FeedResponse = response.json().await.map_err(|e| FeedError::InvalidResponse {
            label: label.clone(),
            reason: e.to_string(),
        })?;

        let mut posts: Vec<PostSummary> = body
            .feed
            .entry
            .into_iter()
            .filter_map(FeedEntry::into_summary)
            .collect();
        posts.truncate(query.count as usize);
        Ok(posts)
    }
}

#[derive(Debug, Deserialize)]
struct FeedResponse {
    feed: Feed,
}

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(default)]
    entry: Vec<FeedEntry>,
}

#[derive(Debug, Deserialize)]
struct TextNode {
    #[serde(rename = "$t")]
    text: String,
}

#[derive(Debug, Deserialize)]
struct FeedLink {
    rel: String,
    href: String,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct Category {
    term: String,
}

#[derive(Debug, Deserialize)]
struct Author {
    name: TextNode,
}

#[derive(Debug, Deserialize)]
struct FeedEntry {
    title: TextNode,
    #[serde(default)]
    link: Vec<FeedLink>,
    #[serde(rename = "media$thumbnail", default)]
    thumbnail: Option<Thumbnail>,
    #[serde(default)]
    category: Vec<Category>,
    #[serde(default)]
    author: Vec<Author>,
    #[serde(default)]
    published: Option<TextNode>,
}

impl FeedEntry {
    // Entries without an alternate link cannot be rendered as a card.
    fn into_summary(self) -> Option<PostSummary> {
        let link = self
            .link
            .into_iter()
            .find(|l| l.rel == "alternate")
            .map(|l| l.href)?;

        Some(PostSummary {
            title: self.title.text,
            link,
            image: self.thumbnail.map(|t| t.url),
            label: self.category.into_iter().next().map(|c| c.term),
            author: self.author.into_iter().next().map(|a| a.name.text),
            published: self
                .published
                .and_then(|p| DateTime::parse_from_rfc3339(&p.text).ok()),
        })
    }
}

// ============================================================================
// MEGA MENU POPULATION
// ============================================================================

/// Content of one mega menu preview grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MegaMenuPanel {
    Posts {
        label: String,
        posts: Vec<PostSummary>,
    },
    /// Rendered as the "no posts found" state.
    NoPosts { label: String },
}

impl MegaMenuPanel {
    pub fn label(&self) -> &str {
        match self {
            MegaMenuPanel::Posts { label, .. } | MegaMenuPanel::NoPosts { label } => label,
        }
    }
}

/// Fetch the preview posts for every mega menu slot concurrently.
///
/// Panels come back in slot order. Errors and empty results both become
/// [`MegaMenuPanel::NoPosts`].
pub async fn populate_mega_menus(tree: &MenuTree, feed: &dyn PostFeed) -> Vec<MegaMenuPanel> {
    join_all(tree.mega_menus.iter().map(|slot| populate_slot(slot, feed))).await
}

async fn populate_slot(slot: &MegaMenuSlot, feed: &dyn PostFeed) -> MegaMenuPanel {
    let query = FeedQuery::label(slot.label.clone(), slot.count);
    match feed.recent_posts(&query).await {
        Ok(posts) if !posts.is_empty() => MegaMenuPanel::Posts {
            label: slot.label.clone(),
            posts,
        },
        Ok(_) => MegaMenuPanel::NoPosts {
            label: slot.label.clone(),
        },
        Err(e) => {
            tracing::warn!(label = %slot.label, error = %e, "Mega menu feed failed");
            MegaMenuPanel::NoPosts {
                label: slot.label.clone(),
            }
        }
    }
}
