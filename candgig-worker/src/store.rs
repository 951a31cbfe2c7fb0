//! Cache storage capability and partition naming.
//!
//! The worker never touches a global cache; it is handed a [`CacheStore`]
//! at construction. [`InMemoryCacheStore`] is the reference implementation
//! used by hosts without a platform cache and by tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use candgig_core::{CacheError, CandgigResult};

use crate::http::{CacheKey, Response};

// ============================================================================
// PARTITION NAMES
// ============================================================================

/// Logical role of a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartitionRole {
    /// Long-lived assets: style sheets, scripts, fonts, images.
    Static,
    /// Content-ish responses: pages, API calls, CDN copies.
    Dynamic,
}

impl PartitionRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartitionRole::Static => "static",
            PartitionRole::Dynamic => "dynamic",
        }
    }
}

/// Versioned partition name, rendered as `{namespace}-{role}-{version}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionName {
    pub namespace: String,
    pub role: PartitionRole,
    pub version: String,
}

impl PartitionName {
    pub fn new(namespace: impl Into<String>, role: PartitionRole, version: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            role,
            version: version.into(),
        }
    }

    /// Whether `name` belongs to this partition's namespace.
    pub fn shares_namespace(&self, name: &str) -> bool {
        name.strip_prefix(self.namespace.as_str())
            .is_some_and(|rest| rest.starts_with('-'))
    }
}

impl std::fmt::Display for PartitionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.namespace, self.role.as_str(), self.version)
    }
}

// ============================================================================
// STORE TRAIT
// ============================================================================

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that found an entry.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Entries across all partitions.
    pub entry_count: u64,
    /// Number of partitions.
    pub partition_count: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Named partitions of cached responses.
///
/// Writes are last-write-wins overwrites keyed by [`CacheKey`], so
/// concurrent writers need no coordination beyond the store's own.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Create the partition if it does not exist.
    async fn open(&self, name: &str) -> CandgigResult<()>;

    /// Partition names in creation order.
    async fn keys(&self) -> CandgigResult<Vec<String>>;

    /// Delete a partition. Returns whether it existed.
    async fn delete(&self, name: &str) -> CandgigResult<bool>;

    /// Look up an entry in one partition.
    async fn lookup(&self, name: &str, key: &CacheKey) -> CandgigResult<Option<Response>>;

    /// Look up an entry across all partitions in creation order.
    async fn lookup_any(&self, key: &CacheKey) -> CandgigResult<Option<Response>>;

    /// Store an entry, creating the partition if needed.
    async fn put(&self, name: &str, key: CacheKey, response: Response) -> CandgigResult<()>;

    /// Store every entry or none of them.
    async fn put_all(&self, name: &str, entries: Vec<(CacheKey, Response)>) -> CandgigResult<()>;

    /// Number of entries in a partition.
    async fn entry_count(&self, name: &str) -> CandgigResult<usize>;

    /// Get cache statistics.
    async fn stats(&self) -> CandgigResult<CacheStats>;
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

#[derive(Debug)]
struct Partition {
    name: String,
    entries: HashMap<CacheKey, Response>,
}

#[derive(Debug, Default)]
struct Inner {
    partitions: Vec<Partition>,
    hits: u64,
    misses: u64,
}

impl Inner {
    fn partition(&self, name: &str) -> Option<&Partition> {
        self.partitions.iter().find(|p| p.name == name)
    }

    fn partition_mut(&mut self, name: &str) -> &mut Partition {
        let index = match self.partitions.iter().position(|p| p.name == name) {
            Some(index) => index,
            None => {
                self.partitions.push(Partition {
                    name: name.to_string(),
                    entries: HashMap::new(),
                });
                self.partitions.len() - 1
            }
        };
        &mut self.partitions[index]
    }

    fn record(&mut self, found: &Option<Response>) {
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }
}

/// Process-local [`CacheStore`].
#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    inner: RwLock<Inner>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn open(&self, name: &str) -> CandgigResult<()> {
        let mut inner = self.inner.write().map_err(|_| CacheError::LockPoisoned)?;
        inner.partition_mut(name);
        Ok(())
    }

    async fn keys(&self) -> CandgigResult<Vec<String>> {
        let inner = self.inner.read().map_err(|_| CacheError::LockPoisoned)?;
        Ok(inner.partitions.iter().map(|p| p.name.clone()).collect())
    }

    async fn delete(&self, name: &str) -> CandgigResult<bool> {
        let mut inner = self.inner.write().map_err(|_| CacheError::LockPoisoned)?;
        let before = inner.partitions.len();
        inner.partitions.retain(|p| p.name != name);
        Ok(inner.partitions.len() != before)
    }

    async fn lookup(&self, name: &str, key: &CacheKey) -> CandgigResult<Option<Response>> {
        let mut inner = self.inner.write().map_err(|_| CacheError::LockPoisoned)?;
        let found = inner
            .partition(name)
            .and_then(|p| p.entries.get(key))
            .cloned();
        inner.record(&found);
        Ok(found)
    }

    async fn lookup_any(&self, key: &CacheKey) -> CandgigResult<Option<Response>> {
        let mut inner = self.inner.write().map_err(|_| CacheError::LockPoisoned)?;
        let found = inner
            .partitions
            .iter()
            .find_map(|p| p.entries.get(key))
            .cloned();
        inner.record(&found);
        Ok(found)
    }

    async fn put(&self, name: &str, key: CacheKey, response: Response) -> CandgigResult<()> {
        let mut inner = self.inner.write().map_err(|_| CacheError::LockPoisoned)?;
        inner.partition_mut(name).entries.insert(key, response);
        Ok(())
    }

    async fn put_all(&self, name: &str, entries: Vec<(CacheKey, Response)>) -> CandgigResult<()> {
        let mut inner = self.inner.write().map_err(|_| CacheError::LockPoisoned)?;
        inner.partition_mut(name).entries.extend(entries);
        Ok(())
    }

    async fn entry_count(&self, name: &str) -> CandgigResult<usize> {
        let inner = self.inner.read().map_err(|_| CacheError::LockPoisoned)?;
        inner
            .partition(name)
            .map(|p| p.entries.len())
            .ok_or_else(|| {
                CacheError::PartitionNotFound {
                    name: name.to_string(),
                }
                .into()
            })
    }

    async fn stats(&self) -> CandgigResult<CacheStats> {
        let inner = self.inner.read().map_err(|_| CacheError::LockPoisoned)?;
        Ok(CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            entry_count: inner.partitions.iter().map(|p| p.entries.len() as u64).sum(),
            partition_count: inner.partitions.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candgig_core::CandgigError;
    use url::Url;

    fn key(path: &str) -> CacheKey {
        CacheKey::get(&Url::parse(&format!("https://b.example.com{}", path)).unwrap())
    }

    #[test]
    fn test_partition_name_display() {
        let name = PartitionName::new("candgig", PartitionRole::Static, "v3.0.0");
        assert_eq!(name.to_string(), "candgig-static-v3.0.0");
    }

    #[test]
    fn test_shares_namespace() {
        let name = PartitionName::new("candgig", PartitionRole::Dynamic, "v3");
        assert!(name.shares_namespace("candgig-static-v1"));
        assert!(name.shares_namespace("candgig-v3.0.0"));
        assert!(!name.shares_namespace("candgigx-static-v1"));
        assert!(!name.shares_namespace("other-static-v3"));
    }

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);
        assert!((CacheStats::default().hit_rate() - 0.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_put_then_lookup() {
        let store = InMemoryCacheStore::new();
        store.put("a", key("/x"), Response::ok("one")).await.unwrap();
        store.put("a", key("/x"), Response::ok("two")).await.unwrap();

        let found = store.lookup("a", &key("/x")).await.unwrap().unwrap();
        assert_eq!(found.text(), "two");
        assert!(store.lookup("b", &key("/x")).await.unwrap().is_none());
        assert_eq!(store.entry_count("a").await.unwrap(), 1);

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_lookup_any_prefers_older_partition() {
        let store = InMemoryCacheStore::new();
        store.open("first").await.unwrap();
        store.put("second", key("/x"), Response::ok("second")).await.unwrap();
        store.put("first", key("/x"), Response::ok("first")).await.unwrap();

        let found = store.lookup_any(&key("/x")).await.unwrap().unwrap();
        assert_eq!(found.text(), "first");
        assert_eq!(store.keys().await.unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_delete_and_missing_partition() {
        let store = InMemoryCacheStore::new();
        store.open("old").await.unwrap();
        assert!(store.delete("old").await.unwrap());
        assert!(!store.delete("old").await.unwrap());
        assert!(matches!(
            store.entry_count("old").await,
            Err(CandgigError::Cache(CacheError::PartitionNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_put_all_stores_every_entry() {
        let store = InMemoryCacheStore::new();
        store
            .put_all(
                "s",
                vec![(key("/a.css"), Response::ok("a")), (key("/b.js"), Response::ok("b"))],
            )
            .await
            .unwrap();
        assert_eq!(store.entry_count("s").await.unwrap(), 2);
    }
}
