//! The three caching strategies.
//!
//! Network and storage failures never escape: they degrade to a cached copy
//! or to [`Response::offline`].

use std::sync::Arc;

use candgig_core::CandgigResult;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::classify::Strategy;
use crate::http::{CacheKey, Request, Response};
use crate::network::Network;
use crate::store::CacheStore;

/// Where the returned response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Network,
    Offline,
}

/// Background refresh started by stale-while-revalidate.
///
/// Dropping the handle does not cancel the refresh.
#[derive(Debug)]
pub struct Revalidation {
    handle: JoinHandle<()>,
}

impl Revalidation {
    /// Wait until the refreshed response (if any) has been stored.
    pub async fn settled(self) {
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "Revalidation task did not complete");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// A response produced by a strategy.
#[derive(Debug)]
pub struct Handled {
    pub strategy: Strategy,
    pub response: Response,
    pub source: ResponseSource,
    pub revalidation: Option<Revalidation>,
}

impl Handled {
    fn new(strategy: Strategy, response: Response, source: ResponseSource) -> Self {
        Self {
            strategy,
            response,
            source,
            revalidation: None,
        }
    }

    fn offline(strategy: Strategy) -> Self {
        Self::new(strategy, Response::offline(), ResponseSource::Offline)
    }
}

/// Everything a strategy needs: storage, network and partition names.
pub struct StrategyContext<S, N> {
    store: Arc<S>,
    network: Arc<N>,
    static_partition: String,
    dynamic_partition: String,
}

impl<S, N> Clone for StrategyContext<S, N> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            network: Arc::clone(&self.network),
            static_partition: self.static_partition.clone(),
            dynamic_partition: self.dynamic_partition.clone(),
        }
    }
}

impl<S, N> StrategyContext<S, N>
where
    S: CacheStore + 'static,
    N: Network + 'static,
{
    pub fn new(
        store: Arc<S>,
        network: Arc<N>,
        static_partition: impl Into<String>,
        dynamic_partition: impl Into<String>,
    ) -> Self {
        Self {
            store,
            network,
            static_partition: static_partition.into(),
            dynamic_partition: dynamic_partition.into(),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn network(&self) -> &Arc<N> {
        &self.network
    }

    /// Serve a GET request through `strategy`.
    pub async fn execute(&self, strategy: Strategy, request: Request) -> Handled {
        let Some(key) = request.cache_key() else {
            // Classification never routes non-GET requests here.
            return match self.network.fetch(&request).await {
                Ok(response) => Handled::new(strategy, response, ResponseSource::Network),
                Err(_) => Handled::offline(strategy),
            };
        };

        match strategy {
            Strategy::CacheFirst => self.cache_first(request, key).await,
            Strategy::NetworkFirst => self.network_first(request, key).await,
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(request, key).await,
        }
    }

    async fn cache_first(&self, request: Request, key: CacheKey) -> Handled {
        let strategy = Strategy::CacheFirst;
        if let Some(cached) = self.match_any(&key).await {
            return Handled::new(strategy, cached, ResponseSource::Cache);
        }

        match self.network.fetch(&request).await {
            Ok(response) => {
                if response.is_success() {
                    self.store_copy(&self.static_partition, key, &response).await;
                }
                Handled::new(strategy, response, ResponseSource::Network)
            }
            Err(e) => {
                tracing::warn!(url = %request.url, strategy = %strategy, error = %e, "Serving offline response");
                Handled::offline(strategy)
            }
        }
    }

    async fn network_first(&self, request: Request, key: CacheKey) -> Handled {
        let strategy = Strategy::NetworkFirst;
        match self.network.fetch(&request).await {
            Ok(response) if response.is_success() => {
                self.store_copy(&self.dynamic_partition, key, &response).await;
                Handled::new(strategy, response, ResponseSource::Network)
            }
            Ok(response) => match self.match_any(&key).await {
                Some(cached) => {
                    tracing::debug!(url = %request.url, status = %response.status, "Falling back to cache");
                    Handled::new(strategy, cached, ResponseSource::Cache)
                }
                None => Handled::new(strategy, response, ResponseSource::Network),
            },
            Err(e) => match self.match_any(&key).await {
                Some(cached) => {
                    tracing::debug!(url = %request.url, error = %e, "Falling back to cache");
                    Handled::new(strategy, cached, ResponseSource::Cache)
                }
                None => {
                    tracing::warn!(url = %request.url, strategy = %strategy, error = %e, "Serving offline response");
                    Handled::offline(strategy)
                }
            },
        }
    }

    async fn stale_while_revalidate(&self, request: Request, key: CacheKey) -> Handled {
        let strategy = Strategy::StaleWhileRevalidate;
        let cached = match self.store.lookup(&self.dynamic_partition, &key).await {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "Cache lookup failed");
                None
            }
        };

        match cached {
            Some(cached) => {
                let revalidation = match Handle::try_current() {
                    Ok(handle) => {
                        let context = self.clone();
                        Some(Revalidation {
                            handle: handle.spawn(async move {
                                if let Err(e) = context.refresh(&request, key).await {
                                    tracing::debug!(url = %request.url, error = %e, "Revalidation failed");
                                }
                            }),
                        })
                    }
                    Err(_) => {
                        // No runtime to spawn on; refresh before returning.
                        if let Err(e) = self.refresh(&request, key).await {
                            tracing::debug!(url = %request.url, error = %e, "Revalidation failed");
                        }
                        None
                    }
                };
                Handled {
                    strategy,
                    response: cached,
                    source: ResponseSource::Cache,
                    revalidation,
                }
            }
            None => match self.refresh(&request, key).await {
                Ok(response) => Handled::new(strategy, response, ResponseSource::Network),
                Err(e) => {
                    tracing::warn!(url = %request.url, strategy = %strategy, error = %e, "Serving offline response");
                    Handled::offline(strategy)
                }
            },
        }
    }

    /// Fetch and, on success, overwrite the dynamic partition entry.
    async fn refresh(&self, request: &Request, key: CacheKey) -> CandgigResult<Response> {
        let response = self.network.fetch(request).await?;
        if response.is_success() {
            self.store_copy(&self.dynamic_partition, key, &response).await;
        }
        Ok(response)
    }

    async fn match_any(&self, key: &CacheKey) -> Option<Response> {
        match self.store.lookup_any(key).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache lookup failed");
                None
            }
        }
    }

    async fn store_copy(&self, partition: &str, key: CacheKey, response: &Response) {
        if let Err(e) = self.store.put(partition, key, response.clone()).await {
            tracing::warn!(partition, error = %e, "Cache write failed");
        }
    }
}
