//! The cache worker: lifecycle, fetch interception and side channels.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use candgig_core::{CandgigResult, LifecycleError, NetworkError, WorkerConfig};
use chrono::Utc;
use futures_util::future::try_join_all;
use serde_json::Value;
use url::Url;

use crate::classify::{classify, PassthroughReason, Route};
use crate::events::{
    ClickOutcome, ControlMessage, MessageOutcome, Notification, NotificationClick, PushPayload,
    SyncOutcome, ACTION_CLOSE, BACKGROUND_SYNC_TAG, CONTENT_SYNC_TAG,
};
use crate::host::ClientHost;
use crate::http::{CacheKey, Request, Response};
use crate::lifecycle::WorkerState;
use crate::network::Network;
use crate::store::{CacheStore, PartitionName, PartitionRole};
use crate::strategy::{Handled, StrategyContext};

/// Result of intercepting a fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Not intercepted; the browser performs the request itself.
    Passthrough(PassthroughReason),
    Respond(Handled),
}

impl FetchOutcome {
    pub fn response(&self) -> Option<&Response> {
        match self {
            FetchOutcome::Passthrough(_) => None,
            FetchOutcome::Respond(handled) => Some(&handled.response),
        }
    }
}

/// Request-intercepting cache worker.
///
/// Storage, network and host capabilities are injected; the worker holds no
/// global state.
pub struct CacheWorker<S, N, H>
where
    S: CacheStore,
    N: Network,
    H: ClientHost,
{
    config: WorkerConfig,
    origin: Url,
    static_partition: PartitionName,
    dynamic_partition: PartitionName,
    strategies: StrategyContext<S, N>,
    host: Arc<H>,
    state: Mutex<WorkerState>,
    skip_waiting: AtomicBool,
}

impl<S, N, H> CacheWorker<S, N, H>
where
    S: CacheStore + 'static,
    N: Network + 'static,
    H: ClientHost,
{
    /// Create a worker in the `Parsed` state.
    pub fn new(
        config: WorkerConfig,
        store: Arc<S>,
        network: Arc<N>,
        host: Arc<H>,
    ) -> CandgigResult<Self> {
        config.validate()?;
        let origin = config.origin_url()?;
        let static_partition =
            PartitionName::new(&config.namespace, PartitionRole::Static, &config.version);
        let dynamic_partition =
            PartitionName::new(&config.namespace, PartitionRole::Dynamic, &config.version);
        let strategies = StrategyContext::new(
            store,
            network,
            static_partition.to_string(),
            dynamic_partition.to_string(),
        );

        Ok(Self {
            config,
            origin,
            static_partition,
            dynamic_partition,
            strategies,
            host,
            state: Mutex::new(WorkerState::Parsed),
            skip_waiting: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn static_partition(&self) -> &PartitionName {
        &self.static_partition
    }

    pub fn dynamic_partition(&self) -> &PartitionName {
        &self.dynamic_partition
    }

    pub fn store(&self) -> &S {
        self.strategies.store()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorkerState {
        match self.state.lock() {
            Ok(state) => *state,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn transition(&self, next: WorkerState) -> CandgigResult<()> {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.transition(next)
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// Pre-populate both partitions from their manifests.
    ///
    /// Every manifest URL is fetched before anything is written; if any
    /// fetch fails or returns a non-2xx status, nothing is stored and the
    /// worker becomes redundant.
    pub async fn install(&self) -> CandgigResult<()> {
        self.transition(WorkerState::Installing)?;
        tracing::info!(
            static_partition = %self.static_partition,
            dynamic_partition = %self.dynamic_partition,
            "Worker installing"
        );

        match self.precache().await {
            Ok(()) => {
                self.transition(WorkerState::Installed)?;
                if self.config.skip_waiting_on_install {
                    self.skip_waiting();
                }
                tracing::info!("Worker installed");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Worker install failed");
                self.transition(WorkerState::Redundant)?;
                Err(e)
            }
        }
    }

    async fn precache(&self) -> CandgigResult<()> {
        let static_name = self.static_partition.to_string();
        let dynamic_name = self.dynamic_partition.to_string();

        let mut jobs = Vec::new();
        for (name, manifest) in [
            (&static_name, &self.config.static_manifest),
            (&dynamic_name, &self.config.dynamic_manifest),
        ] {
            for entry in manifest {
                jobs.push((name.as_str(), self.resolve(entry)?));
            }
        }

        let network = self.strategies.network();
        let fetched = try_join_all(jobs.into_iter().map(|(name, request)| async move {
            let response = network.fetch(&request).await.map_err(|e| LifecycleError::InstallFailed {
                url: request.url.to_string(),
                reason: e.to_string(),
            })?;
            if !response.is_success() {
                return Err(LifecycleError::InstallFailed {
                    url: request.url.to_string(),
                    reason: NetworkError::UnsuccessfulStatus {
                        url: request.url.to_string(),
                        status: response.status.as_u16(),
                    }
                    .to_string(),
                });
            }
            Ok::<_, LifecycleError>((name, CacheKey::get(&request.url), response))
        }))
        .await?;

        let store = self.strategies.store();
        let mut static_entries = Vec::new();
        let mut dynamic_entries = Vec::new();
        for (name, key, response) in fetched {
            if name == static_name {
                static_entries.push((key, response));
            } else {
                dynamic_entries.push((key, response));
            }
        }

        tracing::info!(count = static_entries.len(), partition = %static_name, "Caching static assets");
        store.open(&static_name).await?;
        store.put_all(&static_name, static_entries).await?;

        tracing::info!(count = dynamic_entries.len(), partition = %dynamic_name, "Caching CDN assets");
        store.open(&dynamic_name).await?;
        store.put_all(&dynamic_name, dynamic_entries).await?;
        Ok(())
    }

    fn resolve(&self, entry: &str) -> CandgigResult<Request> {
        let url = self.origin.join(entry).map_err(|e| NetworkError::InvalidUrl {
            url: entry.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Request::get(url))
    }

    /// Request activation without waiting for old clients to close.
    pub fn skip_waiting(&self) {
        self.skip_waiting.store(true, Ordering::SeqCst);
    }

    /// Whether the installed worker should be activated right away.
    pub fn should_activate_now(&self) -> bool {
        self.state() == WorkerState::Installed && self.skip_waiting.load(Ordering::SeqCst)
    }

    /// Purge stale partitions and claim open clients.
    ///
    /// Returns the names of the deleted partitions.
    pub async fn activate(&self) -> CandgigResult<Vec<String>> {
        self.transition(WorkerState::Activating)?;
        tracing::info!("Worker activating");

        match self.purge_and_claim().await {
            Ok(deleted) => {
                self.transition(WorkerState::Activated)?;
                tracing::info!(deleted = deleted.len(), "Worker activated");
                Ok(deleted)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Worker activation failed");
                self.transition(WorkerState::Redundant)?;
                Err(e)
            }
        }
    }

    async fn purge_and_claim(&self) -> CandgigResult<Vec<String>> {
        let store = self.strategies.store();
        let current = [self.static_partition.to_string(), self.dynamic_partition.to_string()];

        let mut deleted = Vec::new();
        for name in store.keys().await? {
            if self.static_partition.shares_namespace(&name) && !current.contains(&name) {
                tracing::info!(partition = %name, "Deleting old cache");
                if store.delete(&name).await? {
                    deleted.push(name);
                }
            }
        }

        let claimed = self.host.claim_clients().await?;
        tracing::debug!(claimed, "Clients claimed");
        Ok(deleted)
    }

    /// Mark this worker as replaced.
    pub fn retire(&self) -> CandgigResult<()> {
        self.transition(WorkerState::Redundant)
    }

    // ========================================================================
    // FETCH
    // ========================================================================

    /// Intercept a fetch issued by a controlled page.
    pub async fn handle_fetch(&self, request: Request) -> FetchOutcome {
        if self.state() != WorkerState::Activated {
            return FetchOutcome::Passthrough(PassthroughReason::Inactive);
        }

        match classify(&request) {
            Route::Passthrough(reason) => FetchOutcome::Passthrough(reason),
            Route::Handle(strategy) => {
                tracing::debug!(url = %request.url, strategy = %strategy, "Intercepting fetch");
                FetchOutcome::Respond(self.strategies.execute(strategy, request).await)
            }
        }
    }

    // ========================================================================
    // SIDE CHANNELS
    // ========================================================================

    /// Handle a message posted by a page.
    pub async fn handle_message(&self, message: &Value) -> CandgigResult<MessageOutcome> {
        match ControlMessage::from_value(message) {
            Some(ControlMessage::SkipWaiting) => {
                self.skip_waiting();
                if self.state() == WorkerState::Installed {
                    self.activate().await?;
                    Ok(MessageOutcome::Activated)
                } else {
                    Ok(MessageOutcome::SkipWaitingRecorded)
                }
            }
            None => {
                tracing::debug!(message = %message, "Ignoring unknown message");
                Ok(MessageOutcome::Ignored)
            }
        }
    }

    /// Show a notification for a push message. Empty payloads are ignored.
    pub async fn handle_push(&self, payload: Option<&[u8]>) -> CandgigResult<Option<Notification>> {
        let Some(bytes) = payload.filter(|b| !b.is_empty()) else {
            return Ok(None);
        };
        let notification = Notification::from_push(PushPayload::parse(bytes)?, Utc::now());
        self.host.show_notification(&notification).await?;
        Ok(Some(notification))
    }

    /// Close the clicked notification and bring the site to the front.
    pub async fn handle_notification_click(
        &self,
        click: &NotificationClick,
    ) -> CandgigResult<ClickOutcome> {
        self.host.close_notification(&click.notification).await?;

        if click.action.as_deref() == Some(ACTION_CLOSE) {
            return Ok(ClickOutcome::Dismissed);
        }

        let home = "/";
        if self.host.focus_client(home).await? {
            Ok(ClickOutcome::FocusedExisting)
        } else {
            self.host.open_window(home).await?;
            Ok(ClickOutcome::OpenedWindow)
        }
    }

    /// Background sync hook.
    pub async fn handle_sync(&self, tag: &str) -> SyncOutcome {
        if tag == BACKGROUND_SYNC_TAG {
            tracing::info!(tag, "Performing background sync");
            SyncOutcome::Performed(tag.to_string())
        } else {
            SyncOutcome::Ignored
        }
    }

    /// Periodic sync hook.
    pub async fn handle_periodic_sync(&self, tag: &str) -> SyncOutcome {
        if tag == CONTENT_SYNC_TAG {
            tracing::info!(tag, "Performing periodic content sync");
            SyncOutcome::Performed(tag.to_string())
        } else {
            SyncOutcome::Ignored
        }
    }
}
