//! CandGig Worker - Offline Cache Layer
//!
//! A request-intercepting cache modelled on the browser service worker
//! contract. Requests are classified into one of three strategies and
//! served from versioned cache partitions:
//!
//! - **cache-first** for style sheets, scripts, fonts and images
//! - **network-first** for `/api/` and `/ajax/` calls
//! - **stale-while-revalidate** for everything else
//!
//! Storage ([`CacheStore`]), the network ([`Network`]) and the embedding
//! page host ([`ClientHost`]) are capabilities injected into
//! [`CacheWorker`].

pub mod classify;
pub mod events;
pub mod host;
pub mod http;
pub mod lifecycle;
pub mod network;
pub mod store;
pub mod strategy;
pub mod worker;

pub use classify::{classify, PassthroughReason, Route, Strategy};
pub use events::{
    ClickOutcome, ControlMessage, MessageOutcome, Notification, NotificationAction,
    NotificationClick, NotificationData, PushPayload, SyncOutcome, ACTION_CLOSE, ACTION_EXPLORE,
    BACKGROUND_SYNC_TAG, CONTENT_SYNC_TAG, NOTIFICATION_BADGE, NOTIFICATION_ICON,
    NOTIFICATION_VIBRATE,
};
pub use host::ClientHost;
pub use http::{CacheKey, Method, Request, Response, StatusCode};
pub use lifecycle::WorkerState;
pub use network::{HttpNetwork, Network};
pub use store::{CacheStats, CacheStore, InMemoryCacheStore, PartitionName, PartitionRole};
pub use strategy::{Handled, ResponseSource, Revalidation, StrategyContext};
pub use worker::{CacheWorker, FetchOutcome};
