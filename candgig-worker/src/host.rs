//! Page-facing capabilities the worker needs from its host.

use async_trait::async_trait;
use candgig_core::CandgigResult;

use crate::events::Notification;

/// Client and notification operations provided by the embedding host.
#[async_trait]
pub trait ClientHost: Send + Sync {
    /// Take control of every open client page. Returns how many were claimed.
    async fn claim_clients(&self) -> CandgigResult<usize>;

    async fn show_notification(&self, notification: &Notification) -> CandgigResult<()>;

    async fn close_notification(&self, notification: &Notification) -> CandgigResult<()>;

    /// Focus an open client showing `url`. Returns false if none exists.
    async fn focus_client(&self, url: &str) -> CandgigResult<bool>;

    async fn open_window(&self, url: &str) -> CandgigResult<()>;
}
