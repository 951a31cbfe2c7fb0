//! Side-channel events: control messages, push, notification clicks, sync.

use candgig_core::{CandgigResult, EventError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const NOTIFICATION_ICON: &str = "/icon-192x192.png";
pub const NOTIFICATION_BADGE: &str = "/badge-72x72.png";
pub const NOTIFICATION_VIBRATE: [u32; 3] = [100, 50, 100];

pub const ACTION_EXPLORE: &str = "explore";
pub const ACTION_CLOSE: &str = "close";

pub const BACKGROUND_SYNC_TAG: &str = "background-sync";
pub const CONTENT_SYNC_TAG: &str = "content-sync";

// ============================================================================
// CONTROL MESSAGES
// ============================================================================

/// Commands a page can post to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
    /// Activate the waiting worker without waiting for old tabs to close.
    #[serde(rename = "SKIP_WAITING")]
    SkipWaiting,
}

impl ControlMessage {
    /// Decode a posted message. Accepts `{"type": "SKIP_WAITING"}` or the
    /// bare string. Returns `None` for anything unrecognised.
    pub fn from_value(value: &Value) -> Option<Self> {
        if value.as_str() == Some("SKIP_WAITING") {
            return Some(ControlMessage::SkipWaiting);
        }
        serde_json::from_value(value.clone()).ok()
    }
}

/// What the worker did with a control message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    /// The waiting worker was activated.
    Activated,
    /// Skip-waiting recorded; activation happens once install finishes.
    SkipWaitingRecorded,
    Ignored,
}

// ============================================================================
// PUSH NOTIFICATIONS
// ============================================================================

/// Server-pushed payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PushPayload {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(rename = "primaryKey", default)]
    pub primary_key: Value,
}

impl PushPayload {
    pub fn parse(bytes: &[u8]) -> CandgigResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| {
            EventError::MalformedPush {
                reason: e.to_string(),
            }
            .into()
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationData {
    pub date_of_arrival: DateTime<Utc>,
    pub primary_key: Value,
}

/// A notification ready to be shown by the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    pub fn from_push(payload: PushPayload, arrived_at: DateTime<Utc>) -> Self {
        let action = |action: &str, title: &str| NotificationAction {
            action: action.to_string(),
            title: title.to_string(),
            icon: NOTIFICATION_ICON.to_string(),
        };
        Self {
            title: payload.title,
            body: payload.body,
            icon: NOTIFICATION_ICON.to_string(),
            badge: NOTIFICATION_BADGE.to_string(),
            vibrate: NOTIFICATION_VIBRATE.to_vec(),
            data: NotificationData {
                date_of_arrival: arrived_at,
                primary_key: payload.primary_key,
            },
            actions: vec![action(ACTION_EXPLORE, "View"), action(ACTION_CLOSE, "Close")],
        }
    }
}

/// A click on a shown notification.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationClick {
    pub notification: Notification,
    /// Action button pressed, `None` for a click on the body.
    pub action: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Dismissed,
    FocusedExisting,
    OpenedWindow,
}

// ============================================================================
// SYNC
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Performed(String),
    Ignored,
}
