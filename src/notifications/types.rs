//! Core value types shared by the notification components.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::TOKEN_LOG_PREFIX_LEN;

/// Whether this installation may receive notifications.
///
/// Changes only through an explicit permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    /// The user has not been asked yet.
    #[default]
    Undetermined,
    /// The user allowed notifications.
    Granted,
    /// The user refused, or the environment cannot receive notifications.
    Denied,
}

impl PermissionState {
    /// Returns `true` if notifications are allowed.
    #[must_use]
    pub fn is_granted(self) -> bool {
        self == Self::Granted
    }
}

impl std::fmt::Display for PermissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undetermined => write!(f, "undetermined"),
            Self::Granted => write!(f, "granted"),
            Self::Denied => write!(f, "denied"),
        }
    }
}

impl std::str::FromStr for PermissionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "undetermined" => Ok(Self::Undetermined),
            "granted" => Ok(Self::Granted),
            "denied" => Ok(Self::Denied),
            other => Err(format!("unknown permission state: {other}")),
        }
    }
}

/// Opaque push address issued by the delivery service.
///
/// Scoped to (device, app installation, project identifier).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PushToken(String);

impl PushToken {
    /// Wrap a token string issued by a delivery service.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw token string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Truncated form for log lines.
    #[must_use]
    pub fn redacted(&self) -> String {
        match self.0.char_indices().nth(TOKEN_LOG_PREFIX_LEN) {
            Some((idx, _)) => format!("{}...", &self.0[..idx]),
            None => self.0.clone(),
        }
    }
}

impl std::fmt::Display for PushToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PushToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A notification as delivered to the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Delivery-service identifier of the notification request.
    pub identifier: String,
    /// Title line, if any.
    pub title: Option<String>,
    /// Body text, if any.
    pub body: Option<String>,
    /// Arbitrary payload supplied by the sender.
    #[serde(default)]
    pub data: Map<String, Value>,
    /// When the notification was delivered.
    pub date: DateTime<Utc>,
}

impl NotificationEvent {
    /// A fresh event with a random identifier and the current time.
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            identifier: uuid::Uuid::new_v4().to_string(),
            title: Some(title.into()),
            body: Some(body.into()),
            data: Map::new(),
            date: Utc::now(),
        }
    }

    /// Add a payload field.
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// The two independent notification event sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// A notification arrived while the app was in the foreground.
    Received,
    /// The user tapped or opened a delivered notification.
    Interaction,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Received => write!(f, "received"),
            Self::Interaction => write!(f, "interaction"),
        }
    }
}

/// Live listener handle issued by a delivery service.
///
/// Not `Clone`: releasing consumes the handle, so a subscription cannot be
/// released twice.
#[derive(Debug, PartialEq, Eq)]
pub struct Subscription {
    id: u64,
    kind: EventKind,
}

impl Subscription {
    /// Create a handle. Only delivery service implementations call this.
    #[must_use]
    pub fn new(id: u64, kind: EventKind) -> Self {
        Self { id, kind }
    }

    /// Service-assigned listener id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Which event source this listener is attached to.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

/// How a notification arriving in the foreground is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForegroundPresentation {
    /// Show the banner/alert.
    pub show_alert: bool,
    /// Play the notification sound.
    pub play_sound: bool,
    /// Update the app icon badge.
    pub set_badge: bool,
}

impl Default for ForegroundPresentation {
    fn default() -> Self {
        Self {
            show_alert: true,
            play_sound: true,
            set_badge: true,
        }
    }
}
