//! Observable state of the notification subsystem.
//!
//! The orchestrator publishes a [`PushState`] snapshot through a
//! `tokio::sync::watch` channel; screens read the token and the latest
//! notifications from it.

use serde::Serialize;

use super::types::{NotificationEvent, PermissionState, PushToken};

/// Position of an activation in the registration sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Not activated, or torn down.
    #[default]
    Inactive,
    /// Resolving notification permission.
    Negotiating,
    /// Declaring the delivery channel.
    Configuring,
    /// Requesting the push token.
    Registering,
    /// Listening for notification events.
    Subscribed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Inactive => "inactive",
            Self::Negotiating => "negotiating",
            Self::Configuring => "configuring",
            Self::Registering => "registering",
            Self::Subscribed => "subscribed",
        };
        f.write_str(name)
    }
}

/// A non-fatal failure the subsystem degraded around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Degradation {
    /// The user refused notifications.
    PermissionDenied,
    /// Running on a simulator or emulator.
    NonPhysicalEnvironment,
    /// The delivery service did not issue a token.
    RegistrationFailure,
    /// The default channel could not be declared.
    ChannelConfigurationFailure,
}

/// Snapshot of one activation's notification state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PushState {
    /// Current phase.
    pub phase: Phase,
    /// Resolved permission; `Undetermined` until negotiation finishes.
    pub permission: PermissionState,
    /// Push token, absent until registered.
    pub token: Option<PushToken>,
    /// Last notification received while foregrounded.
    pub last_received: Option<NotificationEvent>,
    /// Last notification the user interacted with.
    pub last_interaction: Option<NotificationEvent>,
    /// Failures degraded around during this activation.
    pub degradations: Vec<Degradation>,
    #[serde(skip)]
    latest: Option<LatestKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LatestKind {
    Received,
    Interaction,
}

impl PushState {
    /// Token string to attach to created notes; empty when absent.
    #[must_use]
    pub fn author_push_token(&self) -> &str {
        self.token.as_ref().map_or("", PushToken::as_str)
    }

    /// The most recent notification of either kind.
    #[must_use]
    pub fn latest(&self) -> Option<&NotificationEvent> {
        match self.latest? {
            LatestKind::Received => self.last_received.as_ref(),
            LatestKind::Interaction => self.last_interaction.as_ref(),
        }
    }

    /// Fresh state for a new activation.
    pub(crate) fn negotiating() -> Self {
        Self {
            phase: Phase::Negotiating,
            ..Self::default()
        }
    }

    pub(crate) fn record_received(&mut self, event: NotificationEvent) {
        self.last_received = Some(event);
        self.latest = Some(LatestKind::Received);
    }

    pub(crate) fn record_interaction(&mut self, event: NotificationEvent) {
        self.last_interaction = Some(event);
        self.latest = Some(LatestKind::Interaction);
    }

    pub(crate) fn degrade(&mut self, degradation: Degradation) {
        if !self.degradations.contains(&degradation) {
            self.degradations.push(degradation);
        }
    }
}
