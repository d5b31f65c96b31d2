//! The delivery service seam.
//!
//! Everything the notification subsystem needs from the platform's push
//! facility goes through `DeliveryService`. Event listeners deliver into
//! tokio channels instead of invoking callbacks, so one task owned by the
//! activation drains both sources.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::channel::DeliveryChannel;
use super::types::{
    ForegroundPresentation, NotificationEvent, PermissionState, PushToken, Subscription,
};
use crate::error::DeliveryError;

/// Sending half handed to a delivery service when subscribing.
///
/// The service pushes every matching event into it until the subscription
/// is released.
pub type EventSink = mpsc::UnboundedSender<NotificationEvent>;

/// Platform push delivery facility.
///
/// Implementations must stop sending into a sink once `unsubscribe` has been
/// called with the matching handle.
#[async_trait]
pub trait DeliveryService: Send + Sync {
    /// Read the current permission state without prompting.
    async fn permission_status(&self) -> Result<PermissionState, DeliveryError>;

    /// Show the platform permission dialog and return the user's answer.
    async fn request_permission(&self) -> Result<PermissionState, DeliveryError>;

    /// Obtain the push address of this installation for a project.
    async fn push_token(&self, project_id: &str) -> Result<PushToken, DeliveryError>;

    /// Declare (or redeclare) a named delivery channel.
    async fn declare_channel(&self, channel: &DeliveryChannel) -> Result<(), DeliveryError>;

    /// Set how notifications arriving in the foreground are presented.
    /// `None` restores the platform default.
    fn set_foreground_presentation(&self, presentation: Option<ForegroundPresentation>);

    /// Attach a listener for notifications received while foregrounded.
    fn subscribe_received(&self, sink: EventSink) -> Result<Subscription, DeliveryError>;

    /// Attach a listener for user interaction with delivered notifications.
    fn subscribe_interaction(&self, sink: EventSink) -> Result<Subscription, DeliveryError>;

    /// Detach a listener. Consumes the handle.
    fn unsubscribe(&self, subscription: Subscription);
}
