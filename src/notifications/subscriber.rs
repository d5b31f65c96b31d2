//! Notification event subscriptions.
//!
//! Opens one listener per event kind and exposes each as a
//! [`NotificationStream`]. Each stream is guarded by its own cancellation
//! token, a child of the activation's liveness token, so a released stream
//! yields nothing further even if the service already queued events.
//!
//! Release is structural: handles live in an `Option` and are consumed by
//! `DeliveryService::unsubscribe`, so each is released at most once, and
//! releasing an absent handle is a no-op. Dropping the subscriber releases
//! whatever is still attached.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::delivery::DeliveryService;
use super::types::{EventKind, NotificationEvent, Subscription};

/// A lazy, unbounded sequence of events from one listener.
///
/// Ends (returns `None`) once the listener is released or the service drops
/// it, and never restarts.
#[derive(Debug)]
pub struct NotificationStream {
    kind: EventKind,
    rx: mpsc::UnboundedReceiver<NotificationEvent>,
    live: CancellationToken,
}

impl NotificationStream {
    /// Wait for the next event, in arrival order.
    pub async fn next(&mut self) -> Option<NotificationEvent> {
        tokio::select! {
            biased;
            () = self.live.cancelled() => None,
            event = self.rx.recv() => event,
        }
    }

    /// Which event source feeds this stream.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

/// Receiving ends for both event kinds.
#[derive(Debug)]
pub struct EventStreams {
    /// Notifications received while foregrounded.
    pub received: NotificationStream,
    /// User interactions with delivered notifications.
    pub interaction: NotificationStream,
}

#[derive(Debug)]
struct Attached {
    subscription: Subscription,
    live: CancellationToken,
}

/// Owner of the two listener handles for one activation.
pub struct EventSubscriber {
    delivery: Arc<dyn DeliveryService>,
    received: Option<Attached>,
    interaction: Option<Attached>,
}

impl std::fmt::Debug for EventSubscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSubscriber")
            .field("received", &self.received)
            .field("interaction", &self.interaction)
            .finish_non_exhaustive()
    }
}

impl EventSubscriber {
    /// Attach both listeners. A listener the service refuses is logged and
    /// its stream ends immediately; the other is unaffected.
    pub fn open(delivery: Arc<dyn DeliveryService>, parent: &CancellationToken) -> (Self, EventStreams) {
        let (received, received_stream) = Self::attach(&*delivery, EventKind::Received, parent);
        let (interaction, interaction_stream) =
            Self::attach(&*delivery, EventKind::Interaction, parent);

        let subscriber = Self {
            delivery,
            received,
            interaction,
        };
        let streams = EventStreams {
            received: received_stream,
            interaction: interaction_stream,
        };
        (subscriber, streams)
    }

    fn attach(
        delivery: &dyn DeliveryService,
        kind: EventKind,
        parent: &CancellationToken,
    ) -> (Option<Attached>, NotificationStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        let live = parent.child_token();

        let result = match kind {
            EventKind::Received => delivery.subscribe_received(tx),
            EventKind::Interaction => delivery.subscribe_interaction(tx),
        };

        let attached = match result {
            Ok(subscription) => {
                log::debug!("Subscribed to {kind} notifications (id={})", subscription.id());
                Some(Attached {
                    subscription,
                    live: live.clone(),
                })
            }
            Err(e) => {
                log::warn!("Could not subscribe to {kind} notifications: {e}");
                None
            }
        };

        (attached, NotificationStream { kind, rx, live })
    }

    /// Release one listener. Returns `false` if it was never attached or is
    /// already released.
    pub fn release(&mut self, kind: EventKind) -> bool {
        let slot = match kind {
            EventKind::Received => &mut self.received,
            EventKind::Interaction => &mut self.interaction,
        };
        let Some(attached) = slot.take() else {
            return false;
        };

        attached.live.cancel();
        log::debug!(
            "Releasing {kind} subscription (id={})",
            attached.subscription.id()
        );
        self.delivery.unsubscribe(attached.subscription);
        true
    }

    /// Release every attached listener; returns how many were released.
    pub fn release_all(&mut self) -> usize {
        // Interaction first: once teardown starts, no further navigation.
        [EventKind::Interaction, EventKind::Received]
            .into_iter()
            .filter(|kind| self.release(*kind))
            .count()
    }

    /// Number of listeners currently attached.
    #[must_use]
    pub fn active(&self) -> usize {
        usize::from(self.received.is_some()) + usize::from(self.interaction.is_some())
    }
}

impl Drop for EventSubscriber {
    fn drop(&mut self) {
        self.release_all();
    }
}
