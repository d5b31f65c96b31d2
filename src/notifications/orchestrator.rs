//! Registration orchestrator.
//!
//! Runs the activation sequence and owns the subscriptions it opens:
//!
//! ```text
//! Inactive ─activate─▶ Negotiating ─▶ Configuring ─▶ Registering ─▶ Subscribed
//!     ▲                                                                  │
//!     └──────────────────────────── deactivate ◀─────────────────────────┘
//! ```
//!
//! Every forward step runs regardless of how the previous one ended; a
//! denied permission or missing token degrades the session instead of
//! stopping it. Deactivation is allowed from any phase.
//!
//! # Late results
//!
//! In-flight permission and token requests are never cancelled. Each
//! activation carries a liveness token that teardown cancels; every state
//! write checks it first, so a request that settles after teardown changes
//! nothing.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::channel::{ChannelConfigurator, ChannelOutcome};
use super::delivery::DeliveryService;
use super::permission::{Alerter, Negotiation, PermissionNegotiator};
use super::router::{InteractionRouter, Navigator};
use super::state::{Degradation, Phase, PushState};
use super::subscriber::{EventStreams, EventSubscriber};
use super::token::{Registration, TokenRegistrar};
use crate::device::DeviceProfile;

/// Host facilities the notification subsystem depends on.
#[derive(Clone)]
pub struct NotificationServices {
    /// Platform push delivery facility.
    pub delivery: Arc<dyn DeliveryService>,
    /// Host navigation.
    pub navigator: Arc<dyn Navigator>,
    /// Host alerts.
    pub alerter: Arc<dyn Alerter>,
    /// The device we run on.
    pub device: DeviceProfile,
}

impl std::fmt::Debug for NotificationServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationServices")
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

type SubscriberSlot = Arc<Mutex<Option<EventSubscriber>>>;

#[derive(Debug)]
struct Session {
    live: CancellationToken,
    subscriber: SubscriberSlot,
}

/// Sequences permission, channel, token and subscriptions for one screen.
///
/// State is published through a watch channel; see [`subscribe`](Self::subscribe).
/// Dropping the orchestrator deactivates it.
#[derive(Debug)]
pub struct RegistrationOrchestrator {
    services: NotificationServices,
    project_id: Option<String>,
    state: Arc<watch::Sender<PushState>>,
    session: Option<Session>,
}

impl RegistrationOrchestrator {
    /// Create an inactive orchestrator.
    pub fn new(services: NotificationServices, project_id: Option<String>) -> Self {
        let (state, _) = watch::channel(PushState::default());
        Self {
            services,
            project_id,
            state: Arc::new(state),
            session: None,
        }
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<PushState> {
        self.state.subscribe()
    }

    /// Current state snapshot.
    pub fn state(&self) -> PushState {
        self.state.borrow().clone()
    }

    /// Whether an activation is in progress or subscribed.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Start the activation sequence in a background task.
    ///
    /// State from any previous activation is reset. Activating while already
    /// active is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn activate(&mut self) {
        if self.session.is_some() {
            log::debug!("Notification orchestrator already active");
            return;
        }

        let live = CancellationToken::new();
        let subscriber: SubscriberSlot = Arc::new(Mutex::new(None));

        self.state.send_replace(PushState::negotiating());

        let sequence = Sequence {
            services: self.services.clone(),
            project_id: self.project_id.clone(),
            state: Arc::clone(&self.state),
            live: live.clone(),
            subscriber: Arc::clone(&subscriber),
        };
        tokio::spawn(sequence.run());

        log::info!("Notification orchestrator activated");
        self.session = Some(Session { live, subscriber });
    }

    /// Tear down the activation, releasing the subscriptions it created.
    ///
    /// Returns the number of subscriptions released; zero when inactive or
    /// when teardown happens before subscribing.
    pub fn deactivate(&mut self) -> usize {
        let Some(session) = self.session.take() else {
            return 0;
        };

        session.live.cancel();
        let released = session
            .subscriber
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .map_or(0, |mut subscriber| subscriber.release_all());

        self.state.send_modify(|state| state.phase = Phase::Inactive);
        log::info!("Notification orchestrator deactivated ({released} subscriptions released)");
        released
    }
}

impl Drop for RegistrationOrchestrator {
    fn drop(&mut self) {
        self.deactivate();
    }
}

/// One activation's sequence, run as a spawned task.
struct Sequence {
    services: NotificationServices,
    project_id: Option<String>,
    state: Arc<watch::Sender<PushState>>,
    live: CancellationToken,
    subscriber: SubscriberSlot,
}

impl Sequence {
    async fn run(self) {
        let NotificationServices {
            delivery,
            alerter,
            device,
            ..
        } = self.services.clone();

        let negotiator = PermissionNegotiator::new(Arc::clone(&delivery), alerter, device);
        let negotiation = negotiator.negotiate().await;
        let permission = negotiation.state();
        let committed = self.commit(|state| {
            state.permission = permission;
            match negotiation {
                Negotiation::Granted => {}
                Negotiation::Denied => state.degrade(Degradation::PermissionDenied),
                Negotiation::NonPhysicalDevice => {
                    state.degrade(Degradation::NonPhysicalEnvironment);
                }
            }
            state.phase = Phase::Configuring;
        });
        if !committed {
            return;
        }
        negotiator.warn_if_denied(negotiation);

        let outcome = ChannelConfigurator::new(Arc::clone(&delivery), device)
            .configure_default_channel()
            .await;
        let committed = self.commit(|state| {
            if outcome == ChannelOutcome::Failed {
                state.degrade(Degradation::ChannelConfigurationFailure);
            }
            state.phase = Phase::Registering;
        });
        if !committed {
            return;
        }

        let registration = TokenRegistrar::new(delivery, device)
            .register(permission, self.project_id.as_deref())
            .await;
        let failed = matches!(registration, Registration::Failed(_));
        let token = registration.token();
        let committed = self.commit(|state| {
            state.token = token;
            if failed {
                state.degrade(Degradation::RegistrationFailure);
            }
        });
        if !committed {
            return;
        }

        let Some(streams) = self.open_subscriptions() else {
            return;
        };
        if self.commit(|state| state.phase = Phase::Subscribed) {
            self.pump(streams).await;
        }
    }

    /// Apply a state update unless this activation has been torn down.
    ///
    /// The liveness check runs under the watch lock, the same lock teardown
    /// takes to publish `Inactive`, so no write can land after it.
    fn commit(&self, update: impl FnOnce(&mut PushState)) -> bool {
        let committed = self.state.send_if_modified(|state| {
            if self.live.is_cancelled() {
                return false;
            }
            update(state);
            true
        });
        if !committed {
            log::debug!("Discarding notification result that settled after teardown");
        }
        committed
    }

    fn open_subscriptions(&self) -> Option<EventStreams> {
        // Held across the liveness check so teardown sees either nothing or
        // the complete subscriber.
        let mut slot = self
            .subscriber
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.live.is_cancelled() {
            return None;
        }

        let (subscriber, streams) =
            EventSubscriber::open(Arc::clone(&self.services.delivery), &self.live);
        *slot = Some(subscriber);
        Some(streams)
    }

    /// Drain both event streams until teardown.
    async fn pump(&self, mut streams: EventStreams) {
        let router = InteractionRouter::new(Arc::clone(&self.services.navigator));
        let mut received_open = true;
        let mut interaction_open = true;

        while received_open || interaction_open {
            tokio::select! {
                biased;
                () = self.live.cancelled() => break,
                event = streams.interaction.next(), if interaction_open => match event {
                    Some(event) => {
                        if self.commit(|state| state.record_interaction(event.clone())) {
                            router.on_interaction(&event);
                        }
                    }
                    None => interaction_open = false,
                },
                event = streams.received.next(), if received_open => match event {
                    Some(event) => {
                        self.commit(|state| state.record_received(event));
                    }
                    None => received_open = false,
                },
            }
        }

        log::debug!("Notification event pump stopped");
    }
}
