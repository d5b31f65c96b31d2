//! In-memory delivery service.
//!
//! `LoopbackDelivery` behaves like a platform push facility without one: it
//! remembers permission answers and declared channels, issues tokens scoped
//! to (installation, project), and lets the caller inject notifications.
//! The `simulate` command and the tests run the subsystem against it.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::oneshot;
use uuid::Uuid;

use super::channel::DeliveryChannel;
use super::delivery::{DeliveryService, EventSink};
use super::types::{
    EventKind, ForegroundPresentation, NotificationEvent, PermissionState, PushToken,
    Subscription,
};
use crate::error::DeliveryError;

/// Call counters recorded by [`LoopbackDelivery`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoopbackStats {
    /// Permission dialogs shown.
    pub prompts: usize,
    /// Token requests received.
    pub token_requests: usize,
    /// Channel declarations received.
    pub channel_declarations: usize,
    /// Listeners attached.
    pub subscriptions_opened: usize,
    /// Listeners detached.
    pub subscriptions_released: usize,
}

#[derive(Debug)]
struct Inner {
    permission: PermissionState,
    prompt_answer: PermissionState,
    prompt_gate: Option<oneshot::Receiver<PermissionState>>,
    token_failure: Option<String>,
    channel_failure: bool,
    subscribe_failures: Vec<EventKind>,
    channels: BTreeMap<String, DeliveryChannel>,
    sinks: HashMap<u64, (EventKind, EventSink)>,
    next_subscription_id: u64,
    presentation: Option<ForegroundPresentation>,
    stats: LoopbackStats,
}

/// Delivery service that never leaves the process.
#[derive(Debug)]
pub struct LoopbackDelivery {
    installation_id: Uuid,
    inner: Mutex<Inner>,
}

impl LoopbackDelivery {
    /// A service whose stored permission starts at `permission`. Prompts
    /// are answered with `Granted` unless configured otherwise.
    #[must_use]
    pub fn new(permission: PermissionState) -> Self {
        Self {
            installation_id: Uuid::new_v4(),
            inner: Mutex::new(Inner {
                permission,
                prompt_answer: PermissionState::Granted,
                prompt_gate: None,
                token_failure: None,
                channel_failure: false,
                subscribe_failures: Vec::new(),
                channels: BTreeMap::new(),
                sinks: HashMap::new(),
                next_subscription_id: 1,
                presentation: None,
                stats: LoopbackStats::default(),
            }),
        }
    }

    /// Answer permission prompts with `answer`.
    #[must_use]
    pub fn with_prompt_answer(mut self, answer: PermissionState) -> Self {
        self.inner_mut().prompt_answer = answer;
        self
    }

    /// Fail every token request with `message`.
    #[must_use]
    pub fn with_token_failure(mut self, message: impl Into<String>) -> Self {
        self.inner_mut().token_failure = Some(message.into());
        self
    }

    /// Fail every channel declaration.
    #[must_use]
    pub fn with_channel_failure(mut self) -> Self {
        self.inner_mut().channel_failure = true;
        self
    }

    /// Refuse listeners for one event kind.
    #[must_use]
    pub fn with_subscribe_failure(mut self, kind: EventKind) -> Self {
        self.inner_mut().subscribe_failures.push(kind);
        self
    }

    /// Keep the next permission prompt open until the returned sender is
    /// used. Dropping the sender dismisses the prompt with an error.
    pub fn hold_prompt(&self) -> oneshot::Sender<PermissionState> {
        let (tx, rx) = oneshot::channel();
        self.lock().prompt_gate = Some(rx);
        tx
    }

    /// Deliver a notification to foreground listeners. Returns how many
    /// listeners it reached.
    pub fn deliver_received(&self, event: NotificationEvent) -> usize {
        self.deliver(EventKind::Received, &event)
    }

    /// Simulate the user tapping a notification. Returns how many listeners
    /// it reached.
    pub fn deliver_interaction(&self, event: NotificationEvent) -> usize {
        self.deliver(EventKind::Interaction, &event)
    }

    fn deliver(&self, kind: EventKind, event: &NotificationEvent) -> usize {
        let inner = self.lock();
        inner
            .sinks
            .values()
            .filter(|(sink_kind, _)| *sink_kind == kind)
            .filter(|(_, sink)| sink.send(event.clone()).is_ok())
            .count()
    }

    /// Call counters so far.
    pub fn stats(&self) -> LoopbackStats {
        self.lock().stats
    }

    /// Declared channels, ordered by id.
    pub fn channels(&self) -> Vec<DeliveryChannel> {
        self.lock().channels.values().cloned().collect()
    }

    /// Number of attached listeners.
    pub fn active_subscriptions(&self) -> usize {
        self.lock().sinks.len()
    }

    /// Stored permission state.
    pub fn permission(&self) -> PermissionState {
        self.lock().permission
    }

    /// Installed foreground presentation, `None` for the platform default.
    pub fn foreground_presentation(&self) -> Option<ForegroundPresentation> {
        self.lock().presentation
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn inner_mut(&mut self) -> &mut Inner {
        self.inner.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    fn subscribe(&self, kind: EventKind, sink: EventSink) -> Result<Subscription, DeliveryError> {
        let mut inner = self.lock();
        if inner.subscribe_failures.contains(&kind) {
            return Err(DeliveryError::Subscribe(format!("{kind} listeners unavailable")));
        }

        let id = inner.next_subscription_id;
        inner.next_subscription_id += 1;
        inner.sinks.insert(id, (kind, sink));
        inner.stats.subscriptions_opened += 1;
        Ok(Subscription::new(id, kind))
    }
}

#[async_trait]
impl DeliveryService for LoopbackDelivery {
    async fn permission_status(&self) -> Result<PermissionState, DeliveryError> {
        Ok(self.lock().permission)
    }

    async fn request_permission(&self) -> Result<PermissionState, DeliveryError> {
        let (gate, fallback) = {
            let mut inner = self.lock();
            inner.stats.prompts += 1;
            (inner.prompt_gate.take(), inner.prompt_answer)
        };

        let answer = match gate {
            Some(rx) => rx
                .await
                .map_err(|e| DeliveryError::Permission(format!("prompt dismissed: {e}")))?,
            None => fallback,
        };

        self.lock().permission = answer;
        Ok(answer)
    }

    async fn push_token(&self, project_id: &str) -> Result<PushToken, DeliveryError> {
        let mut inner = self.lock();
        inner.stats.token_requests += 1;
        if let Some(message) = &inner.token_failure {
            return Err(DeliveryError::Registration(message.clone()));
        }
        Ok(PushToken::new(format!(
            "ExponentPushToken[{project_id}:{}]",
            self.installation_id.simple()
        )))
    }

    async fn declare_channel(&self, channel: &DeliveryChannel) -> Result<(), DeliveryError> {
        let mut inner = self.lock();
        inner.stats.channel_declarations += 1;
        if inner.channel_failure {
            return Err(DeliveryError::Channel(format!(
                "cannot declare '{}'",
                channel.id
            )));
        }
        inner.channels.insert(channel.id.clone(), channel.clone());
        Ok(())
    }

    fn set_foreground_presentation(&self, presentation: Option<ForegroundPresentation>) {
        self.lock().presentation = presentation;
    }

    fn subscribe_received(&self, sink: EventSink) -> Result<Subscription, DeliveryError> {
        self.subscribe(EventKind::Received, sink)
    }

    fn subscribe_interaction(&self, sink: EventSink) -> Result<Subscription, DeliveryError> {
        self.subscribe(EventKind::Interaction, sink)
    }

    fn unsubscribe(&self, subscription: Subscription) {
        let mut inner = self.lock();
        if inner.sinks.remove(&subscription.id()).is_some() {
            inner.stats.subscriptions_released += 1;
        }
    }
}
