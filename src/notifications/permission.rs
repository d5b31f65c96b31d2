//! Notification permission negotiation.
//!
//! Decides whether this installation may receive notifications, prompting
//! the user at most once per activation. Never fails: callers continue in
//! degraded mode when permission is missing.

use std::sync::Arc;

use super::delivery::DeliveryService;
use super::types::PermissionState;
use crate::constants::{PERMISSION_DENIED_MESSAGE, PERMISSION_DENIED_TITLE};
use crate::device::DeviceProfile;

/// Host facility for blocking, user-visible warnings.
pub trait Alerter: Send + Sync {
    /// Show a warning to the user.
    fn alert(&self, title: &str, message: &str);
}

/// Outcome of a negotiation, including why permission is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Negotiation {
    /// Notifications are allowed.
    Granted,
    /// The user (now or earlier) refused notifications.
    Denied,
    /// Simulators and emulators cannot receive pushes; nobody was asked.
    NonPhysicalDevice,
}

impl Negotiation {
    /// The permission state this outcome corresponds to.
    #[must_use]
    pub fn state(self) -> PermissionState {
        match self {
            Self::Granted => PermissionState::Granted,
            Self::Denied | Self::NonPhysicalDevice => PermissionState::Denied,
        }
    }
}

/// Determines and, when undetermined, requests notification permission.
pub struct PermissionNegotiator {
    delivery: Arc<dyn DeliveryService>,
    alerter: Arc<dyn Alerter>,
    device: DeviceProfile,
}

impl std::fmt::Debug for PermissionNegotiator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionNegotiator")
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

impl PermissionNegotiator {
    /// Create a negotiator for the given device.
    pub fn new(
        delivery: Arc<dyn DeliveryService>,
        alerter: Arc<dyn Alerter>,
        device: DeviceProfile,
    ) -> Self {
        Self {
            delivery,
            alerter,
            device,
        }
    }

    /// Resolve the permission state, prompting only if undetermined, and
    /// warn the user if it ends up denied.
    pub async fn ensure_permission(&self) -> PermissionState {
        let negotiation = self.negotiate().await;
        self.warn_if_denied(negotiation);
        negotiation.state()
    }

    /// Resolve the permission state without alerting, keeping the reason
    /// permission is missing. Pair with
    /// [`warn_if_denied`](Self::warn_if_denied) once the result is accepted.
    pub async fn negotiate(&self) -> Negotiation {
        if !self.device.physical {
            log::warn!("Push notifications require a physical device; skipping permission request");
            return Negotiation::NonPhysicalDevice;
        }

        let current = match self.delivery.permission_status().await {
            Ok(state) => state,
            Err(e) => {
                log::warn!("Could not read notification permission: {e}");
                PermissionState::Denied
            }
        };

        let outcome = match current {
            PermissionState::Granted => return Negotiation::Granted,
            PermissionState::Denied => PermissionState::Denied,
            PermissionState::Undetermined => {
                log::info!("Requesting notification permission");
                match self.delivery.request_permission().await {
                    Ok(answer) => answer,
                    Err(e) => {
                        log::warn!("Permission request failed: {e}");
                        PermissionState::Denied
                    }
                }
            }
        };

        if outcome.is_granted() {
            log::info!("Notification permission granted");
            Negotiation::Granted
        } else {
            log::warn!("Notification permission {outcome}");
            Negotiation::Denied
        }
    }

    /// Show the permission warning for a denied negotiation. Returns whether
    /// an alert was shown.
    pub fn warn_if_denied(&self, negotiation: Negotiation) -> bool {
        if negotiation != Negotiation::Denied {
            return false;
        }
        self.alerter
            .alert(PERMISSION_DENIED_TITLE, PERMISSION_DENIED_MESSAGE);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Os;
    use crate::notifications::loopback::LoopbackDelivery;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingAlerter {
        alerts: Mutex<Vec<(String, String)>>,
    }

    impl Alerter for RecordingAlerter {
        fn alert(&self, title: &str, message: &str) {
            self.alerts
                .lock()
                .unwrap()
                .push((title.to_string(), message.to_string()));
        }
    }

    fn negotiator(
        delivery: &Arc<LoopbackDelivery>,
        device: DeviceProfile,
    ) -> (PermissionNegotiator, Arc<RecordingAlerter>) {
        let alerter = Arc::new(RecordingAlerter::default());
        let negotiator = PermissionNegotiator::new(delivery.clone(), alerter.clone(), device);
        (negotiator, alerter)
    }

    #[tokio::test]
    async fn test_granted_returns_without_prompt() {
        let delivery = Arc::new(LoopbackDelivery::new(PermissionState::Granted));
        let (negotiator, alerter) = negotiator(&delivery, DeviceProfile::physical(Os::Ios));

        assert_eq!(negotiator.ensure_permission().await, PermissionState::Granted);
        assert_eq!(delivery.stats().prompts, 0);
        assert!(alerter.alerts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_undetermined_prompts_once() {
        let delivery = Arc::new(
            LoopbackDelivery::new(PermissionState::Undetermined)
                .with_prompt_answer(PermissionState::Granted),
        );
        let (negotiator, _alerter) = negotiator(&delivery, DeviceProfile::physical(Os::Android));

        assert_eq!(negotiator.ensure_permission().await, PermissionState::Granted);
        assert_eq!(delivery.stats().prompts, 1);
    }

    #[tokio::test]
    async fn test_prompt_refusal_alerts() {
        let delivery = Arc::new(
            LoopbackDelivery::new(PermissionState::Undetermined)
                .with_prompt_answer(PermissionState::Denied),
        );
        let (negotiator, alerter) = negotiator(&delivery, DeviceProfile::physical(Os::Android));

        assert_eq!(negotiator.ensure_permission().await, PermissionState::Denied);
        let alerts = alerter.alerts.lock().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].0, PERMISSION_DENIED_TITLE);
        assert_eq!(alerts[0].1, PERMISSION_DENIED_MESSAGE);
    }

    #[tokio::test]
    async fn test_previously_denied_does_not_prompt() {
        let delivery = Arc::new(LoopbackDelivery::new(PermissionState::Denied));
        let (negotiator, alerter) = negotiator(&delivery, DeviceProfile::physical(Os::Ios));

        assert_eq!(negotiator.ensure_permission().await, PermissionState::Denied);
        assert_eq!(delivery.stats().prompts, 0);
        assert_eq!(alerter.alerts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_negotiate_leaves_alert_to_caller() {
        let delivery = Arc::new(
            LoopbackDelivery::new(PermissionState::Undetermined)
                .with_prompt_answer(PermissionState::Denied),
        );
        let (negotiator, alerter) = negotiator(&delivery, DeviceProfile::physical(Os::Ios));

        let negotiation = negotiator.negotiate().await;
        assert_eq!(negotiation, Negotiation::Denied);
        assert!(alerter.alerts.lock().unwrap().is_empty());

        assert!(negotiator.warn_if_denied(negotiation));
        assert!(!negotiator.warn_if_denied(Negotiation::Granted));
        assert!(!negotiator.warn_if_denied(Negotiation::NonPhysicalDevice));
        assert_eq!(alerter.alerts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_emulator_denied_without_prompt_or_alert() {
        let delivery = Arc::new(LoopbackDelivery::new(PermissionState::Undetermined));
        let (negotiator, alerter) = negotiator(&delivery, DeviceProfile::emulator(Os::Android));

        assert_eq!(negotiator.negotiate().await, Negotiation::NonPhysicalDevice);
        assert_eq!(delivery.stats().prompts, 0);
        assert!(alerter.alerts.lock().unwrap().is_empty());
    }
}
