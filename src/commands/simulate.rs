//! Simulated notification activation.
//!
//! Drives a [`RegistrationOrchestrator`] against [`LoopbackDelivery`] so the
//! whole registration sequence can be exercised without a device:
//!
//! ```bash
//! notepush simulate --os android --permission undetermined --screen Details
//! notepush simulate --emulator
//! ```

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::sync::watch;

use crate::constants::SCREEN_PAYLOAD_KEY;
use crate::device::DeviceProfile;
use crate::notifications::{
    handler, Alerter, ForegroundPresentation, LoopbackDelivery, LoopbackStats, Navigator,
    NotificationEvent, NotificationServices, PermissionState, Phase, PushState,
    RegistrationOrchestrator,
};

/// How long to wait for the sequence to settle.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Inputs for one simulated activation.
#[derive(Debug, Clone)]
pub struct SimulateOptions {
    /// Device the activation pretends to run on.
    pub device: DeviceProfile,
    /// Stored permission before activation.
    pub permission: PermissionState,
    /// Answer given if the user is prompted.
    pub prompt_answer: PermissionState,
    /// Project id scoping the issued token.
    pub project_id: Option<String>,
    /// Title of a foreground notification to deliver once subscribed.
    pub received: Option<String>,
    /// Screen named by a notification the user taps once subscribed.
    pub screen: Option<String>,
    /// Foreground presentation installed before activating.
    pub foreground: ForegroundPresentation,
}

/// What a simulated activation did.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    /// State just before deactivation.
    pub state: PushState,
    /// Destinations the host was asked to navigate to.
    pub navigated_to: Vec<String>,
    /// Alerts shown to the user, as `(title, message)`.
    pub alerts: Vec<(String, String)>,
    /// Subscriptions released by deactivation.
    pub released: usize,
    /// Calls made against the delivery service.
    pub delivery: LoopbackStats,
}

/// Console host: logs navigation and alerts and remembers them for the report.
#[derive(Debug, Default)]
struct ConsoleHost {
    navigations: Mutex<Vec<String>>,
    alerts: Mutex<Vec<(String, String)>>,
}

impl Navigator for ConsoleHost {
    fn navigate_to(&self, target: &str) {
        log::info!("Navigating to {target}");
        self.navigations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(target.to_string());
    }
}

impl Alerter for ConsoleHost {
    fn alert(&self, title: &str, message: &str) {
        eprintln!("{title}: {message}");
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((title.to_string(), message.to_string()));
    }
}

/// Run one activation, inject the requested events, then deactivate.
///
/// # Errors
///
/// Returns an error if the sequence does not reach the subscribed phase or
/// an injected event is not observed in time.
pub async fn run(options: SimulateOptions) -> Result<SimulationReport> {
    let delivery = Arc::new(
        LoopbackDelivery::new(options.permission).with_prompt_answer(options.prompt_answer),
    );
    handler::install(delivery.as_ref(), options.foreground);

    let host = Arc::new(ConsoleHost::default());
    let services = NotificationServices {
        delivery: delivery.clone(),
        navigator: host.clone(),
        alerter: host.clone(),
        device: options.device,
    };

    let mut orchestrator = RegistrationOrchestrator::new(services, options.project_id);
    let mut rx = orchestrator.subscribe();
    orchestrator.activate();

    settle(&mut rx, "subscribed phase", |state| state.phase == Phase::Subscribed).await?;

    if let Some(title) = options.received {
        let event = NotificationEvent::new(title, "Delivered while in the foreground");
        let reached = delivery.deliver_received(event);
        log::debug!("Received notification reached {reached} listener(s)");
        settle(&mut rx, "received notification", |state| {
            state.last_received.is_some()
        })
        .await?;
    }

    if let Some(screen) = options.screen {
        let event = NotificationEvent::new("Open", format!("Tap to open {screen}"))
            .with_data(SCREEN_PAYLOAD_KEY, screen);
        let reached = delivery.deliver_interaction(event);
        log::debug!("Interaction reached {reached} listener(s)");
        settle(&mut rx, "notification interaction", |state| {
            state.last_interaction.is_some()
        })
        .await?;
        // Routing runs right after the state write; let the pump finish it.
        tokio::task::yield_now().await;
    }

    let state = orchestrator.state();
    let released = orchestrator.deactivate();
    handler::uninstall(delivery.as_ref());

    let navigated_to = host
        .navigations
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    let alerts = host
        .alerts
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();

    Ok(SimulationReport {
        state,
        navigated_to,
        alerts,
        released,
        delivery: delivery.stats(),
    })
}

async fn settle(
    rx: &mut watch::Receiver<PushState>,
    what: &str,
    predicate: impl FnMut(&PushState) -> bool,
) -> Result<()> {
    tokio::time::timeout(SETTLE_TIMEOUT, async {
        rx.wait_for(predicate).await.map(|_| ())
    })
    .await
    .with_context(|| format!("Timed out waiting for {what}"))?
    .context("Notification state channel closed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Os;
    use crate::notifications::Degradation;

    fn options(device: DeviceProfile) -> SimulateOptions {
        SimulateOptions {
            device,
            permission: PermissionState::Undetermined,
            prompt_answer: PermissionState::Granted,
            project_id: Some("demo-project".to_string()),
            received: None,
            screen: None,
            foreground: ForegroundPresentation::default(),
        }
    }

    #[tokio::test]
    async fn test_simulate_physical_device_routes_interaction() {
        let mut opts = options(DeviceProfile::physical(Os::Android));
        opts.received = Some("Hello".to_string());
        opts.screen = Some("Details".to_string());

        let report = run(opts).await.unwrap();

        assert_eq!(report.state.phase, Phase::Subscribed);
        assert_eq!(report.state.permission, PermissionState::Granted);
        assert!(report.state.author_push_token().contains("demo-project"));
        assert_eq!(
            report.state.last_received.as_ref().unwrap().title.as_deref(),
            Some("Hello")
        );
        assert_eq!(report.navigated_to, vec!["Details".to_string()]);
        assert!(report.alerts.is_empty());
        assert_eq!(report.released, 2);
        assert_eq!(report.delivery.prompts, 1);
        assert_eq!(report.delivery.channel_declarations, 1);
        assert_eq!(report.delivery.subscriptions_released, 2);
    }

    #[tokio::test]
    async fn test_simulate_emulator_has_no_token() {
        let report = run(options(DeviceProfile::emulator(Os::Ios))).await.unwrap();

        assert!(report.state.token.is_none());
        assert!(report
            .state
            .degradations
            .contains(&Degradation::NonPhysicalEnvironment));
        assert_eq!(report.delivery.prompts, 0);
        assert_eq!(report.delivery.token_requests, 0);
        assert!(report.alerts.is_empty());
    }

    #[tokio::test]
    async fn test_simulate_denied_prompt_alerts() {
        let mut opts = options(DeviceProfile::physical(Os::Ios));
        opts.prompt_answer = PermissionState::Denied;

        let report = run(opts).await.unwrap();

        assert_eq!(report.state.permission, PermissionState::Denied);
        assert!(report.state.token.is_none());
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.state.phase, Phase::Subscribed);
    }
}
