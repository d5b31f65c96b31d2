//! Routing of notification interactions to app navigation.
//!
//! A notification meant to open a screen carries its destination in the
//! `screen` payload field. Notifications without one are ignored silently;
//! many valid notifications carry no routing intent.

use std::sync::Arc;

use super::types::NotificationEvent;
use crate::constants::SCREEN_PAYLOAD_KEY;

/// Host navigation facility.
pub trait Navigator: Send + Sync {
    /// Navigate to a destination understood by the host.
    fn navigate_to(&self, target: &str);
}

/// A navigation destination taken from a notification payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTarget(String);

impl NavigationTarget {
    /// Extract the destination from an event's payload, if it has a usable one.
    #[must_use]
    pub fn from_event(event: &NotificationEvent) -> Option<Self> {
        event
            .data
            .get(SCREEN_PAYLOAD_KEY)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|screen| !screen.is_empty())
            .map(|screen| Self(screen.to_string()))
    }

    /// The destination string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Sends interaction events to their navigation target.
#[derive(Clone)]
pub struct InteractionRouter {
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for InteractionRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionRouter").finish_non_exhaustive()
    }
}

impl InteractionRouter {
    /// Create a router over a host navigator.
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self { navigator }
    }

    /// Navigate for an interaction event. Returns the target navigated to.
    ///
    /// Not deduplicated: delivering the same event twice navigates twice.
    pub fn on_interaction(&self, event: &NotificationEvent) -> Option<NavigationTarget> {
        let target = NavigationTarget::from_event(event)?;
        log::debug!("Routing notification {} to {}", event.identifier, target.as_str());
        self.navigator.navigate_to(target.as_str());
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNavigator {
        visited: Mutex<Vec<String>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate_to(&self, target: &str) {
            self.visited.lock().unwrap().push(target.to_string());
        }
    }

    fn router() -> (InteractionRouter, Arc<RecordingNavigator>) {
        let navigator = Arc::new(RecordingNavigator::default());
        (InteractionRouter::new(navigator.clone()), navigator)
    }

    #[test]
    fn test_screen_payload_navigates_once() {
        let (router, navigator) = router();
        let event = NotificationEvent::new("t", "b").with_data("screen", "Details");

        let target = router.on_interaction(&event);
        assert_eq!(target.as_ref().map(NavigationTarget::as_str), Some("Details"));
        assert_eq!(*navigator.visited.lock().unwrap(), vec!["Details".to_string()]);
    }

    #[test]
    fn test_missing_screen_is_noop() {
        let (router, navigator) = router();
        let event = NotificationEvent::new("t", "b").with_data("noteId", "42");

        assert!(router.on_interaction(&event).is_none());
        assert!(navigator.visited.lock().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_screen_is_noop() {
        let (router, navigator) = router();

        router.on_interaction(&NotificationEvent::new("t", "b").with_data("screen", ""));
        router.on_interaction(&NotificationEvent::new("t", "b").with_data("screen", 7));
        router.on_interaction(&NotificationEvent::new("t", "b").with_data("screen", serde_json::Value::Null));

        assert!(navigator.visited.lock().unwrap().is_empty());
    }

    #[test]
    fn test_redelivery_navigates_again() {
        let (router, navigator) = router();
        let event = NotificationEvent::new("t", "b").with_data("screen", "Details");

        router.on_interaction(&event);
        router.on_interaction(&event);
        assert_eq!(navigator.visited.lock().unwrap().len(), 2);
    }
}
