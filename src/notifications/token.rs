//! Push token registration.
//!
//! One attempt per activation. A token is only requested on a physical
//! device with granted permission and a project identifier; anything else,
//! and any service failure, leaves the token absent.

use std::sync::Arc;

use super::delivery::DeliveryService;
use super::types::{PermissionState, PushToken};
use crate::device::DeviceProfile;
use crate::error::DeliveryError;

/// Result of a registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// The service issued a token.
    Issued(PushToken),
    /// Preconditions were not met; the service was not called.
    Skipped(SkipReason),
    /// The service call failed.
    Failed(DeliveryError),
}

impl Registration {
    /// The issued token, if any.
    #[must_use]
    pub fn token(self) -> Option<PushToken> {
        match self {
            Self::Issued(token) => Some(token),
            Self::Skipped(_) | Self::Failed(_) => None,
        }
    }
}

/// Why registration was not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Simulator or emulator.
    NonPhysicalDevice,
    /// Notification permission is not granted.
    PermissionNotGranted,
    /// No project identifier is configured.
    MissingProjectId,
}

/// Obtains this installation's push token from the delivery service.
pub struct TokenRegistrar {
    delivery: Arc<dyn DeliveryService>,
    device: DeviceProfile,
}

impl std::fmt::Debug for TokenRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRegistrar")
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

impl TokenRegistrar {
    /// Create a registrar for the given device.
    pub fn new(delivery: Arc<dyn DeliveryService>, device: DeviceProfile) -> Self {
        Self { delivery, device }
    }

    /// Register and return the token, or `None` in degraded mode.
    pub async fn register_token(
        &self,
        permission: PermissionState,
        project_id: Option<&str>,
    ) -> Option<PushToken> {
        self.register(permission, project_id).await.token()
    }

    /// Register, keeping the reason when no token results.
    pub async fn register(
        &self,
        permission: PermissionState,
        project_id: Option<&str>,
    ) -> Registration {
        if !self.device.physical {
            return Registration::Skipped(SkipReason::NonPhysicalDevice);
        }
        if !permission.is_granted() {
            log::debug!("Skipping token registration: permission {permission}");
            return Registration::Skipped(SkipReason::PermissionNotGranted);
        }
        let Some(project_id) = project_id.map(str::trim).filter(|id| !id.is_empty()) else {
            log::warn!("Skipping token registration: no project id configured");
            return Registration::Skipped(SkipReason::MissingProjectId);
        };

        match self.delivery.push_token(project_id).await {
            Ok(token) => {
                log::info!("Registered push token {}", token.redacted());
                Registration::Issued(token)
            }
            Err(e) => {
                log::warn!("{e}; continuing without push token");
                Registration::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Os;
    use crate::notifications::loopback::LoopbackDelivery;

    fn registrar(delivery: &Arc<LoopbackDelivery>, device: DeviceProfile) -> TokenRegistrar {
        TokenRegistrar::new(delivery.clone(), device)
    }

    #[tokio::test]
    async fn test_issues_token_when_granted() {
        let delivery = Arc::new(LoopbackDelivery::new(PermissionState::Granted));
        let registrar = registrar(&delivery, DeviceProfile::physical(Os::Ios));

        let token = registrar
            .register_token(PermissionState::Granted, Some("proj-1"))
            .await
            .expect("token issued");
        assert!(token.as_str().starts_with("ExponentPushToken["));
        assert!(token.as_str().contains("proj-1"));
        assert_eq!(delivery.stats().token_requests, 1);
    }

    #[tokio::test]
    async fn test_no_call_without_permission() {
        let delivery = Arc::new(LoopbackDelivery::new(PermissionState::Denied));
        let registrar = registrar(&delivery, DeviceProfile::physical(Os::Android));

        let result = registrar.register(PermissionState::Denied, Some("proj-1")).await;
        assert_eq!(result, Registration::Skipped(SkipReason::PermissionNotGranted));
        assert_eq!(delivery.stats().token_requests, 0);
    }

    #[tokio::test]
    async fn test_no_call_on_emulator() {
        let delivery = Arc::new(LoopbackDelivery::new(PermissionState::Granted));
        let registrar = registrar(&delivery, DeviceProfile::emulator(Os::Ios));

        let result = registrar.register(PermissionState::Granted, Some("proj-1")).await;
        assert_eq!(result, Registration::Skipped(SkipReason::NonPhysicalDevice));
        assert_eq!(delivery.stats().token_requests, 0);
    }

    #[tokio::test]
    async fn test_no_call_without_project_id() {
        let delivery = Arc::new(LoopbackDelivery::new(PermissionState::Granted));
        let registrar = registrar(&delivery, DeviceProfile::physical(Os::Ios));

        assert_eq!(
            registrar.register(PermissionState::Granted, Some("   ")).await,
            Registration::Skipped(SkipReason::MissingProjectId)
        );
        assert!(registrar.register_token(PermissionState::Granted, None).await.is_none());
        assert_eq!(delivery.stats().token_requests, 0);
    }

    #[tokio::test]
    async fn test_service_failure_yields_absent_token() {
        let delivery = Arc::new(
            LoopbackDelivery::new(PermissionState::Granted).with_token_failure("service rejected"),
        );
        let registrar = registrar(&delivery, DeviceProfile::physical(Os::Android));

        let result = registrar.register(PermissionState::Granted, Some("proj-1")).await;
        assert!(matches!(result, Registration::Failed(DeliveryError::Registration(_))));
        assert_eq!(delivery.stats().token_requests, 1);
    }

    #[tokio::test]
    async fn test_token_stable_per_project() {
        let delivery = Arc::new(LoopbackDelivery::new(PermissionState::Granted));
        let registrar = registrar(&delivery, DeviceProfile::physical(Os::Ios));

        let a = registrar.register_token(PermissionState::Granted, Some("proj-1")).await;
        let b = registrar.register_token(PermissionState::Granted, Some("proj-1")).await;
        let c = registrar.register_token(PermissionState::Granted, Some("proj-2")).await;
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
