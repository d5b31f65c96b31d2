//! Delivery channel declaration.
//!
//! Android posts notifications into named channels that carry presentation
//! attributes. The default channel is redeclared on every activation;
//! redeclaring overwrites its attributes, so repeat calls are harmless.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::delivery::DeliveryService;
use crate::constants::{
    DEFAULT_CHANNEL_ID, DEFAULT_LIGHT_COLOR, DEFAULT_SOUND, DEFAULT_VIBRATION_PATTERN,
};
use crate::device::DeviceProfile;

/// Interruption level of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    /// Not shown.
    None,
    /// Shown in the shade only.
    Min,
    /// Shown, no sound.
    Low,
    /// Shown with sound.
    Default,
    /// Sound and heads-up.
    High,
    /// Highest level; heads-up and may use full-screen intents.
    Max,
}

/// Lock-screen visibility of notifications posted to a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockscreenVisibility {
    /// Full content shown on the lock screen.
    Public,
    /// Shown with content hidden.
    Private,
    /// Not shown on the lock screen.
    Secret,
}

/// A named delivery channel with its presentation attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryChannel {
    /// Channel identifier; redeclaring the same id overwrites.
    pub id: String,
    /// User-visible channel name.
    pub name: String,
    /// Interruption level.
    pub importance: Importance,
    /// Alternating off/on durations in milliseconds.
    pub vibration_pattern: Vec<u64>,
    /// Whether to vibrate.
    pub enable_vibrate: bool,
    /// LED accent color as `#rrggbb`.
    pub light_color: String,
    /// Whether to break through do-not-disturb.
    pub bypass_dnd: bool,
    /// Lock-screen visibility.
    pub lockscreen_visibility: LockscreenVisibility,
    /// Sound name, `None` for silent.
    pub sound: Option<String>,
    /// Whether to blink the notification LED.
    pub enable_lights: bool,
}

impl DeliveryChannel {
    /// The channel the app posts all its notifications to.
    #[must_use]
    pub fn default_channel() -> Self {
        Self {
            id: DEFAULT_CHANNEL_ID.to_string(),
            name: DEFAULT_CHANNEL_ID.to_string(),
            importance: Importance::Max,
            vibration_pattern: DEFAULT_VIBRATION_PATTERN.to_vec(),
            enable_vibrate: true,
            light_color: DEFAULT_LIGHT_COLOR.to_string(),
            bypass_dnd: true,
            lockscreen_visibility: LockscreenVisibility::Public,
            sound: Some(DEFAULT_SOUND.to_string()),
            enable_lights: true,
        }
    }
}

/// Result of configuring the default channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOutcome {
    /// The channel was declared.
    Declared,
    /// This platform has no named channels.
    NotRequired,
    /// Declaration failed; the platform default channel applies.
    Failed,
}

/// Declares the default delivery channel where the platform needs one.
pub struct ChannelConfigurator {
    delivery: Arc<dyn DeliveryService>,
    device: DeviceProfile,
}

impl std::fmt::Debug for ChannelConfigurator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelConfigurator")
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

impl ChannelConfigurator {
    /// Create a configurator for the given device.
    pub fn new(delivery: Arc<dyn DeliveryService>, device: DeviceProfile) -> Self {
        Self { delivery, device }
    }

    /// Declare the default channel. Failures are logged, never returned.
    pub async fn configure_default_channel(&self) -> ChannelOutcome {
        if !self.device.os.requires_named_channels() {
            return ChannelOutcome::NotRequired;
        }

        let channel = DeliveryChannel::default_channel();
        match self.delivery.declare_channel(&channel).await {
            Ok(()) => {
                log::debug!("Declared delivery channel '{}'", channel.id);
                ChannelOutcome::Declared
            }
            Err(e) => {
                log::warn!("{e}; falling back to the platform default channel");
                ChannelOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Os;
    use crate::notifications::loopback::LoopbackDelivery;
    use crate::notifications::PermissionState;

    #[test]
    fn test_default_channel_attributes() {
        let channel = DeliveryChannel::default_channel();
        assert_eq!(channel.id, "default");
        assert_eq!(channel.name, "default");
        assert_eq!(channel.importance, Importance::Max);
        assert_eq!(channel.vibration_pattern, vec![0, 250, 250, 0, 250, 250]);
        assert!(channel.enable_vibrate);
        assert_eq!(channel.light_color, "#025492");
        assert!(channel.bypass_dnd);
        assert_eq!(channel.lockscreen_visibility, LockscreenVisibility::Public);
        assert_eq!(channel.sound.as_deref(), Some("default"));
        assert!(channel.enable_lights);
    }

    #[tokio::test]
    async fn test_android_declares_channel() {
        let delivery = Arc::new(LoopbackDelivery::new(PermissionState::Granted));
        let configurator =
            ChannelConfigurator::new(delivery.clone(), DeviceProfile::physical(Os::Android));

        assert_eq!(configurator.configure_default_channel().await, ChannelOutcome::Declared);
        assert_eq!(delivery.channels(), vec![DeliveryChannel::default_channel()]);
    }

    #[tokio::test]
    async fn test_redeclaration_is_idempotent() {
        let delivery = Arc::new(LoopbackDelivery::new(PermissionState::Granted));
        let configurator =
            ChannelConfigurator::new(delivery.clone(), DeviceProfile::physical(Os::Android));

        configurator.configure_default_channel().await;
        let first = delivery.channels();
        configurator.configure_default_channel().await;

        assert_eq!(delivery.channels(), first);
        assert_eq!(delivery.stats().channel_declarations, 2);
    }

    #[tokio::test]
    async fn test_ios_skips_channel() {
        let delivery = Arc::new(LoopbackDelivery::new(PermissionState::Granted));
        let configurator =
            ChannelConfigurator::new(delivery.clone(), DeviceProfile::physical(Os::Ios));

        assert_eq!(configurator.configure_default_channel().await, ChannelOutcome::NotRequired);
        assert_eq!(delivery.stats().channel_declarations, 0);
    }

    #[tokio::test]
    async fn test_declaration_failure_is_swallowed() {
        let delivery =
            Arc::new(LoopbackDelivery::new(PermissionState::Granted).with_channel_failure());
        let configurator =
            ChannelConfigurator::new(delivery.clone(), DeviceProfile::physical(Os::Android));

        assert_eq!(configurator.configure_default_channel().await, ChannelOutcome::Failed);
        assert!(delivery.channels().is_empty());
    }
}
