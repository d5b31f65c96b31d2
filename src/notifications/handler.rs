//! Process-wide foreground presentation handler.
//!
//! Installed once at process start, before any orchestrator activates, and
//! independent of activation. Installing again overwrites the previous
//! presentation.

use super::delivery::DeliveryService;
use super::types::ForegroundPresentation;

/// Install the foreground presentation handler on a delivery service.
pub fn install(delivery: &dyn DeliveryService, presentation: ForegroundPresentation) {
    log::info!(
        "Installing foreground handler (alert={}, sound={}, badge={})",
        presentation.show_alert,
        presentation.play_sound,
        presentation.set_badge
    );
    delivery.set_foreground_presentation(Some(presentation));
}

/// Remove the handler, restoring the platform's default presentation.
pub fn uninstall(delivery: &dyn DeliveryService) {
    log::info!("Removing foreground handler");
    delivery.set_foreground_presentation(None);
}
