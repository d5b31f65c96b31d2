//! Application-wide constants for notepush.
//!
//! Centralizes the magic numbers and strings used by the notification
//! subsystem and the notes client.
//!
//! # Categories
//!
//! - **Delivery channel**: attributes of the default Android channel
//! - **Alerts**: user-visible permission warning text
//! - **Notes service**: endpoint defaults and timeouts

use std::time::Duration;

// ============================================================================
// Delivery channel
// ============================================================================

/// Identifier and display name of the channel declared on every activation.
pub const DEFAULT_CHANNEL_ID: &str = "default";

/// Vibration pattern for the default channel, alternating off/on milliseconds.
pub const DEFAULT_VIBRATION_PATTERN: [u64; 6] = [0, 250, 250, 0, 250, 250];

/// Notification LED color for the default channel.
pub const DEFAULT_LIGHT_COLOR: &str = "#025492";

/// Sound played by the default channel.
pub const DEFAULT_SOUND: &str = "default";

// ============================================================================
// Alerts
// ============================================================================

/// Title of the alert shown when notification permission is denied.
pub const PERMISSION_DENIED_TITLE: &str = "Notification failed";

/// Message of the alert shown when notification permission is denied.
pub const PERMISSION_DENIED_MESSAGE: &str = "Permission for notification was denied";

// ============================================================================
// Payload
// ============================================================================

/// Payload key carrying the navigation destination of a notification.
pub const SCREEN_PAYLOAD_KEY: &str = "screen";

// ============================================================================
// Notes service
// ============================================================================

/// Default base URL of the remote notes service.
pub const DEFAULT_NOTES_URL: &str = "https://push-utq8.onrender.com";

/// HTTP client request timeout for notes service calls.
///
/// 10 seconds covers a cold start of the hosted service without letting a
/// dead connection hang the CLI.
pub const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Number of characters of a push token shown in log lines.
pub const TOKEN_LOG_PREFIX_LEN: usize = 24;
