//! Notepush - push notification registration and event routing.
//!
//! This crate enrolls an installation with a push delivery service, keeps
//! the resulting token and latest notifications observable, and routes
//! notification taps to app navigation. A small client for the companion
//! notes service attaches the push token to created notes.
//!
//! # Modules
//!
//! - [`notifications`] - Permission, channel, token, subscriptions and the orchestrator
//! - [`notes`] - Remote notes service client
//! - [`commands`] - CLI subcommand implementations
//! - [`config`] - Configuration loading/saving
//! - [`device`] - Device profile (platform, physical or emulated)

pub mod commands;
pub mod config;
pub mod constants;
pub mod device;
pub mod env;
pub mod error;
pub mod notes;
pub mod notifications;

// Re-export commonly used types
pub use config::Config;
pub use device::{DeviceProfile, Os};
pub use error::{DeliveryError, DraftError};
pub use notes::{NewComment, NewNote, Note, NotesClient};
pub use notifications::{
    DeliveryService, LoopbackDelivery, NotificationEvent, NotificationServices, PermissionState,
    Phase, PushState, PushToken, RegistrationOrchestrator,
};
