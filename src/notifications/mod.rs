//! Push notification registration and event routing.
//!
//! Enrolls this installation with the push delivery service and turns
//! incoming notification events into app behavior.
//!
//! # Architecture
//!
//! ```text
//! RegistrationOrchestrator (one per screen activation)
//!     │
//!     ├── PermissionNegotiator ─┐
//!     ├── ChannelConfigurator   ├── DeliveryService (trait)
//!     ├── TokenRegistrar       ─┘
//!     │
//!     └── EventSubscriber ── received ────▶ PushState.last_received
//!                         └─ interaction ─▶ PushState.last_interaction
//!                                          └▶ InteractionRouter ─▶ Navigator
//! ```
//!
//! The foreground presentation [`handler`] is process-wide and installed
//! once at startup, separately from any activation.
//!
//! Nothing in this module returns an error to the host: permission denial,
//! emulators, registration and channel failures all degrade the session and
//! are recorded as [`Degradation`]s on the published state.

pub mod channel;
pub mod delivery;
pub mod handler;
pub mod loopback;
pub mod orchestrator;
pub mod permission;
pub mod router;
pub mod state;
pub mod subscriber;
pub mod token;
pub mod types;

pub use channel::{ChannelConfigurator, ChannelOutcome, DeliveryChannel};
pub use delivery::{DeliveryService, EventSink};
pub use loopback::{LoopbackDelivery, LoopbackStats};
pub use orchestrator::{NotificationServices, RegistrationOrchestrator};
pub use permission::{Alerter, PermissionNegotiator};
pub use router::{InteractionRouter, NavigationTarget, Navigator};
pub use state::{Degradation, Phase, PushState};
pub use subscriber::{EventSubscriber, NotificationStream};
pub use token::TokenRegistrar;
pub use types::{
    EventKind, ForegroundPresentation, NotificationEvent, PermissionState, PushToken,
    Subscription,
};
