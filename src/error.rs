//! Error types at the crate's trait seams.
//!
//! `DeliveryError` is what a `DeliveryService` implementation reports. None of
//! these errors escape the notification subsystem: every caller degrades
//! instead of propagating. `DraftError` rejects note and comment drafts
//! before they reach the notes service.

/// Errors reported by a delivery service implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// Reading or requesting notification permission failed.
    Permission(String),
    /// The service could not issue a push token.
    Registration(String),
    /// Declaring a delivery channel failed.
    Channel(String),
    /// The service refused to attach an event listener.
    Subscribe(String),
}

impl std::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Permission(msg) => write!(f, "Permission query failed: {msg}"),
            Self::Registration(msg) => write!(f, "Token registration failed: {msg}"),
            Self::Channel(msg) => write!(f, "Channel declaration failed: {msg}"),
            Self::Subscribe(msg) => write!(f, "Subscription failed: {msg}"),
        }
    }
}

impl std::error::Error for DeliveryError {}

/// Reasons a note or comment draft is not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftError {
    /// The draft has no text. Callers skip these silently.
    EmptyContent,
    /// No author name was entered.
    MissingAuthor,
}

impl std::fmt::Display for DraftError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyContent => write!(f, "Draft is empty"),
            Self::MissingAuthor => write!(f, "Please enter a username"),
        }
    }
}

impl std::error::Error for DraftError {}
