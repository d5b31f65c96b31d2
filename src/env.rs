//! Runtime environment detection.
//!
//! Single source of truth for the runtime environment (test, development,
//! production), read from the `NOTEPUSH_ENV` environment variable.
//!
//! # Environment Variable
//!
//! Set `NOTEPUSH_ENV` to one of:
//! - `test` - Test mode (repo-local config directory)
//! - `development` or `dev` - Development mode
//! - (anything else or unset) - Production mode

/// Runtime environment for the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Production environment (default).
    Production,
    /// Development environment.
    Development,
    /// Test environment - config lives under the repo's `tmp/`.
    Test,
}

impl Environment {
    /// Detect current environment from `NOTEPUSH_ENV`.
    #[must_use]
    pub fn current() -> Self {
        Self::parse(std::env::var("NOTEPUSH_ENV").ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("test") => Self::Test,
            Some("development" | "dev") => Self::Development,
            _ => Self::Production,
        }
    }

    /// Returns `true` if this is the test environment.
    #[must_use]
    pub fn is_test(self) -> bool {
        self == Self::Test
    }

    /// Returns `true` if this is the development environment.
    #[must_use]
    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Development => write!(f, "development"),
            Self::Test => write!(f, "test"),
        }
    }
}

/// Convenience function to check if running in test mode.
#[must_use]
pub fn is_test_mode() -> bool {
    Environment::current().is_test()
}
