//! Description of the device the notification subsystem runs on.
//!
//! Push delivery needs a physical device with delivery-service connectivity,
//! and only some platform families require notifications to be posted to a
//! named channel. Both facts gate parts of the activation sequence.

use serde::{Deserialize, Serialize};

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    /// Android: notifications are posted to named channels.
    Android,
    /// iOS.
    Ios,
    /// Anything else (desktop hosts, web).
    #[default]
    Other,
}

impl Os {
    /// Whether this platform requires a named delivery channel.
    #[must_use]
    pub fn requires_named_channels(self) -> bool {
        self == Self::Android
    }
}

impl std::fmt::Display for Os {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Android => write!(f, "android"),
            Self::Ios => write!(f, "ios"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for Os {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "android" => Ok(Self::Android),
            "ios" => Ok(Self::Ios),
            "other" | "desktop" => Ok(Self::Other),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

/// The execution environment as seen by the notification subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Platform family.
    pub os: Os,
    /// `false` for simulators and emulators, which cannot receive pushes.
    pub physical: bool,
}

impl DeviceProfile {
    /// A physical device of the given platform.
    #[must_use]
    pub fn physical(os: Os) -> Self {
        Self { os, physical: true }
    }

    /// A simulator or emulator of the given platform.
    #[must_use]
    pub fn emulator(os: Os) -> Self {
        Self {
            os,
            physical: false,
        }
    }

    /// Profile of the host this binary was compiled for.
    #[must_use]
    pub fn host() -> Self {
        let os = if cfg!(target_os = "android") {
            Os::Android
        } else if cfg!(target_os = "ios") {
            Os::Ios
        } else {
            Os::Other
        };
        Self::physical(os)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_android_requires_channels() {
        assert!(Os::Android.requires_named_channels());
        assert!(!Os::Ios.requires_named_channels());
        assert!(!Os::Other.requires_named_channels());
    }

    #[test]
    fn test_os_from_str() {
        assert_eq!("Android".parse::<Os>(), Ok(Os::Android));
        assert_eq!("ios".parse::<Os>(), Ok(Os::Ios));
        assert_eq!("desktop".parse::<Os>(), Ok(Os::Other));
        assert!("symbian".parse::<Os>().is_err());
    }

    #[test]
    fn test_profile_constructors() {
        assert!(DeviceProfile::physical(Os::Ios).physical);
        assert!(!DeviceProfile::emulator(Os::Android).physical);
    }
}
