//! Platform identity and platform-level capability flags.
//!
//! A closed enum instead of free-form string comparison: adding a platform
//! forces every capability match below to be revisited at compile time.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Windows,
    Mac,
    Ios,
    Android,
}

impl Platform {
    /// The platform this process runs on, resolved once. `LINGUA_PLATFORM`
    /// overrides the build-time answer so tests and dev shells can exercise
    /// foreign-platform paths.
    pub fn current() -> Self {
        static CURRENT: OnceLock<Platform> = OnceLock::new();
        *CURRENT.get_or_init(|| {
            if let Ok(v) = std::env::var("LINGUA_PLATFORM") {
                if let Some(p) = Self::parse(v.trim()) {
                    return p;
                }
            }
            Self::compiled()
        })
    }

    fn compiled() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::Mac
        } else if cfg!(target_os = "ios") {
            Self::Ios
        } else if cfg!(target_os = "android") {
            Self::Android
        } else {
            Self::Linux
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Some(Self::Linux),
            "windows" => Some(Self::Windows),
            "mac" | "macos" => Some(Self::Mac),
            "ios" => Some(Self::Ios),
            "android" => Some(Self::Android),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Windows => "windows",
            Self::Mac => "mac",
            Self::Ios => "ios",
            Self::Android => "android",
        }
    }

    /// Live camera capture feeding the OCR flow.
    pub fn supports_camera_capture(self) -> bool {
        match self {
            Self::Android => true,
            Self::Linux | Self::Windows | Self::Mac | Self::Ios => false,
        }
    }

    /// Hand text to the OS share sheet. Mac is the exception: the system
    /// share menu is reached through the app menu there, not a toolbar icon.
    pub fn supports_native_share(self) -> bool {
        match self {
            Self::Mac => false,
            Self::Linux | Self::Windows | Self::Ios | Self::Android => true,
        }
    }

    /// Keep the display awake while the app is frontmost.
    pub fn supports_screen_lock_inhibit(self) -> bool {
        match self {
            Self::Windows => true,
            Self::Linux | Self::Mac | Self::Ios | Self::Android => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_every_variant() {
        for p in [
            Platform::Linux,
            Platform::Windows,
            Platform::Mac,
            Platform::Ios,
            Platform::Android,
        ] {
            assert_eq!(Platform::parse(p.as_str()), Some(p));
        }
        assert_eq!(Platform::parse("macos"), Some(Platform::Mac));
        assert_eq!(Platform::parse("beos"), None);
    }

    #[test]
    fn capability_exceptions() {
        assert!(Platform::Android.supports_camera_capture());
        assert!(!Platform::Windows.supports_camera_capture());
        assert!(!Platform::Mac.supports_native_share());
        assert!(Platform::Linux.supports_native_share());
        assert!(Platform::Windows.supports_screen_lock_inhibit());
        assert!(!Platform::Android.supports_screen_lock_inhibit());
    }
}
