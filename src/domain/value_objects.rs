//! Value Objects - Immutable domain primitives
//!
//! Closed label sets produced by the user-agent heuristics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel used when no determination could be made.
pub const UNKNOWN: &str = "Unknown";

/// Browser family guessed from a user-agent string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Browser {
    Edge,
    Chrome,
    Firefox,
    Safari,
    Unknown,
}

impl Browser {
    /// Label used in JSON documents and tracking rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Edge => "Edge",
            Self::Chrome => "Chrome",
            Self::Firefox => "Firefox",
            Self::Safari => "Safari",
            Self::Unknown => UNKNOWN,
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating system family guessed from a user-agent string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Windows,
    #[serde(rename = "macOS")]
    MacOs,
    Android,
    #[serde(rename = "iOS")]
    Ios,
    Linux,
    Unknown,
}

impl Platform {
    /// Label used in JSON documents and tracking rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "Windows",
            Self::MacOs => "macOS",
            Self::Android => "Android",
            Self::Ios => "iOS",
            Self::Linux => "Linux",
            Self::Unknown => UNKNOWN,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
