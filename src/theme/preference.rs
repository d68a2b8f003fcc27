use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::DecodeError;

/// The user's theme choice. Only this is persisted; the resolved dark/light
/// state is always derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemePreference {
    pub const ALL: [ThemePreference; 3] = [
        ThemePreference::Light,
        ThemePreference::Dark,
        ThemePreference::System,
    ];

    /// The literal stored in the slot.
    pub fn as_str(self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
            ThemePreference::System => "system",
        }
    }

    /// Light → Dark → System → Light.
    pub fn cycle(self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::System,
            ThemePreference::System => ThemePreference::Light,
        }
    }

    /// Interpret a raw slot value. Empty or unrecognized values mean `System`.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::parse::<ThemePreference>) {
            None => ThemePreference::System,
            Some(Ok(preference)) => preference,
            Some(Err(e)) => {
                warn!(error = %e, "normalizing theme preference to system");
                ThemePreference::System
            }
        }
    }

    /// Whether this preference shows the dark theme given the OS signal.
    pub fn resolve(self, prefers_dark: bool) -> bool {
        resolve(self, prefers_dark)
    }
}

/// `Dark`, or `System` while the OS prefers dark.
pub fn resolve(preference: ThemePreference, prefers_dark: bool) -> bool {
    match preference {
        ThemePreference::Dark => true,
        ThemePreference::Light => false,
        ThemePreference::System => prefers_dark,
    }
}

impl FromStr for ThemePreference {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            "system" => Ok(ThemePreference::System),
            other => Err(DecodeError::InvalidPreference(other.to_string())),
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
