//! Configuration for the preference stores.
//!
//! Every field has a default, so a config document only needs to name what
//! it overrides:
//!
//! ```json
//! { "recent_limit": 8, "theme_key": "site-theme" }
//! ```

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::store::DEFAULT_RECENT_LIMIT;
use crate::theme::DEFAULT_DARK_CLASS;

/// Slot keys and limits for a [`Preferences`](crate::Preferences) bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesConfig {
    /// Slot holding the recently used tools.
    pub recent_key: String,

    /// Slot holding the favorited tools.
    pub favorites_key: String,

    /// Slot holding the theme preference.
    pub theme_key: String,

    /// Maximum number of recently used ids kept.
    pub recent_limit: usize,

    /// Class set on the root element while the dark theme is shown.
    pub dark_class: String,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            recent_key: "recent-tools".to_string(),
            favorites_key: "favorite-tools".to_string(),
            theme_key: "theme".to_string(),
            recent_limit: DEFAULT_RECENT_LIMIT,
            dark_class: DEFAULT_DARK_CLASS.to_string(),
        }
    }
}

impl PreferencesConfig {
    /// Parse a (possibly partial) JSON override document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(json)?;
        info!(
            recent_key = %config.recent_key,
            favorites_key = %config.favorites_key,
            theme_key = %config.theme_key,
            recent_limit = config.recent_limit,
            "loaded preferences config"
        );
        Ok(config)
    }
}
