use std::sync::Arc;

use tracing::debug;

use crate::config::PreferencesConfig;
use crate::host::{ChangeChannel, StorageBackend};
use crate::listeners::Subscription;
use crate::signal::Signal;
use crate::store::{FavoriteSet, RecencyList, StorageStore};
use crate::theme::{ThemeApplier, ThemePreference, ThemeStore};

/// The preference API the UI layer consumes: recently used tools,
/// favorited tools, and the theme.
pub struct Preferences {
    recent: RecencyList,
    favorites: FavoriteSet,
    theme: ThemeStore,
}

impl Preferences {
    /// Build all three stores on one backend and change channel.
    ///
    /// The theme is applied through `applier` before this returns.
    pub fn open(
        backend: Arc<dyn StorageBackend>,
        channel: Arc<dyn ChangeChannel>,
        config: &PreferencesConfig,
        prefers_dark: Signal<bool>,
        applier: Arc<dyn ThemeApplier>,
    ) -> Self {
        let slot = |key: &str| StorageStore::new(key, Arc::clone(&backend), Arc::clone(&channel));

        let recent = RecencyList::new(slot(&config.recent_key), config.recent_limit);
        let favorites = FavoriteSet::new(slot(&config.favorites_key));
        let theme = ThemeStore::new(slot(&config.theme_key), prefers_dark, applier);
        debug!(
            recent_key = %config.recent_key,
            favorites_key = %config.favorites_key,
            theme_key = %config.theme_key,
            "opened preferences"
        );

        Self {
            recent,
            favorites,
            theme,
        }
    }

    pub fn add_recent(&self, id: &str) {
        self.recent.add_recent(id);
    }

    pub fn recent_ids(&self) -> Vec<String> {
        self.recent.recent_ids()
    }

    pub fn toggle_favorite(&self, id: &str) -> bool {
        self.favorites.toggle_favorite(id)
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.is_favorite(id)
    }

    pub fn favorite_ids(&self) -> Vec<String> {
        self.favorites.favorite_ids()
    }

    pub fn cycle_theme(&self) -> ThemePreference {
        self.theme.cycle_theme()
    }

    pub fn set_theme(&self, preference: ThemePreference) {
        self.theme.set_theme(preference);
    }

    pub fn current_preference(&self) -> ThemePreference {
        self.theme.current_preference()
    }

    pub fn is_dark(&self) -> bool {
        self.theme.is_dark()
    }

    /// Register a callback run after any preference changes.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let callback = Arc::new(callback);
        let subscriptions = [
            {
                let callback = Arc::clone(&callback);
                self.recent.subscribe(move || callback())
            },
            {
                let callback = Arc::clone(&callback);
                self.favorites.subscribe(move || callback())
            },
            self.theme.subscribe(move || callback()),
        ];
        Subscription::new(move || drop(subscriptions))
    }

    pub fn recent(&self) -> &RecencyList {
        &self.recent
    }

    pub fn favorites(&self) -> &FavoriteSet {
        &self.favorites
    }

    pub fn theme(&self) -> &ThemeStore {
        &self.theme
    }
}
