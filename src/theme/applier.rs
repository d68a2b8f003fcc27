use std::collections::BTreeSet;
use std::sync::RwLock;

/// Class the root element carries while the dark theme is shown.
pub const DEFAULT_DARK_CLASS: &str = "dark";

/// Receives the resolved theme and applies it to the page.
pub trait ThemeApplier: Send + Sync {
    fn apply(&self, dark: bool);
}

impl<F> ThemeApplier for F
where
    F: Fn(bool) + Send + Sync,
{
    fn apply(&self, dark: bool) {
        self(dark)
    }
}

/// An in-memory document root with a class list.
///
/// Applying a theme toggles a single marker class, leaving other classes
/// alone.
#[derive(Debug)]
pub struct RootElement {
    marker: String,
    classes: RwLock<BTreeSet<String>>,
}

impl RootElement {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            classes: RwLock::new(BTreeSet::new()),
        }
    }

    pub fn add_class(&self, class: &str) {
        self.classes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(class.to_string());
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(class)
    }

    /// Whether the dark marker is currently set.
    pub fn is_dark(&self) -> bool {
        self.has_class(&self.marker)
    }

    /// The `class` attribute as it would be rendered.
    pub fn class_attribute(&self) -> String {
        self.classes
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for RootElement {
    fn default() -> Self {
        Self::new(DEFAULT_DARK_CLASS)
    }
}

impl ThemeApplier for RootElement {
    fn apply(&self, dark: bool) {
        let mut classes = self.classes.write().unwrap_or_else(|e| e.into_inner());
        if dark {
            classes.insert(self.marker.clone());
        } else {
            classes.remove(&self.marker);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_only_the_marker() {
        let root = RootElement::default();
        root.add_class("font-sans");

        root.apply(true);
        assert!(root.is_dark());
        assert_eq!(root.class_attribute(), "dark font-sans");

        root.apply(false);
        assert!(!root.is_dark());
        assert_eq!(root.class_attribute(), "font-sans");
    }

    #[test]
    fn closures_are_appliers() {
        let seen = std::sync::Mutex::new(Vec::new());
        let applier = |dark: bool| seen.lock().unwrap().push(dark);
        applier.apply(true);
        assert_eq!(*seen.lock().unwrap(), vec![true]);
    }
}
