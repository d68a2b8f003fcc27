//! The pre-paint theme path.
//!
//! Before the UI binds to a [`ThemeStore`](super::ThemeStore), the page has
//! to show the right theme or it flashes the wrong one. This path reads the
//! slot once, resolves, and applies, without any subscriptions. It repeats
//! the resolution rules on purpose: it must run before anything else is
//! set up.

use tracing::debug;

use super::applier::ThemeApplier;
use crate::host::StorageBackend;

/// Resolve and apply the theme once, synchronously. Returns the applied
/// dark state. Storage failures count as an empty slot.
pub fn apply_initial_theme(
    backend: &dyn StorageBackend,
    key: &str,
    prefers_dark: bool,
    applier: &dyn ThemeApplier,
) -> bool {
    let stored = backend.get_item(key).ok().flatten();
    let dark = match stored.as_deref() {
        Some("dark") => true,
        Some("light") => false,
        _ => prefers_dark,
    };
    debug!(dark, "applying initial theme");
    applier.apply(dark);
    dark
}

/// The inline `<script>` body a page places in `<head>` so the browser
/// applies the theme before first paint.
pub fn inline_script(key: &str, class: &str) -> String {
    format!(
        concat!(
            "(function(){{try{{",
            "var t=localStorage.getItem({key});",
            "var d=t===\"dark\"||(t!==\"light\"&&",
            "window.matchMedia(\"(prefers-color-scheme: dark)\").matches);",
            "document.documentElement.classList.toggle({class},d);",
            "}}catch(e){{}}}})();"
        ),
        key = js_string(key),
        class = js_string(class),
    )
}

/// A JSON string literal is a JS string literal; `</` is escaped so the
/// value cannot close the surrounding script element.
fn js_string(value: &str) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| String::from("\"\""))
        .replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Origin;
    use crate::theme::RootElement;

    #[test]
    fn stored_preference_wins_over_os() {
        let origin = Origin::new();
        origin.set_external("theme", "light");
        let root = RootElement::default();

        assert!(!apply_initial_theme(&origin.open_tab(), "theme", true, &root));
        assert!(!root.is_dark());
    }

    #[test]
    fn system_and_garbage_follow_os() {
        let origin = Origin::new();
        let tab = origin.open_tab();
        let root = RootElement::default();

        assert!(apply_initial_theme(&tab, "theme", true, &root));
        origin.set_external("theme", "system");
        assert!(!apply_initial_theme(&tab, "theme", false, &root));
        origin.set_external("theme", "purple");
        assert!(apply_initial_theme(&tab, "theme", true, &root));
    }

    #[test]
    fn disabled_storage_follows_os() {
        let origin = Origin::new();
        origin.set_external("theme", "light");
        let tab = origin.open_tab();
        tab.set_storage_enabled(false);
        let root = RootElement::default();

        assert!(apply_initial_theme(&tab, "theme", true, &root));
        assert!(root.is_dark());
    }

    #[test]
    fn script_embeds_key_and_class() {
        let script = inline_script("theme", "dark");
        assert!(script.contains("localStorage.getItem(\"theme\")"));
        assert!(script.contains("classList.toggle(\"dark\",d)"));
        assert!(script.starts_with("(function(){try{"));
        assert!(script.ends_with("}catch(e){}})();"));
    }

    #[test]
    fn script_escapes_hostile_keys() {
        let script = inline_script("</script><b>", "dark");
        assert!(!script.contains("</script>"));
        assert!(script.contains("<\\/script>"));
    }
}
