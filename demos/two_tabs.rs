//! Two tabs on one origin sharing recently used tools, favorites and theme.

use std::sync::Arc;

use keepsake::host::Origin;
use keepsake::theme::{bootstrap, RootElement};
use keepsake::{Preferences, PreferencesConfig, Signal};

fn main() {
    let config = PreferencesConfig::default();
    let origin = Origin::new();
    let os_dark = Signal::new(true);

    let script = bootstrap::inline_script(&config.theme_key, &config.dark_class);
    println!("Pre-paint script:\n{script}\n");

    let tab_a = Arc::new(origin.open_tab());
    let tab_b = Arc::new(origin.open_tab());
    let root_a = Arc::new(RootElement::new(config.dark_class.clone()));
    let root_b = Arc::new(RootElement::new(config.dark_class.clone()));

    let prefs_a = Preferences::open(
        tab_a.clone(),
        tab_a.clone(),
        &config,
        os_dark.clone(),
        root_a.clone(),
    );
    let prefs_b = Preferences::open(
        tab_b.clone(),
        tab_b.clone(),
        &config,
        os_dark.clone(),
        root_b.clone(),
    );

    let _binding = {
        let recent = prefs_b.recent().clone();
        prefs_b.subscribe(move || {
            println!("  [tab b] re-render, recent = {:?}", recent.recent_ids())
        })
    };

    println!("Tab A opens a few tools...");
    prefs_a.add_recent("json-formatter");
    prefs_a.add_recent("uuid-generator");
    prefs_a.add_recent("json-formatter");
    prefs_a.toggle_favorite("emi-calculator");

    println!("Tab B receives {} change events", tab_b.dispatch_pending());
    println!("  recent    = {:?}", prefs_b.recent_ids());
    println!("  favorites = {:?}", prefs_b.favorite_ids());

    println!(
        "\nTheme follows the OS: preference = {}, dark = {}",
        prefs_a.current_preference(),
        prefs_a.is_dark()
    );
    os_dark.set(false);
    println!(
        "OS switches to light: dark = {} / root class = {:?}",
        prefs_a.is_dark(),
        root_a.class_attribute()
    );

    let next = prefs_a.cycle_theme();
    tab_b.dispatch_pending();
    println!("Tab A cycles to {next}; tab B now shows dark = {}", root_b.is_dark());
}
