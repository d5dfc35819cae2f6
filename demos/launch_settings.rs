use chrono::{DateTime, Utc};
use sovran_keymap::{DependentMapExt, PrefKey, Preferences, PreferencesConfig, PrefsError};
use std::env;

const DARK_MODE: PrefKey<bool> = PrefKey::from_static("darkMode");
const PREVIOUS_LAUNCH: PrefKey<DateTime<Utc>> = PrefKey::from_static("previousLaunchDate");
const LAUNCH_COUNT: PrefKey<u32> = PrefKey::from_static("launchCount");

/// Remembers when it last ran and whether dark mode is on.
///
/// Run with `--dark` or `--light` to change the theme. Set
/// `SOVRAN_KEYMAP_DIR` to keep the suite file somewhere other than the
/// user configuration directory.
fn main() -> Result<(), PrefsError> {
    env_logger::init();

    // Batch this run's writes into one flush at the end
    let config = PreferencesConfig::new("launch-settings")?.auto_flush(false);
    let mut prefs = Preferences::open(&config)?;
    prefs.register_default(false, &DARK_MODE);
    prefs.register_default(0, &LAUNCH_COUNT);

    match prefs.lookup(&PREVIOUS_LAUNCH) {
        Some(when) => println!("Previous launch: {}", when.to_rfc2822()),
        None => println!("Previous launch: none"),
    }
    prefs.assign(&PREVIOUS_LAUNCH, Utc::now());
    prefs
        .slot(&LAUNCH_COUNT)
        .update(|count| count.map(|c| c.saturating_add(1)));

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--dark" => prefs.assign(&DARK_MODE, true),
            "--light" => prefs.assign(&DARK_MODE, None),
            other => eprintln!("ignoring unknown argument {}", other),
        }
    }

    println!("Launches so far: {}", prefs.lookup(&LAUNCH_COUNT).unwrap_or_default());
    println!(
        "Dark mode: {}",
        if prefs.lookup(&DARK_MODE).unwrap_or_default() {
            "on"
        } else {
            "off"
        }
    );
    if let Some(path) = prefs.path() {
        println!("Stored in {}", path.display());
    }

    prefs.flush()
}
