//! Handler for inspecting the persisted settings snapshot.

use vaultflux_core::settings::{SettingsStore, LAST_SETTINGS_KEY, SETTINGS_SCOPE};

use super::fs::FsSettingsStore;

/// Helper to run async operations in sync context
fn block_on<F: std::future::Future>(f: F) -> F::Output {
    futures_lite::future::block_on(f)
}

/// Print the settings snapshot saved by the previous import.
pub fn handle_last_settings() -> bool {
    let store = FsSettingsStore::new();
    match block_on(store.load(SETTINGS_SCOPE, LAST_SETTINGS_KEY)) {
        Ok(Some(value)) => {
            match serde_json::to_string_pretty(&value) {
                Ok(text) => println!("{text}"),
                Err(_) => println!("{value}"),
            }
            true
        }
        Ok(None) => {
            println!("No saved settings yet - run an import first");
            true
        }
        Err(e) => {
            eprintln!("✗ Failed to read saved settings: {e}");
            false
        }
    }
}
