use keyring::Entry;
use tracing::{info, warn};

use crate::config::{KEYCHAIN_SERVICE, KEYCHAIN_USER};

fn entry() -> Result<Entry, String> {
    Entry::new(KEYCHAIN_SERVICE, KEYCHAIN_USER).map_err(|e| {
        warn!("Failed to create keyring entry for {}: {}", KEYCHAIN_SERVICE, e);
        e.to_string()
    })
}

/// Store the Plantify API key. HTTP services pick it up on their next request.
#[tauri::command]
pub fn set_api_key(key: &str) -> Result<(), String> {
    info!("Setting API key");
    let key = key.trim();
    if key.is_empty() {
        return Err("API key is empty".to_string());
    }
    entry()?.set_password(key).map_err(|e| {
        warn!("Failed to set API key: {}", e);
        e.to_string()
    })
}

#[tauri::command]
pub fn get_api_key() -> Result<Option<String>, String> {
    info!("Getting API key");
    match entry()?.get_password() {
        Ok(password) => Ok(Some(password)),
        Err(keyring::Error::NoEntry) => {
            info!("No API key stored");
            Ok(None)
        }
        Err(e) => {
            warn!("Failed to get API key: {}", e);
            Err(e.to_string())
        }
    }
}

#[tauri::command]
pub fn delete_api_key() -> Result<(), String> {
    info!("Deleting API key");
    match entry()?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => {
            warn!("Failed to delete API key: {}", e);
            Err(e.to_string())
        }
    }
}
